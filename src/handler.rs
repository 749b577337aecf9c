use std::path::PathBuf;

use crate::http::mime;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::session::Session;

/// Application entry point for one request.
///
/// Implementations receive the resolved session (when sessions are
/// enabled) and the parsed request, and produce the response. Returning
/// an error answers the client with a 500 and closes the connection.
pub trait Handler: Send + Sync {
    fn handle(&self, session: Option<&Session>, request: &mut Request) -> anyhow::Result<Response>;
}

/// Serves files from a root directory.
///
/// Targets ending in `/` map to the `index.html` inside them; the
/// content type follows the file extension. Targets that try to climb
/// out of the root with `..` are refused.
pub struct FileHandler {
    root: PathBuf,
}

impl FileHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Handler for FileHandler {
    fn handle(&self, _session: Option<&Session>, request: &mut Request) -> anyhow::Result<Response> {
        let path = request.path();
        let mut relative = path.trim_start_matches('/').to_string();
        if relative.is_empty() || relative.ends_with('/') {
            relative.push_str("index.html");
        }

        if relative.split('/').any(|segment| segment == "..") {
            return Ok(Response::forbidden());
        }

        let target = self.root.join(relative);
        let file = match std::fs::File::open(&target) {
            Ok(file) => file,
            Err(_) => return Ok(Response::not_found()),
        };
        match file.metadata() {
            Ok(meta) if meta.is_file() => {}
            _ => return Ok(Response::not_found()),
        }

        let content_type = target
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime::from_extension)
            .unwrap_or(mime::BINARY);

        let mut response = Response::file(file)?;
        response.headers.set("Content-Type", content_type);
        Ok(response)
    }
}

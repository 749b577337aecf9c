use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, warn};

use crate::config::Settings;
use crate::handler::Handler;
use crate::http::codec::{HttpError, RequestReader};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::session::SessionStore;

/// One accepted connection, running request/response exchanges in
/// sequence until the peer disconnects, a read times out or an exchange
/// fails.
pub struct Connection<S> {
    stream: S,
    reader: RequestReader,
    writer: ResponseWriter,
    handler: Arc<dyn Handler>,
    sessions: Option<Arc<SessionStore>>,
    cookie_name: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(
        stream: S,
        settings: &Settings,
        handler: Arc<dyn Handler>,
        sessions: Option<Arc<SessionStore>>,
    ) -> Self {
        Self {
            stream,
            reader: RequestReader::new(settings.http.buffer_bytes, settings.http.idle_timeout),
            writer: ResponseWriter::new(settings.http.buffer_bytes),
            handler,
            sessions,
            cookie_name: settings.session.cookie.clone(),
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let mut request = match self.reader.read_request(&mut self.stream).await {
                Ok(Some(request)) => request,
                Ok(None) => {
                    debug!("client closed connection");
                    return Ok(());
                }
                Err(HttpError::Malformed(reason)) => {
                    warn!(%reason, "rejecting malformed request");
                    let _ = self
                        .writer
                        .send(&mut self.stream, Response::bad_request())
                        .await;
                    return Ok(());
                }
                Err(HttpError::Timeout) => {
                    debug!("timed out waiting for request");
                    let _ = self
                        .writer
                        .send(&mut self.stream, Response::request_timeout())
                        .await;
                    return Ok(());
                }
                Err(HttpError::ConnectionClosed) => {
                    debug!("connection dropped mid-request");
                    return Ok(());
                }
                Err(HttpError::Io(err)) => return Err(err.into()),
            };

            // Resolve the session before dispatch so the handler sees it,
            // and remember what the client presented: a differing key means
            // the cookie still has to be issued.
            let mut presented = None;
            let mut session = None;
            if let Some(store) = &self.sessions {
                presented = self.cookie_value(&request);
                session = Some(store.resolve(presented.as_deref()));
            }

            let mut response = match self.handler.handle(session.as_deref(), &mut request) {
                Ok(response) => response,
                Err(err) => {
                    error!(error = %err, "handler failed");
                    let _ = self
                        .writer
                        .send(&mut self.stream, Response::internal_error())
                        .await;
                    return Ok(());
                }
            };

            if let Some(session) = &session {
                if presented.as_deref() != Some(session.key()) {
                    response.headers.append(
                        "Set-Cookie",
                        format!("{}={};path=/", self.cookie_name, session.key()),
                    );
                }
            }

            let status = response.status.as_u16();
            if let Err(err) = self.writer.send(&mut self.stream, response).await {
                debug!(error = %err, "failed to write response");
                return Ok(());
            }

            debug!(
                method = request.method.as_str(),
                target = %request.uri,
                status,
                "request served"
            );
        }
    }

    /// Extracts this server's session key from the Cookie header, if the
    /// client sent one.
    fn cookie_value(&self, request: &Request) -> Option<String> {
        let prefix = format!("{}=", self.cookie_name);
        request
            .headers
            .first_value_starting_with("Cookie", &prefix)
            .map(|value| value[prefix.len()..].to_string())
    }
}

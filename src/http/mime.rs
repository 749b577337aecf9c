//! Content-type constants recognised across the crate.

pub const JSON: &str = "application/json";
pub const JAVASCRIPT: &str = "application/javascript";
pub const BINARY: &str = "application/octet-stream";
pub const PDF: &str = "application/pdf";
pub const XML: &str = "application/xml";
pub const ZIP: &str = "application/zip";
pub const GZIP: &str = "application/gzip";
pub const TEXT: &str = "text/plain";
pub const HTML: &str = "text/html";
pub const URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM: &str = "multipart/form-data";
pub const MULTIPART_MIXED: &str = "multipart/mixed";

/// Maps a file extension to a content type, defaulting to octet-stream.
pub fn from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => HTML,
        "txt" => TEXT,
        "pdf" => PDF,
        "json" => JSON,
        "js" => JAVASCRIPT,
        "xml" => XML,
        "zip" => ZIP,
        "gz" => GZIP,
        _ => BINARY,
    }
}

use std::collections::HashMap;

use crate::http::body::BodyPart;
use crate::http::headers::HeaderMap;

/// HTTP request methods accepted by the server.
///
/// Anything outside this set is rejected while parsing the request line,
/// before headers or body are looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// PUT - Replace a resource
    PUT,
    /// POST - Create or submit data
    POST,
    /// DELETE - Delete a resource
    DELETE,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Example
    ///
    /// ```
    /// # use socketd::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// assert_eq!(Method::from_str("PATCH"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "PUT" => Some(Method::PUT),
            "POST" => Some(Method::POST),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::PUT => "PUT",
            Method::POST => "POST",
            Method::DELETE => "DELETE",
        }
    }
}

/// A parsed HTTP request.
///
/// `params` holds decoded key/value pairs from the query string (GET) or an
/// urlencoded body (POST). `parts` holds the payload: one part for an opaque
/// body, one per section for multipart bodies.
#[derive(Debug)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// The request target as sent, query string included
    pub uri: String,
    /// HTTP version from the request line ("HTTP/1.0" or "HTTP/1.1")
    pub version: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Decoded form and query parameters
    pub params: HashMap<String, String>,
    /// Body parts, empty for bodiless requests
    pub parts: Vec<BodyPart>,
}

impl Request {
    /// Creates a bodiless request with the given method and target.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            version: "HTTP/1.0".to_string(),
            headers: HeaderMap::new(),
            params: HashMap::new(),
            parts: Vec::new(),
        }
    }

    /// The request path without the query string.
    pub fn path(&self) -> &str {
        match self.uri.split_once('?') {
            Some((path, _)) => path,
            None => &self.uri,
        }
    }

    /// The raw query string, when the target has one.
    pub fn query(&self) -> Option<&str> {
        self.uri.split_once('?').map(|(_, query)| query)
    }

    /// Retrieves the first value of a header by name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.first_value(key)
    }

    /// Retrieves a decoded parameter by name.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|v| v.as_str())
    }

    /// The Content-Length header parsed as a byte count, 0 when absent
    /// or unparseable.
    pub fn content_length(&self) -> u64 {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

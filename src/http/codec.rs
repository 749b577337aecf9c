use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::buffer::StreamBuf;
use crate::http::body::BodyPart;
use crate::http::headers::HeaderMap;
use crate::http::mime;
use crate::http::request::{Method, Request};

const DOUBLE_EOL: &[u8] = b"\r\n\r\n";

/// Failures while decoding a request from the wire.
///
/// `Malformed` and `Timeout` are answered with an error response before the
/// connection closes; the peer is already gone for the other two, so nothing
/// is sent.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("connection closed by peer")]
    ConnectionClosed,
    #[error("timed out waiting for request data")]
    Timeout,
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Decodes HTTP/1.0 requests from a byte stream.
///
/// Bytes received past the end of one request stay buffered and seed the
/// next call, so back-to-back requests on one connection survive arbitrary
/// packet boundaries.
pub struct RequestReader {
    buffer: StreamBuf,
    scratch: Vec<u8>,
    idle_timeout: Duration,
}

impl RequestReader {
    /// `buffer_len` sizes each socket read; `idle_timeout` bounds how long
    /// a single read may block (zero disables the limit).
    pub fn new(buffer_len: usize, idle_timeout: Duration) -> Self {
        Self {
            buffer: StreamBuf::with_capacity(buffer_len),
            scratch: vec![0u8; buffer_len],
            idle_timeout,
        }
    }

    /// Reads one complete request, pulling more bytes from `stream` as
    /// needed. Returns `Ok(None)` when the peer closes the connection
    /// cleanly between requests.
    pub async fn read_request<R>(&mut self, stream: &mut R) -> Result<Option<Request>, HttpError>
    where
        R: AsyncRead + Unpin + Send,
    {
        // Request line and headers run up to the first blank line.
        let head_end = loop {
            if let Some(end) = self.buffer.find(DOUBLE_EOL) {
                break end;
            }
            if self.fill(stream).await? == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(HttpError::ConnectionClosed);
            }
        };

        let head = self.buffer.as_slice()[..head_end].to_vec();
        self.buffer.shift(head_end);

        let mut request = parse_head(&head)?;

        if matches!(request.method, Method::POST | Method::PUT) {
            if request
                .headers
                .contains_value("Content-Type", mime::MULTIPART_FORM)
            {
                let mut parts = Vec::new();
                self.read_multipart(stream, &request.headers, &mut parts)
                    .await?;
                request.parts = parts;
            } else {
                self.read_plain_body(stream, &mut request).await?;
            }
        }

        Ok(Some(request))
    }

    /// One timed read into the holding buffer. Returns the byte count,
    /// 0 at end of stream.
    async fn fill<R>(&mut self, stream: &mut R) -> Result<usize, HttpError>
    where
        R: AsyncRead + Unpin,
    {
        let read = if self.idle_timeout.is_zero() {
            stream.read(&mut self.scratch).await?
        } else {
            match tokio::time::timeout(self.idle_timeout, stream.read(&mut self.scratch)).await {
                Ok(done) => done?,
                Err(_) => return Err(HttpError::Timeout),
            }
        };

        self.buffer.append(&self.scratch[..read]);
        Ok(read)
    }

    /// Buffers a body of exactly `Content-Length` bytes. Urlencoded forms
    /// land in `request.params`; anything else becomes a single opaque part.
    async fn read_plain_body<R>(
        &mut self,
        stream: &mut R,
        request: &mut Request,
    ) -> Result<(), HttpError>
    where
        R: AsyncRead + Unpin,
    {
        let declared = request
            .headers
            .first_value("Content-Length")
            .ok_or_else(|| HttpError::Malformed("missing Content-Length".into()))?;
        let length: usize = declared
            .parse()
            .map_err(|_| HttpError::Malformed(format!("bad Content-Length: {declared:?}")))?;

        while self.buffer.len() < length {
            if self.fill(stream).await? == 0 {
                return Err(HttpError::ConnectionClosed);
            }
        }

        if request
            .headers
            .contains_value("Content-Type", mime::URLENCODED)
        {
            let text = std::str::from_utf8(&self.buffer.as_slice()[..length])
                .map_err(|_| HttpError::Malformed("urlencoded body is not valid UTF-8".into()))?;
            let decoded = decode_percent(text)?;
            parse_params(&decoded, &mut request.params);
            self.buffer.shift(length);
        } else {
            let payload = self.buffer.as_slice()[..length].to_vec();
            self.buffer.shift(length);
            request.parts.push(BodyPart::from_bytes(payload));
        }

        Ok(())
    }

    /// Decodes a multipart body whose boundary is declared in `source`.
    ///
    /// Each section becomes one part: sections that announce a filename are
    /// spooled to a temp file, nested `multipart/mixed` sections are decoded
    /// recursively and the container itself recorded as an empty part.
    fn read_multipart<'a, R>(
        &'a mut self,
        stream: &'a mut R,
        source: &'a HeaderMap,
        parts: &'a mut Vec<BodyPart>,
    ) -> Pin<Box<dyn Future<Output = Result<(), HttpError>> + Send + 'a>>
    where
        R: AsyncRead + Unpin + Send,
    {
        Box::pin(async move {
            let boundary = multipart_boundary(source)?;
            let boundary_bytes = boundary.as_bytes().to_vec();
            let end_bytes = format!("{boundary}--").into_bytes();

            loop {
                // Section head: the boundary line plus metadata, up to a
                // blank line.
                let head_end = loop {
                    if let Some(end) = self.buffer.find(DOUBLE_EOL) {
                        break end;
                    }
                    if self.fill(stream).await? == 0 {
                        return Err(HttpError::ConnectionClosed);
                    }
                };
                let head = self.buffer.as_slice()[..head_end].to_vec();
                self.buffer.shift(head_end);
                let metadata = parse_part_metadata(&head)?;

                if metadata.contains_value("Content-Type", mime::MULTIPART_MIXED) {
                    self.read_multipart(stream, &metadata, parts).await?;
                }

                // Section payload runs up to the next boundary marker.
                let cut = loop {
                    if let Some(end) = self.buffer.find(&boundary_bytes) {
                        break end - boundary_bytes.len();
                    }
                    if self.fill(stream).await? == 0 {
                        return Err(HttpError::ConnectionClosed);
                    }
                };

                // The payload is separated from the boundary by one CRLF.
                let payload_len = cut.checked_sub(2).ok_or_else(|| {
                    HttpError::Malformed("multipart section without trailing line break".into())
                })?;
                let payload = self.buffer.as_slice()[..payload_len].to_vec();
                self.buffer.shift(cut);

                if metadata
                    .first_value_starting_with("Content-Disposition", "filename=")
                    .is_some()
                {
                    parts.push(spool_temp_part(&payload, metadata)?);
                } else {
                    let mut part = BodyPart::from_bytes(payload);
                    part.metadata = metadata;
                    parts.push(part);
                }

                // The buffer now starts at a boundary marker. Decide whether
                // it is the final one; a closing "--" may still be in flight,
                // so after seeing a plain boundary pull at least two more
                // bytes before ruling the final marker out.
                let final_match = loop {
                    if let Some(end) = self.buffer.find(&end_bytes) {
                        break Some(end);
                    }
                    if self.buffer.find(&boundary_bytes).is_some() {
                        let mut extra = 0;
                        while extra < 2 {
                            let read = self.fill(stream).await?;
                            if read == 0 {
                                break;
                            }
                            extra += read;
                        }
                        break self.buffer.find(&end_bytes);
                    }
                    if self.fill(stream).await? == 0 {
                        return Err(HttpError::ConnectionClosed);
                    }
                };

                // Only a final marker sitting right at the front of the
                // buffer terminates this body; a match further out belongs
                // to an inner or later section.
                if let Some(end) = final_match {
                    if end == end_bytes.len() {
                        self.buffer.shift(end);
                        return Ok(());
                    }
                }
            }
        })
    }
}

fn parse_head(head: &[u8]) -> Result<Request, HttpError> {
    let text = std::str::from_utf8(head)
        .map_err(|_| HttpError::Malformed("request head is not valid UTF-8".into()))?;

    let mut lines = text.split("\r\n");

    // Stray blank lines ahead of the request line are tolerated, e.g. the
    // CRLF trailing a previous multipart body.
    let request_line = lines
        .by_ref()
        .find(|line| !line.is_empty())
        .ok_or_else(|| HttpError::Malformed("empty request head".into()))?;

    let mut tokens = request_line.splitn(3, ' ');
    let method_token = tokens
        .next()
        .ok_or_else(|| HttpError::Malformed("missing request method".into()))?;
    let uri_token = tokens
        .next()
        .ok_or_else(|| HttpError::Malformed("missing request target".into()))?;
    let version_token = tokens
        .next()
        .ok_or_else(|| HttpError::Malformed("missing protocol version".into()))?;

    let method = Method::from_str(method_token)
        .ok_or_else(|| HttpError::Malformed(format!("unsupported method: {method_token:?}")))?;

    match version_token {
        "HTTP/1.0" | "HTTP/1.1" => {}
        other => {
            return Err(HttpError::Malformed(format!(
                "unsupported protocol version: {other:?}"
            )));
        }
    }

    let headers = parse_header_lines(lines)?;

    let mut params = HashMap::new();
    if method == Method::GET {
        if let Some((_, query)) = uri_token.split_once('?') {
            let decoded = decode_percent(query)?;
            parse_params(&decoded, &mut params);
        }
    }

    Ok(Request {
        method,
        uri: uri_token.to_string(),
        version: version_token.to_string(),
        headers,
        params,
        parts: Vec::new(),
    })
}

/// Shared between request headers and multipart section metadata: names
/// split at the first colon, values split on commas and semicolons.
fn parse_header_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, rest) = line
            .split_once(':')
            .ok_or_else(|| HttpError::Malformed(format!("header without separator: {line:?}")))?;
        for value in rest.split([',', ';']) {
            headers.append(name.trim(), value.trim());
        }
    }

    Ok(headers)
}

fn parse_part_metadata(head: &[u8]) -> Result<HeaderMap, HttpError> {
    let text = std::str::from_utf8(head)
        .map_err(|_| HttpError::Malformed("part metadata is not valid UTF-8".into()))?;

    // The first line is the boundary marker itself.
    let mut lines = text.split("\r\n");
    lines.next();
    parse_header_lines(lines)
}

fn multipart_boundary(headers: &HeaderMap) -> Result<String, HttpError> {
    let value = headers
        .first_value_starting_with("Content-Type", "boundary=")
        .ok_or_else(|| HttpError::Malformed("multipart body without a boundary".into()))?;

    let token = value["boundary=".len()..].replace('"', "");
    let token = token.trim();
    if token.is_empty() {
        return Err(HttpError::Malformed("empty multipart boundary".into()));
    }

    Ok(format!("--{token}"))
}

fn spool_temp_part(payload: &[u8], metadata: HeaderMap) -> Result<BodyPart, HttpError> {
    let mut file = tempfile::Builder::new()
        .prefix("socketd-")
        .suffix(".part")
        .tempfile()?;
    file.write_all(payload)?;
    file.flush()?;

    let (file, path) = file.into_parts();
    Ok(BodyPart::from_temp_file(
        file,
        payload.len() as u64,
        path,
        metadata,
    ))
}

/// Resolves `+` and `%XX` escapes. Decoding happens before pairs are split,
/// so an encoded separator ends up splitting like a literal one.
fn decode_percent(raw: &str) -> Result<String, HttpError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|pair| std::str::from_utf8(pair).ok())
                    .ok_or_else(|| HttpError::Malformed("truncated percent escape".into()))?;
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| HttpError::Malformed(format!("bad percent escape: %{hex}")))?;
                out.push(byte);
                i += 3;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8(out)
        .map_err(|_| HttpError::Malformed("decoded text is not valid UTF-8".into()))
}

fn parse_params(decoded: &str, params: &mut HashMap<String, String>) {
    for pair in decoded.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => params.insert(key.to_string(), value.to_string()),
            None => params.insert(pair.to_string(), String::new()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plus_and_percent_escapes() {
        assert_eq!(decode_percent("a%20b+c").unwrap(), "a b c");
        assert!(decode_percent("broken%2").is_err());
        assert!(decode_percent("broken%zz").is_err());
    }

    #[test]
    fn parses_request_line_headers_and_query() {
        let head =
            b"GET /files?q=a%20b+c HTTP/1.0\r\nHost: localhost\r\nAccept: text/html, text/plain\r\n\r\n";

        let request = parse_head(head).unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path(), "/files");
        assert_eq!(request.param("q"), Some("a b c"));
        assert_eq!(request.header("Host"), Some("localhost"));
        assert_eq!(
            request.headers.values("Accept").unwrap(),
            &["text/html".to_string(), "text/plain".to_string()]
        );
    }

    #[test]
    fn rejects_unknown_methods_and_versions() {
        assert!(parse_head(b"PATCH / HTTP/1.0\r\n\r\n").is_err());
        assert!(parse_head(b"GET / HTTP/2.0\r\n\r\n").is_err());
        assert!(parse_head(b"GET /\r\n\r\n").is_err());
    }
}

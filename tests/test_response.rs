use std::io::Write;

use socketd::http::body::BodyPart;
use socketd::http::response::{Response, ResponseBuilder, StatusCode};
use socketd::http::writer::ResponseWriter;

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Created.as_u16(), 201);
    assert_eq!(StatusCode::NoContent.as_u16(), 204);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::RequestTimeout.as_u16(), 408);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::Created.reason_phrase(), "Created");
    assert_eq!(StatusCode::NoContent.reason_phrase(), "No Content");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(StatusCode::RequestTimeout.reason_phrase(), "Request Timeout");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_response_builder_basic() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(BodyPart::from_bytes(&b"Hello, World!"[..]))
        .build();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body.bytes(), Some(&b"Hello, World!"[..]));
}

#[test]
fn test_response_builder_with_headers() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .header("X-Custom", "value")
        .body(BodyPart::from_bytes(&b"test"[..]))
        .build();

    assert_eq!(
        response.headers.first_value("Content-Type"),
        Some("text/plain")
    );
    assert_eq!(response.headers.first_value("X-Custom"), Some("value"));
    assert_eq!(response.headers.len(), 2);
}

#[test]
fn test_response_helpers() {
    let ok = Response::ok(&b"test content"[..]);
    assert_eq!(ok.status, StatusCode::Ok);
    assert_eq!(ok.body.bytes(), Some(&b"test content"[..]));

    let bad_request = Response::bad_request();
    assert_eq!(bad_request.status, StatusCode::BadRequest);
    assert_eq!(bad_request.body.bytes(), Some(&b"400 Bad Request"[..]));

    let not_found = Response::not_found();
    assert_eq!(not_found.status, StatusCode::NotFound);
    assert_eq!(not_found.body.bytes(), Some(&b"404 Not Found"[..]));

    let timeout = Response::request_timeout();
    assert_eq!(timeout.status, StatusCode::RequestTimeout);
    assert_eq!(timeout.body.bytes(), Some(&b"408 Request Timeout"[..]));

    let error = Response::internal_error();
    assert_eq!(error.status, StatusCode::InternalServerError);
    assert_eq!(
        error.body.bytes(),
        Some(&b"500 Internal Server Error"[..])
    );
}

#[test]
fn test_empty_response_has_empty_body() {
    let response = Response::new(StatusCode::NoContent);
    assert!(response.body.is_empty());
    assert!(response.headers.is_empty());
}

#[tokio::test]
async fn test_writer_stamps_date_and_content_length() {
    let writer = ResponseWriter::new(4096);
    let mut out: Vec<u8> = Vec::new();

    writer
        .send(&mut out, Response::ok(&b"payload"[..]))
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(text.contains("Date:"));
    assert!(text.contains("GMT\r\n"));
    assert!(text.contains("Content-Length:7\r\n"));
    assert!(text.ends_with("\r\n\r\npayload"));
}

#[tokio::test]
async fn test_writer_keeps_caller_supplied_date_and_length() {
    let writer = ResponseWriter::new(4096);
    let mut out: Vec<u8> = Vec::new();

    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Date", "Thu, 1 Jan 1970 00:00:00 GMT")
        .header("Content-Length", "999")
        .body(BodyPart::from_bytes(&b"test"[..]))
        .build();
    writer.send(&mut out, response).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Date:").count(), 1);
    assert!(text.contains("Date:Thu, 1 Jan 1970 00:00:00 GMT\r\n"));
    assert!(text.contains("Content-Length:999\r\n"));
}

#[tokio::test]
async fn test_writer_omits_content_length_for_empty_body() {
    let writer = ResponseWriter::new(4096);
    let mut out: Vec<u8> = Vec::new();

    writer
        .send(&mut out, Response::new(StatusCode::NoContent))
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("HTTP/1.0 204 No Content\r\n"));
    assert!(!text.contains("Content-Length"));
    assert!(text.ends_with("\r\n\r\n"));
}

#[tokio::test]
async fn test_writer_streams_file_body_in_chunks() {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(b"file payload").unwrap();

    // A chunk size smaller than the body forces several read cycles.
    let writer = ResponseWriter::new(4);
    let mut out: Vec<u8> = Vec::new();

    writer
        .send(&mut out, Response::file(file).unwrap())
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Content-Length:12\r\n"));
    assert!(text.ends_with("\r\n\r\nfile payload"));
}

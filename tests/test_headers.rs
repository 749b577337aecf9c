use socketd::http::headers::HeaderMap;

#[test]
fn test_append_collects_values_in_order() {
    let mut headers = HeaderMap::new();
    headers.append("Accept", "text/html");
    headers.append("Accept", "text/plain");

    assert_eq!(
        headers.values("Accept").unwrap(),
        &["text/html".to_string(), "text/plain".to_string()]
    );
    assert_eq!(headers.first_value("Accept"), Some("text/html"));
    assert_eq!(headers.len(), 1);
}

#[test]
fn test_key_lookup_ignores_case() {
    let mut headers = HeaderMap::new();
    headers.append("Content-Type", "text/html");

    assert!(headers.contains_key("content-type"));
    assert!(headers.contains_key("CONTENT-TYPE"));
    assert_eq!(headers.first_value("content-TYPE"), Some("text/html"));
    assert!(!headers.contains_key("Content-Length"));
}

#[test]
fn test_contains_value_ignores_case() {
    let mut headers = HeaderMap::new();
    headers.append("Content-Type", "Multipart/Form-Data");

    assert!(headers.contains_value("content-type", "multipart/form-data"));
    assert!(!headers.contains_value("content-type", "text/html"));
    assert!(!headers.contains_value("Missing", "anything"));
}

#[test]
fn test_first_value_starting_with_ignores_case() {
    let mut headers = HeaderMap::new();
    headers.append("Content-Type", "multipart/form-data");
    headers.append("Content-Type", "Boundary=XYZ");

    assert_eq!(
        headers.first_value_starting_with("content-type", "boundary="),
        Some("Boundary=XYZ")
    );
    assert_eq!(
        headers.first_value_starting_with("content-type", "charset="),
        None
    );
}

#[test]
fn test_set_replaces_existing_values() {
    let mut headers = HeaderMap::new();
    headers.append("Content-Length", "10");
    headers.append("Content-Length", "20");
    headers.set("Content-Length", "30");

    assert_eq!(headers.values("Content-Length").unwrap(), &["30".to_string()]);
}

#[test]
fn test_iter_preserves_insertion_order() {
    let mut headers = HeaderMap::new();
    headers.append("B", "2");
    headers.append("A", "1");
    headers.append("C", "3");

    let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["B", "A", "C"]);
}

#[test]
fn test_wire_format_joins_values_with_commas() {
    let mut headers = HeaderMap::new();
    headers.append("Accept", "text/html");
    headers.append("Accept", "text/plain");
    headers.append("Host", "localhost");

    let mut out = Vec::new();
    headers.write_wire(&mut out);

    assert_eq!(out, b"Accept:text/html,text/plain\r\nHost:localhost\r\n");
}

#[test]
fn test_empty_map() {
    let headers = HeaderMap::new();
    assert!(headers.is_empty());
    assert_eq!(headers.len(), 0);
    assert_eq!(headers.values("Anything"), None);

    let mut out = Vec::new();
    headers.write_wire(&mut out);
    assert!(out.is_empty());
}

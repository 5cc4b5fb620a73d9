//! Tests for the report client helpers.

use super::http::{encode_url_path_segment, format_http_error, read_bytes, read_limited};
use crate::report::ApiError;
use super::ReportClient;

#[test]
fn test_encode_path_segment_keeps_unreserved() {
    assert_eq!(encode_url_path_segment("job-42_a.b~c"), "job-42_a.b~c");
}

#[test]
fn test_encode_path_segment_escapes_reserved() {
    assert_eq!(encode_url_path_segment("a/b c"), "a%2Fb%20c");
    assert_eq!(encode_url_path_segment("é"), "%C3%A9");
}

#[test]
fn test_format_http_error_prefers_message_field() {
    let body = r#"{"status":400,"error":"Bad Request","message":"Invalid semester"}"#;
    assert_eq!(format_http_error(400, body), "Invalid semester");
}

#[test]
fn test_format_http_error_falls_back_to_error_field() {
    let body = r#"{"status":401,"error":"Unauthorized","message":""}"#;
    assert_eq!(format_http_error(401, body), "Unauthorized");
}

#[test]
fn test_format_http_error_plain_text_and_empty() {
    assert_eq!(format_http_error(500, "boom\n"), "boom");
    assert_eq!(format_http_error(502, "  "), "request failed with status 502");
}

#[test]
fn test_base_url_trailing_slash_is_trimmed() {
    let client = ReportClient::with_url("http://reports.local:8080/", None);
    assert_eq!(client.base_url(), "http://reports.local:8080");
}

#[test]
fn test_debug_does_not_leak_token() {
    let client = ReportClient::new(Some("secret-token".to_string()));
    let rendered = format!("{:?}", client);
    assert!(!rendered.contains("secret-token"));
    assert!(rendered.contains("authenticated: true"));
}

#[test]
fn test_read_limited_accepts_body_at_limit() {
    let bytes = read_limited(&b"abcd"[..], 4).unwrap();
    assert_eq!(bytes, b"abcd");
}

#[test]
fn test_read_limited_rejects_body_over_limit() {
    let err = read_limited(&b"abcde"[..], 4).unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[test]
fn test_oversized_artifact_is_not_truncated() {
    let body = "a".repeat(64 * 1024 * 1024 + 10);
    let resp = ureq::Response::new(200, "OK", &body).unwrap();

    match read_bytes(resp) {
        Err(ApiError::Decode(message)) => assert_eq!(message, "artifact exceeds 64 MiB"),
        Err(other) => panic!("expected decode error, got {other:?}"),
        Ok(bytes) => panic!("got a truncated artifact of {} bytes", bytes.len()),
    }
}

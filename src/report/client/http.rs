//! Request helpers shared by the report client.

use std::io::Read;

use crate::report::error::ApiError;

pub(super) const AUTH_HEADER: &str = "Authorization";

/// Upper bound for downloaded artifacts
const MAX_ARTIFACT_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB

pub(super) fn encode_url_path_segment(segment: &str) -> String {
    // RFC3986 unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
    let mut out = String::with_capacity(segment.len());
    for &b in segment.as_bytes() {
        let is_unreserved =
            matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~');
        if is_unreserved {
            out.push(b as char);
        } else {
            out.push('%');
            out.push_str(&format!("{:02X}", b));
        }
    }
    out
}

/// Build a readable message from an error response body.
///
/// Spring-style error bodies carry `message` and `error` fields; either is
/// preferred over the raw body.
pub(super) fn format_http_error(code: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("request failed with status {code}");
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    let field = |name: &str| {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    field("message")
        .or_else(|| field("error"))
        .unwrap_or_else(|| body.to_string())
}

pub(super) fn with_auth(req: ureq::Request, token: Option<&str>) -> ureq::Request {
    match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => req.set(AUTH_HEADER, &format!("Bearer {token}")),
        None => req,
    }
}

pub(super) fn map_ureq_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            ApiError::Status {
                code,
                message: format_http_error(code, &body),
            }
        }
        ureq::Error::Transport(t) => ApiError::Transport(t.to_string()),
    }
}

pub(super) fn read_text(resp: ureq::Response) -> Result<String, ApiError> {
    resp.into_string()
        .map_err(|e| ApiError::Decode(format!("failed to read response body: {e}")))
}

pub(super) fn read_json<T: serde::de::DeserializeOwned>(
    resp: ureq::Response,
) -> Result<T, ApiError> {
    let body = read_text(resp)?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

pub(super) fn read_bytes(resp: ureq::Response) -> Result<Vec<u8>, ApiError> {
    read_limited(resp.into_reader(), MAX_ARTIFACT_BYTES)
}

/// Read at most `limit` bytes; a longer body is an error, never a truncated artifact
pub(super) fn read_limited(reader: impl Read, limit: u64) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    reader.take(limit + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        return Err(ApiError::Decode(format!(
            "artifact exceeds {} MiB",
            limit / (1024 * 1024)
        )));
    }
    Ok(bytes)
}

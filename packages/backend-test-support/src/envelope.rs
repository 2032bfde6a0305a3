//! Assertions on the `{data, code, isSuccess, message}` response envelope.

use actix_web::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Envelope as seen by a client, with `data` left untyped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeLike {
    pub data: Value,
    pub code: i32,
    pub is_success: bool,
    pub message: String,
}

pub fn parse_envelope(body: &[u8]) -> EnvelopeLike {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        panic!(
            "body is not an envelope ({e}): {}",
            String::from_utf8_lossy(body)
        )
    })
}

/// Success envelope (code 0) with the given status; returns `data`.
pub fn assert_success(status: StatusCode, body: &[u8]) -> Value {
    let envelope = parse_envelope(body);
    assert!(status.is_success(), "expected 2xx, got {status}: {envelope:?}");
    assert!(envelope.is_success, "isSuccess false: {envelope:?}");
    assert_eq!(envelope.code, 0, "{envelope:?}");
    assert_eq!(envelope.message, "Successfully!");
    envelope.data
}

/// Failure envelope with the given HTTP status and numeric code, `data: null`.
pub fn assert_failure(
    status: StatusCode,
    body: &[u8],
    expected_status: StatusCode,
    expected_code: i32,
) -> EnvelopeLike {
    let envelope = parse_envelope(body);
    assert_eq!(status, expected_status, "{envelope:?}");
    assert!(!envelope.is_success, "isSuccess true: {envelope:?}");
    assert_eq!(envelope.code, expected_code, "{envelope:?}");
    assert!(envelope.data.is_null(), "data not null: {envelope:?}");
    assert!(!envelope.message.is_empty());
    envelope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_returns_data() {
        let body = br#"{"data":{"x":1},"code":0,"isSuccess":true,"message":"Successfully!"}"#;
        let data = assert_success(StatusCode::OK, body);
        assert_eq!(data["x"], 1);
    }

    #[test]
    fn failure_checks_code_and_null_data() {
        let body = br#"{"data":null,"code":1002,"isSuccess":false,"message":"Email already exists"}"#;
        let envelope = assert_failure(
            StatusCode::BAD_REQUEST,
            body,
            StatusCode::BAD_REQUEST,
            1002,
        );
        assert_eq!(envelope.message, "Email already exists");
    }

    #[test]
    #[should_panic]
    fn failure_rejects_wrong_code() {
        let body = br#"{"data":null,"code":1002,"isSuccess":false,"message":"Email already exists"}"#;
        assert_failure(StatusCode::BAD_REQUEST, body, StatusCode::BAD_REQUEST, 1000);
    }
}

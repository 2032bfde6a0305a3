//! Uniform response envelope: `{data, code, isSuccess, message}`.
//!
//! Every flow answers with this shape, success or failure. On failure `data`
//! is always `null` and `code`/`message` come from [`ErrorCode`].

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::errors::ErrorCode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub code: i32,
    pub is_success: bool,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            code: ErrorCode::Success.value(),
            is_success: true,
            message: ErrorCode::Success.message().to_string(),
        }
    }

    pub fn failure(code: ErrorCode) -> Self {
        Self {
            data: None,
            code: code.value(),
            is_success: false,
            message: code.message().to_string(),
        }
    }
}

impl ApiResponse<()> {
    /// Success with `data: null`.
    pub fn empty() -> Self {
        Self {
            data: None,
            code: ErrorCode::Success.value(),
            is_success: true,
            message: ErrorCode::Success.message().to_string(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn into_response(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_envelope_uses_camel_case() {
        let body = serde_json::to_value(ApiResponse::success(json!({"accessToken": "t"}))).unwrap();
        assert_eq!(
            body,
            json!({
                "data": {"accessToken": "t"},
                "code": 0,
                "isSuccess": true,
                "message": "Successfully!"
            })
        );
    }

    #[test]
    fn empty_success_has_null_data() {
        let body = serde_json::to_value(ApiResponse::empty()).unwrap();
        assert!(body["data"].is_null());
        assert_eq!(body["isSuccess"], true);
    }

    #[test]
    fn failure_carries_code_and_message() {
        let body = serde_json::to_value(ApiResponse::<()>::failure(ErrorCode::OtpInvalid)).unwrap();
        assert_eq!(body["code"], 1007);
        assert_eq!(body["message"], "OTP is invalid");
        assert_eq!(body["isSuccess"], false);
        assert!(body["data"].is_null());
    }
}

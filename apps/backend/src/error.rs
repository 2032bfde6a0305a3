use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::errors::domain::DomainError;
use crate::errors::ErrorCode;
use crate::http::ApiResponse;
use crate::infra::db_errors::map_db_err;

/// One leaf failure per flow. Lower-level causes are logged where they occur
/// and never carried in the variant, so the client only sees code + message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Database error")]
    DatabaseError,
    #[error("Invalid data: {detail}")]
    DataInvalid { detail: String },
    #[error("Email not found")]
    EmailNotFound,
    #[error("Password hashing failed")]
    HashingFailure,
    #[error("Email already exists")]
    EmailExists,
    #[error("Password invalid")]
    PasswordInvalid,
    #[error("Token error")]
    TokenError,
    #[error("Email already confirmed")]
    EmailAlreadyConfirmed,
    #[error("User not found")]
    UserNotFound,
    #[error("OTP invalid")]
    OtpInvalid,
    #[error("Email not confirmed")]
    EmailNotConfirmed,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::DatabaseError => ErrorCode::DatabaseError,
            AppError::DataInvalid { .. } => ErrorCode::DataInvalid,
            AppError::EmailNotFound => ErrorCode::EmailNotFound,
            AppError::HashingFailure => ErrorCode::HashingFailure,
            AppError::EmailExists => ErrorCode::EmailExists,
            AppError::PasswordInvalid => ErrorCode::PasswordInvalid,
            AppError::TokenError => ErrorCode::TokenError,
            AppError::EmailAlreadyConfirmed => ErrorCode::EmailAlreadyConfirmed,
            AppError::UserNotFound => ErrorCode::UserNotFound,
            AppError::OtpInvalid => ErrorCode::OtpInvalid,
            AppError::EmailNotConfirmed => ErrorCode::EmailNotConfirmed,
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::Config { .. } | AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DatabaseError | AppError::Config { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::DataInvalid {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        if e.is_unique_email() {
            AppError::EmailExists
        } else {
            AppError::DatabaseError
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e).into()
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        ApiResponse::<()>::failure(self.code()).into_response(self.status())
    }
}

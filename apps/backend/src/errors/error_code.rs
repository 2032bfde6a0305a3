//! Error codes for the identity API.
//!
//! Every failure surfaced by a flow is exactly one of these codes. The numeric
//! value and the human-readable message are fixed and appear verbatim in the
//! response envelope; add new codes here, never pass ad-hoc numbers around.

use core::fmt;

/// Grouping of codes, used for logging and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorFamily {
    General,
    Identity,
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // General
    Success,
    DatabaseError,
    DataInvalid,

    // Identity (1000..)
    EmailNotFound,
    HashingFailure,
    EmailExists,
    PasswordInvalid,
    TokenError,
    EmailAlreadyConfirmed,
    UserNotFound,
    OtpInvalid,
    EmailNotConfirmed,

    // Boundary
    /// Missing or invalid bearer token
    Unauthorized,
    /// Configuration or startup failure
    Internal,
}

impl ErrorCode {
    /// Numeric code carried in the envelope's `code` field.
    pub const fn value(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::DatabaseError => 501,
            Self::DataInvalid => 502,

            Self::EmailNotFound => 1000,
            Self::HashingFailure => 1001,
            Self::EmailExists => 1002,
            Self::PasswordInvalid => 1003,
            Self::TokenError => 1004,
            Self::EmailAlreadyConfirmed => 1005,
            Self::UserNotFound => 1006,
            Self::OtpInvalid => 1007,
            Self::EmailNotConfirmed => 1008,

            Self::Unauthorized => 401,
            Self::Internal => 500,
        }
    }

    /// Fixed message looked up by code.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Successfully!",
            Self::DatabaseError => "DB Error",
            Self::DataInvalid => "Data is invalid",

            Self::EmailNotFound => "Email does not exist",
            Self::HashingFailure => "Can't hash password",
            Self::EmailExists => "Email already exists",
            Self::PasswordInvalid => "Password is invalid",
            Self::TokenError => "Error generating or verifying token",
            Self::EmailAlreadyConfirmed => "Email already confirmed",
            Self::UserNotFound => "User not found",
            Self::OtpInvalid => "OTP is invalid",
            Self::EmailNotConfirmed => "Email is not confirmed",

            Self::Unauthorized => "Authentication required",
            Self::Internal => "Internal server error",
        }
    }

    /// SCREAMING_SNAKE_CASE name, used as a structured log field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DataInvalid => "DATA_INVALID",
            Self::EmailNotFound => "EMAIL_NOT_FOUND",
            Self::HashingFailure => "HASHING_FAILURE",
            Self::EmailExists => "EMAIL_EXISTS",
            Self::PasswordInvalid => "PASSWORD_INVALID",
            Self::TokenError => "TOKEN_ERROR",
            Self::EmailAlreadyConfirmed => "EMAIL_ALREADY_CONFIRMED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::OtpInvalid => "OTP_INVALID",
            Self::EmailNotConfirmed => "EMAIL_NOT_CONFIRMED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal => "INTERNAL",
        }
    }

    pub const fn family(&self) -> ErrorFamily {
        match self {
            Self::Success | Self::DatabaseError | Self::DataInvalid => ErrorFamily::General,
            Self::Unauthorized | Self::Internal => ErrorFamily::Boundary,
            _ => ErrorFamily::Identity,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

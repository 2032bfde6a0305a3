//! Claims carried by every token this service signs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token may be used for. Embedded in the claims and checked on
/// verification, so a token minted for one purpose is rejected for another
/// even if two purposes were ever configured with the same secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Refresh,
    VerifyEmail,
}

impl TokenPurpose {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
            TokenPurpose::VerifyEmail => "verify_email",
        }
    }
}

/// Identity embedded into a token; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub id: Uuid,
    pub email: String,
}

impl TokenPayload {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub purpose: TokenPurpose,
    /// Unique per token, so two tokens minted in the same second differ.
    pub jti: Uuid,
}

impl From<Claims> for TokenPayload {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
        }
    }
}

//! Error codes and persistence errors for the identity backend.

pub mod domain;
pub mod error_code;

pub use domain::DomainError;
pub use error_code::{ErrorCode, ErrorFamily};

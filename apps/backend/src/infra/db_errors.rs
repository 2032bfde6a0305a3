//! SeaORM -> DomainError translation.
//!
//! Adapters return `sea_orm::DbErr`; repositories translate it here so the
//! services only ever see a unique-email conflict or an infra failure.

use migration::USERS_EMAIL_KEY;
use sea_orm::{DbErr, SqlErr};
use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Whether a unique-violation message names the users email constraint.
/// Postgres reports the index name; SQLite reports `table.column`.
fn names_users_email(msg: &str) -> bool {
    msg.contains(USERS_EMAIL_KEY) || msg.contains("users.email")
}

fn looks_like_unique_violation(msg: &str) -> bool {
    msg.contains("23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

/// Translate a `DbErr` into a `DomainError` with sanitized, PII-safe detail.
pub fn map_db_err(e: DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    let unique_detail = match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => Some(detail),
        _ if looks_like_unique_violation(&error_msg) => Some(error_msg.clone()),
        _ => None,
    };

    if let Some(detail) = unique_detail {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&detail), "Unique constraint violation");
        if names_users_email(&detail) || names_users_email(&error_msg) {
            return DomainError::conflict(ConflictKind::UniqueEmail, "Email already registered");
        }
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    match &e {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database unavailable");
            DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable")
        }
        _ if error_msg.contains("timeout") || error_msg.contains("pool") => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database timeout or pool issue");
            DomainError::infra(InfraErrorKind::Timeout, "Database timeout")
        }
        _ => {
            error!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Unhandled database error");
            DomainError::infra(
                InfraErrorKind::Other("DbErr".into()),
                "Database operation failed",
            )
        }
    }
}

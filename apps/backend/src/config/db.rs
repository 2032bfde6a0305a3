use std::env;

use crate::error::AppError;

/// Which database the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    /// Private per-connection database; used by tests.
    SqliteMemory,
}

impl DbKind {
    /// Infer the kind from a connection URL.
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("sqlite::memory:") || url.contains("mode=memory") {
            DbKind::SqliteMemory
        } else if url.starts_with("sqlite:") {
            DbKind::SqliteFile
        } else {
            DbKind::Postgres
        }
    }
}

pub const SQLITE_MEMORY_URL: &str = "sqlite::memory:";

/// Build the connection URL for `kind` from the environment.
///
/// Postgres prefers `DATABASE_URL`; otherwise it is assembled from
/// `POSTGRES_HOST`, `POSTGRES_PORT`, `PROD_DB`, `APP_DB_USER` and
/// `APP_DB_PASSWORD`.
pub fn database_url(kind: DbKind) -> Result<String, AppError> {
    match kind {
        DbKind::Postgres => {
            if let Some(url) = non_empty_var("DATABASE_URL") {
                return Ok(url);
            }
            let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_name = must_var("PROD_DB")?;
            let username = must_var("APP_DB_USER")?;
            let password = must_var("APP_DB_PASSWORD")?;
            Ok(format!(
                "postgresql://{username}:{password}@{host}:{port}/{db_name}"
            ))
        }
        DbKind::SqliteFile => {
            let path = env::var("SQLITE_DB_PATH").unwrap_or_else(|_| "identity.sqlite".to_string());
            Ok(format!("sqlite://{path}?mode=rwc"))
        }
        DbKind::SqliteMemory => Ok(SQLITE_MEMORY_URL.to_string()),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Get required environment variable or return error
pub fn must_var(name: &str) -> Result<String, AppError> {
    non_empty_var(name)
        .ok_or_else(|| AppError::config(format!("Required environment variable '{name}' is not set")))
}

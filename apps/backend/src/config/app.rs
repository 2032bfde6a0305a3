//! Process configuration loaded from environment variables.
//!
//! Everything is read and validated once at startup; a bad value stops the
//! process with `AppError::Config` before anything binds a port.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::config::db::{database_url, must_var, DbKind};
use crate::error::AppError;
use crate::mail::smtp::SmtpSettings;
use crate::services::identity::IdentitySettings;
use crate::state::security_config::{SecurityConfig, TokenSettings};

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Backing services
    pub database_url: String,
    pub redis_url: String,

    pub security: SecurityConfig,
    pub smtp: SmtpSettings,
    pub identity: IdentitySettings,

    // HTTP boundary
    pub cors_allowed_origins: Vec<String>,
    pub cookie_secure: bool,
    pub max_json_payload_size: usize,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{name} has an invalid value: '{raw}'"))),
        _ => Ok(default),
    }
}

/// Required secret, at least [`MIN_SECRET_LEN`] characters.
fn secret_var(name: &str) -> Result<Vec<u8>, AppError> {
    let secret = must_var(name)?;
    if secret.len() < MIN_SECRET_LEN {
        return Err(AppError::config(format!(
            "{name} is too short. It should be at least {MIN_SECRET_LEN} characters."
        )));
    }
    Ok(secret.into_bytes())
}

/// Positive token lifetime given in `unit_secs` units. The total must fit
/// an `i64` timestamp offset.
fn lifetime_var(name: &str, default: u64, unit_secs: u64) -> Result<Duration, AppError> {
    let amount = parse_var::<u64>(name, default)?;
    if amount == 0 {
        return Err(AppError::config(format!("{name} must be positive")));
    }
    amount
        .checked_mul(unit_secs)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .map(Duration::from_secs)
        .ok_or_else(|| AppError::config(format!("{name} is out of range: {amount}")))
}

/// Comma-separated origins; empty, `null` and non-http(s) entries are dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let host = var_or("BACKEND_HOST", "0.0.0.0");
        let port = parse_var::<u16>("BACKEND_PORT", 3001)?;

        let database_url = database_url(DbKind::Postgres)?;
        let redis_url = must_var("REDIS_URL")?;

        let access_ttl = lifetime_var("JWT_ACCESS_TTL_MINUTES", 15, 60)?;
        let refresh_ttl = lifetime_var("JWT_REFRESH_TTL_DAYS", 7, 24 * 60 * 60)?;
        let verify_ttl = lifetime_var("JWT_VERIFY_EMAIL_TTL_HOURS", 24, 60 * 60)?;

        let security = SecurityConfig {
            access: TokenSettings::new(secret_var("JWT_SECRET")?, access_ttl),
            refresh: TokenSettings::new(secret_var("JWT_REFRESH_SECRET")?, refresh_ttl),
            verify_email: TokenSettings::new(secret_var("JWT_VERIFY_EMAIL_SECRET")?, verify_ttl),
            issuer: var_or("JWT_ISSUER", "identity"),
            audience: var_or("JWT_AUDIENCE", "identity-clients"),
            algorithm: jsonwebtoken::Algorithm::HS256,
        };

        let smtp = SmtpSettings {
            host: must_var("SMTP_HOST")?,
            port: parse_var::<u16>("SMTP_PORT", 465)?,
            username: must_var("SMTP_USERNAME")?,
            password: must_var("SMTP_PASSWORD")?,
            from: must_var("SMTP_FROM")?,
        };

        let identity = IdentitySettings {
            app_name: var_or("APP_NAME", "Identity"),
            frontend_url: var_or("FRONTEND_URL", "http://localhost:3000"),
        };

        const DEFAULT_MAX_PAYLOAD_SIZE: usize = 64 * 1024;

        Ok(Config {
            host,
            port,
            database_url,
            redis_url,
            security,
            smtp,
            identity,
            cors_allowed_origins: parse_origins(&var_or("CORS_ALLOWED_ORIGINS", "")),
            cookie_secure: parse_var::<bool>("COOKIE_SECURE", false)?,
            max_json_payload_size: parse_var::<usize>(
                "MAX_JSON_PAYLOAD_SIZE",
                DEFAULT_MAX_PAYLOAD_SIZE,
            )?,
        })
    }
}

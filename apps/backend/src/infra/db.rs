use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::DbKind;
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_INTERVAL: Duration = Duration::from_millis(1500);

/// Open a pool for `url`. Does NOT run migrations.
///
/// SQLite in-memory databases exist per connection, so that pool is pinned
/// to a single connection that is never recycled.
pub async fn connect_db(url: &str) -> Result<DatabaseConnection, AppError> {
    let kind = DbKind::from_url(url);
    let mut opts = ConnectOptions::new(url.to_string());
    opts.sqlx_logging(false);

    match kind {
        DbKind::SqliteMemory => {
            opts.max_connections(1)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(24 * 60 * 60))
                .max_lifetime(Duration::from_secs(24 * 60 * 60));
        }
        DbKind::SqliteFile => {
            opts.max_connections(1);
        }
        DbKind::Postgres => {
            opts.max_connections(20)
                .min_connections(1)
                .connect_timeout(Duration::from_secs(5));
        }
    }

    let conn = Database::connect(opts).await.map_err(|e| {
        AppError::config(format!("Database connection failed ({kind:?}): {e}"))
    })?;
    Ok(conn)
}

/// Retry a connection attempt with fixed interval delays; the last error
/// is returned once attempts are exhausted.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval: Duration,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempts = attempt, "connection_retry=success");
                }
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                warn!(attempt, max_attempts, error = %e, "connection_retry=failed");
                tokio::time::sleep(interval).await;
                attempt += 1;
            }
        }
    }
}

/// Connect (with retry) and bring the schema up to date.
pub async fn bootstrap_db(url: &str) -> Result<DatabaseConnection, AppError> {
    let attempts = match DbKind::from_url(url) {
        DbKind::Postgres => CONNECT_ATTEMPTS,
        _ => 1,
    };
    let conn = retry_connection(|| connect_db(url), attempts, CONNECT_INTERVAL).await?;

    migrate(&conn, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::config(format!("Migration failed: {e}")))?;

    Ok(conn)
}

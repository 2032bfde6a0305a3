use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::errors::ErrorCode;
use crate::http::ApiResponse;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    db: &'static str,
    migrations: usize,
    time: String,
}

/// Liveness plus a database ping. A failed ping answers 503 with the
/// `DatabaseError` envelope.
async fn health(app_state: web::Data<AppState>) -> HttpResponse {
    let time = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let db = app_state.db();
    let ping = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1 AS health_check".to_string(),
        ))
        .await;

    if let Err(e) = ping {
        warn!(error = %e, "Health check database ping failed");
        return ApiResponse::<HealthResponse>::failure(ErrorCode::DatabaseError)
            .into_response(StatusCode::SERVICE_UNAVAILABLE);
    }

    let migrations = migration::count_applied_migrations(db).await.unwrap_or(0);

    ApiResponse::success(HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        db: "ok",
        migrations,
        time,
    })
    .into_response(StatusCode::OK)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}

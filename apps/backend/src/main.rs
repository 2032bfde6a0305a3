use std::sync::Arc;

use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::RateLimiter;
use actix_web::{web, App, HttpServer};
use identity::auth::PasswordHasher;
use identity::config::app::Config;
use identity::extractors::JsonBodyLimit;
use identity::infra::state::build_state;
use identity::mail::SmtpMailer;
use identity::middleware::cors::cors_middleware;
use identity::middleware::rate_limit::account_rate_limit_config;
use identity::middleware::request_trace::RequestTrace;
use identity::middleware::structured_logger::StructuredLogger;
use identity::middleware::trace_span::TraceSpan;
use identity::routes;
use identity::store::RedisStore;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or `set -a; . ./.env; set +a` locally).
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let store = match RedisStore::connect(&config.redis_url).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Failed to connect to redis");
            std::process::exit(1);
        }
    };

    let mailer = match SmtpMailer::new(&config.smtp) {
        Ok(mailer) => mailer,
        Err(e) => {
            error!(error = %e, "Failed to configure SMTP transport");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_db_url(config.database_url.clone())
        .with_security(config.security.clone())
        .with_store(Arc::new(store))
        .with_mailer(Arc::new(mailer))
        .with_hasher(PasswordHasher::default())
        .with_identity_settings(config.identity.clone())
        .with_cookie_secure(config.cookie_secure)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build application state");
            std::process::exit(1);
        }
    };

    info!(host = %config.host, port = config.port, "Starting identity backend");

    let data = web::Data::new(app_state);
    let json_limit = web::Data::new(JsonBodyLimit(config.max_json_payload_size));
    // One backend shared by every worker, so the limit is per process.
    let rate_limit_backend = InMemoryBackend::builder().build();
    let origins = config.cors_allowed_origins.clone();

    HttpServer::new(move || {
        let account_limiter = RateLimiter::builder(
            rate_limit_backend.clone(),
            account_rate_limit_config().build(),
        )
        .add_headers()
        .build();

        App::new()
            .wrap(TraceSpan)
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .wrap(cors_middleware(&origins))
            .app_data(data.clone())
            .app_data(json_limit.clone())
            .service(
                web::scope("/api/accounts")
                    .wrap(account_limiter)
                    .configure(routes::accounts::configure_routes),
            )
            .configure(routes::configure_protected)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

use actix_cors::Cors;
use actix_web::http::header;

use crate::trace_ctx::REQUEST_ID_HEADER;

/// Build CORS middleware from an explicit origin list (see
/// `config::app::parse_origins`). Falls back to localhost when empty.
pub fn cors_middleware(allowed_origins: &[String]) -> Cors {
    let fallback = [
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ];
    let effective_origins: &[String] = if allowed_origins.is_empty() {
        &fallback
    } else {
        allowed_origins
    };

    let mut cors = Cors::default()
        // Methods actually used by the API
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        // Headers the browser may send
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        // Headers the browser is allowed to read from responses
        .expose_headers(vec![header::HeaderName::from_static(REQUEST_ID_HEADER)])
        // refreshToken cookie
        .supports_credentials()
        .max_age(3600);

    for origin in effective_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

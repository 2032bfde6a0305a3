use actix_web::web;

use crate::middleware::jwt_extract::JwtExtract;

pub mod accounts;
pub mod health;
pub mod users;

/// Register every route. `/api/users` requires a bearer access token; the
/// account endpoints are public except logout.
///
/// `main.rs` registers `/api/accounts` itself, behind the rate limiter, and
/// then calls [`configure_protected`]; tests use [`configure`] directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/accounts").configure(accounts::configure_routes));
    configure_protected(cfg);
}

/// Everything except `/api/accounts`.
pub fn configure_protected(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .wrap(JwtExtract)
            .configure(users::configure_routes),
    );
    health::configure_routes(cfg);
}

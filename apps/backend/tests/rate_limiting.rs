// Rate limiting on the account endpoints.

mod common;

use std::net::SocketAddr;

use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::RateLimiter;
use actix_web::{test, web, App, HttpResponse};
use identity::middleware::rate_limit::{account_rate_limit_config, ACCOUNT_LIMIT};
use identity::middleware::request_trace::RequestTrace;
use identity::middleware::structured_logger::StructuredLogger;

async fn ok_handler() -> HttpResponse {
    HttpResponse::Ok().finish()
}

fn peer(ip: &str) -> SocketAddr {
    format!("{ip}:40000").parse().unwrap()
}

#[actix_web::test]
async fn account_limit_is_per_ip() {
    let backend = InMemoryBackend::builder().build();
    let limiter = RateLimiter::builder(backend, account_rate_limit_config().build())
        .add_headers()
        .build();

    let app = test::init_service(
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .service(
                web::scope("/api/accounts")
                    .wrap(limiter)
                    .route("/login", web::post().to(ok_handler)),
            )
            .route("/health", web::get().to(ok_handler)),
    )
    .await;

    for i in 0..ACCOUNT_LIMIT {
        let req = test::TestRequest::post()
            .uri("/api/accounts/login")
            .peer_addr(peer("10.0.0.1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200, "request {} within limit", i + 1);
        assert!(resp.headers().contains_key("x-ratelimit-remaining"));
    }

    let req = test::TestRequest::post()
        .uri("/api/accounts/login")
        .peer_addr(peer("10.0.0.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 429);

    // Another client is unaffected
    let req = test::TestRequest::post()
        .uri("/api/accounts/login")
        .peer_addr(peer("10.0.0.2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    // Outside the limited scope
    let req = test::TestRequest::get()
        .uri("/health")
        .peer_addr(peer("10.0.0.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
}

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use identity::middleware::request_trace::RequestTrace;
use identity::middleware::structured_logger::StructuredLogger;
use identity::middleware::trace_span::TraceSpan;
use identity::routes;
use identity::state::app_state::AppState;

/// Production routes and middleware, minus CORS and the rate limiter.
pub async fn create_test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    test::init_service(
        App::new()
            .wrap(TraceSpan)
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await
}

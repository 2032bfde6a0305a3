use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::Error as ActixError;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn, Level};

use crate::logging::security;
use crate::middleware::trace_span::RequestMeta;

/// One `request_completed` event per request. 5xx logs at error, 4xx at
/// warn, the rest at info. A 429 from the account limiter is also reported
/// as a security event.
pub struct StructuredLogger;

fn completion_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

fn log_completion(meta: &RequestMeta, status: StatusCode, duration_us: u64) {
    let status_code = status.as_u16();
    macro_rules! completed {
        ($level:ident) => {
            $level!(
                http.method = %meta.method,
                url.path = %meta.path,
                http.status_code = status_code,
                client_ip = %meta.client_ip,
                duration_us,
                trace_id = %meta.trace_id,
                message = "request_completed"
            )
        };
    }

    let level = completion_level(status);
    if level == Level::ERROR {
        completed!(error);
    } else if level == Level::WARN {
        completed!(warn);
    } else {
        completed!(info);
    }
}

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let meta = RequestMeta::of(&req);
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };

            if status == StatusCode::TOO_MANY_REQUESTS {
                security::rate_limit_hit(&meta.path);
            }
            log_completion(&meta, status, start.elapsed().as_micros() as u64);

            result
        })
    }
}

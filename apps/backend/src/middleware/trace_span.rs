//! Per-request `request` span.
//!
//! Every event logged while an account or profile request is handled carries
//! the correlation id, method, path and client address, so a failed login can
//! be tied back to the caller that the rate limiter also keys on. The span's
//! `http.status_code` is filled in once the response is known.
//!
//! Must sit inside `RequestTrace`, which puts the [`RequestId`] in place.

use std::future::{ready, Ready};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use actix_web::HttpMessage;
use futures_util::future::LocalBoxFuture;
use tracing::{field, info_span, Instrument};

use crate::trace_ctx::RequestId;

/// What the request middleware log about a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestMeta {
    pub trace_id: String,
    pub method: String,
    pub path: String,
    pub client_ip: String,
}

impl RequestMeta {
    pub(crate) fn of(req: &ServiceRequest) -> Self {
        let trace_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let client_ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        Self {
            trace_id,
            method: req.method().to_string(),
            path: req.path().to_string(),
            client_ip,
        }
    }
}

#[derive(Clone, Default)]
pub struct TraceSpan;

impl<S, B> Transform<S, ServiceRequest> for TraceSpan
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceSpanMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceSpanMiddleware { service }))
    }
}

pub struct TraceSpanMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceSpanMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let meta = RequestMeta::of(&req);
        let span = info_span!(
            "request",
            trace_id = %meta.trace_id,
            method = %meta.method,
            path = %meta.path,
            client_ip = %meta.client_ip,
            http.status_code = field::Empty,
        );

        let fut = self.service.call(req).instrument(span.clone());
        Box::pin(async move {
            let result = fut.await;
            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            span.record("http.status_code", status.as_u16());
            result
        })
    }
}

//! JWT extraction middleware
//!
//! Verifies the bearer access token on protected scopes (`/api/users`) and
//! stores the resulting [`TokenPayload`] in request extensions. Anything
//! missing, malformed or failing verification is a 401 envelope.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::auth::{TokenPayload, TokenPurpose};
use crate::error::AppError;
use crate::logging::security;
use crate::state::app_state::AppState;

pub struct JwtExtract;

impl<S, B> Transform<S, ServiceRequest> for JwtExtract
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtExtractMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtExtractMiddleware { service }))
    }
}

pub struct JwtExtractMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for JwtExtractMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(token) = bearer_token(req.headers().get(header::AUTHORIZATION)) else {
            return reject(req, AppError::Unauthorized);
        };

        let Some(app_state) = req.app_data::<web::Data<AppState>>().cloned() else {
            return reject(req, AppError::internal("AppState not available"));
        };

        match app_state.tokens.verify(&token, TokenPurpose::Access) {
            Ok(payload) => {
                // Store the identity BEFORE calling the service
                req.extensions_mut().insert::<TokenPayload>(payload);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(e) => {
                security::token_rejected(TokenPurpose::Access.as_str(), e.reason());
                reject(req, AppError::Unauthorized)
            }
        }
    }
}

/// Answer with the error envelope without calling the wrapped service.
fn reject<B: 'static>(
    req: ServiceRequest,
    error: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let response = req.into_response(error.error_response());
    Box::pin(async move { Ok(response.map_into_right_body()) })
}

/// `Authorization: Bearer <token>`; anything else yields `None`.
pub fn bearer_token(header_value: Option<&header::HeaderValue>) -> Option<String> {
    let auth_str = header_value?.to_str().ok()?;

    let mut parts = auth_str.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };

    if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

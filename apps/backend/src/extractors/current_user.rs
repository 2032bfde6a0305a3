use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use uuid::Uuid;

use crate::auth::TokenPayload;
use crate::error::AppError;

/// Identity of the caller, read from the [`TokenPayload`] that `JwtExtract`
/// stored in request extensions. Only meaningful on scopes wrapped by
/// `JwtExtract`; elsewhere it always fails with `Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<TokenPayload>()
            .map(|payload| CurrentUser {
                id: payload.id,
                email: payload.email.clone(),
            })
            .ok_or(AppError::Unauthorized);
        ready(user)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[actix_web::test]
    async fn reads_payload_from_extensions() {
        let id = Uuid::new_v4();
        let req = TestRequest::default().to_http_request();
        req.extensions_mut()
            .insert(TokenPayload::new(id, "someone@example.com"));

        let user = CurrentUser::extract(&req).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email, "someone@example.com");
    }

    #[actix_web::test]
    async fn missing_payload_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(
            CurrentUser::extract(&req).await.unwrap_err(),
            AppError::Unauthorized
        );
    }
}

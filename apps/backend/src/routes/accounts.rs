//! `/api/accounts`: registration, email confirmation, login, password reset,
//! session refresh and logout.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::extractors::validated_json::{require_non_blank, Validate, ValidatedJson};
use crate::http::ApiResponse;
use crate::middleware::jwt_extract::JwtExtract;
use crate::services::identity::{PasswordReset, Registration, SessionTokens};
use crate::state::app_state::AppState;

pub const REFRESH_COOKIE: &str = "refreshToken";
const REFRESH_COOKIE_PATH: &str = "/api/accounts";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), AppError> {
        require_non_blank(&[
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ])
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

impl Validate for VerifyEmailRequest {
    fn validate(&self) -> Result<(), AppError> {
        require_non_blank(&[("token", self.token.as_str())])
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), AppError> {
        require_non_blank(&[
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ])
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl Validate for ForgotPasswordRequest {
    fn validate(&self) -> Result<(), AppError> {
        require_non_blank(&[("email", self.email.as_str())])
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub password: String,
    pub code: String,
}

impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<(), AppError> {
        require_non_blank(&[
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("code", self.code.as_str()),
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body of a login or refresh. The refresh token travels only in the cookie.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

fn ok_empty() -> HttpResponse {
    ApiResponse::<()>::empty().into_response(StatusCode::OK)
}

fn refresh_cookie(state: &AppState, session: &SessionTokens) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, session.refresh_token.clone())
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .secure(state.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(session.refresh_expires_in as i64))
        .finish()
}

fn removal_cookie(state: &AppState) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, "")
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .secure(state.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::ZERO)
        .finish()
}

fn session_response(state: &AppState, session: SessionTokens) -> HttpResponse {
    let cookie = refresh_cookie(state, &session);
    let body = ApiResponse::success(AuthResponse {
        access_token: session.access_token,
        expires_in: session.access_expires_in,
    });
    HttpResponse::Ok().cookie(cookie).json(body)
}

async fn register(
    body: ValidatedJson<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let RegisterRequest {
        email,
        password,
        first_name,
        last_name,
    } = body.into_inner();

    state
        .identity
        .register(Registration {
            email,
            password,
            first_name,
            last_name,
        })
        .await?;
    Ok(ok_empty())
}

async fn verify_email(
    body: ValidatedJson<VerifyEmailRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.identity.verify_email(&body.token).await?;
    Ok(ok_empty())
}

async fn login(
    body: ValidatedJson<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = state.identity.login(&body.email, &body.password).await?;
    Ok(session_response(&state, session))
}

async fn forgot_password(
    body: ValidatedJson<ForgotPasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.identity.forgot_password(&body.email).await?;
    Ok(ok_empty())
}

async fn reset_password(
    body: ValidatedJson<ResetPasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ResetPasswordRequest {
        email,
        password,
        code,
    } = body.into_inner();

    state
        .identity
        .reset_password(PasswordReset {
            email,
            password,
            code,
        })
        .await?;
    Ok(ok_empty())
}

/// Cookie first, then the JSON body. An empty or absent body is allowed.
async fn refresh(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let from_cookie = req
        .cookie(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    let token = from_cookie
        .or_else(|| body.and_then(|b| b.into_inner().refresh_token))
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::invalid("refreshToken is required"))?;

    let session = state.identity.refresh(&token).await?;
    Ok(session_response(&state, session))
}

async fn logout(user: CurrentUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.identity.logout(user.id).await?;
    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(&state))
        .json(ApiResponse::<()>::empty()))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/verify-email", web::post().to(verify_email))
        .route("/login", web::post().to(login))
        .route("/forgot-password", web::post().to(forgot_password))
        .route("/reset-password", web::post().to(reset_password))
        .route("/refresh", web::post().to(refresh))
        .service(
            web::resource("/logout")
                .wrap(JwtExtract)
                .route(web::post().to(logout)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_reads_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.c","password":"pw","firstName":"Ada","lastName":"Lovelace"}"#,
        )
        .unwrap();
        assert_eq!(req.first_name, "Ada");
        assert_eq!(req.last_name, "Lovelace");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn reset_request_requires_code() {
        let req = ResetPasswordRequest {
            email: "a@b.c".to_string(),
            password: "pw".to_string(),
            code: " ".to_string(),
        };
        assert_eq!(req.validate().unwrap_err(), AppError::invalid("code is required"));
    }

    #[test]
    fn auth_response_is_camel_case() {
        let body = serde_json::to_value(AuthResponse {
            access_token: "t".to_string(),
            expires_in: 900,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"accessToken": "t", "expiresIn": 900}));
    }
}

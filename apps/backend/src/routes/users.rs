use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::http::ApiResponse;
use crate::state::app_state::AppState;

/// Profile of the authenticated caller.
async fn me(user: CurrentUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let profile = state.users.get_profile(user.id).await?;
    Ok(ApiResponse::success(profile).into_response(StatusCode::OK))
}

/// Mounted under `/api/users`, which `routes::configure` wraps in `JwtExtract`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/me", web::get().to(me));
}

use crate::AppState;
use crate::api::error::AppError;
use crate::services::auth::{Session, SessionInfo};
use crate::utils::auth::Claims;
use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = Session),
        (status = 401, description = "Invalid login credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let session = state
        .auth
        .sign_in_with_password(&payload.email, &payload.password)
        .await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, AppError> {
    state.auth.sign_out(&claims).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/session",
    responses(
        (status = 200, description = "Current session", body = SessionInfo),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "auth"
)]
pub async fn session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<SessionInfo> {
    Json(state.auth.get_session(&claims))
}

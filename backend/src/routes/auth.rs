//! Authentication routes
//!
//! Registration, login, current user and token refresh.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use edunova_shared::types::{
    AccessTokenResponse, AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest,
    UserResponse,
};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/me/", get(me))
        .route("/token/refresh/", post(refresh_token))
}

/// Register a new user
///
/// POST /api/auth/register/
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;
    let response = UserService::register(state.db(), state.jwt(), req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with username and password
///
/// POST /api/auth/login/
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(req) = payload?;
    let response = UserService::login(state.db(), state.jwt(), req).await?;
    Ok(Json(response))
}

/// Get the authenticated user with profile
///
/// GET /api/auth/me/
///
/// Requires a valid Bearer access token in the Authorization header.
async fn me(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<Json<UserResponse>> {
    let user = UserService::current_user(state.db(), auth_user.user_id).await?;
    Ok(Json(user))
}

/// Exchange a refresh token for a new access token
///
/// POST /api/auth/token/refresh/
async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> ApiResult<Json<AccessTokenResponse>> {
    let Json(req) = payload?;
    let response = UserService::refresh_token(state.db(), state.jwt(), req).await?;
    Ok(Json(response))
}

//! Account endpoints: register, login, logout, forget and reset password.

use axum::{Json, extract::State};

use bolao_core::{
    ApiResponse, AuthResponse, ForgetPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest,
};

use crate::error::{AppError, AppJson, clear_sentry_user, set_sentry_user};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let (user, response) = state.auth_service().register(request).await?;
    set_sentry_user(user.id, Some(user.email.as_str()));
    Ok(Json(ApiResponse::ok("Registration successful", response)))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let (user, response) = state.auth_service().login(&request).await?;
    set_sentry_user(user.id, Some(user.email.as_str()));
    Ok(Json(ApiResponse::ok("Login successful", response)))
}

/// `POST /logout`
///
/// Stateless: the token stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Json<ApiResponse<()>> {
    state.auth_service().logout(&user);
    clear_sentry_user();
    Json(ApiResponse::ok("Logout successful", ()))
}

/// `POST /forget-password`
///
/// Answers the same way whether or not the email is registered.
pub async fn forget_password(
    State(state): State<AppState>,
    AppJson(request): AppJson<ForgetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.auth_service().forget_password(&request).await?;
    Ok(Json(ApiResponse::ok(
        "If the email is registered, a password reset token has been issued",
        (),
    )))
}

/// `POST /reset-password`
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(request): AppJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.auth_service().reset_password(&request).await?;
    Ok(Json(ApiResponse::ok("Password reset successful", ())))
}

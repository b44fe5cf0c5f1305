// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentPrincipal,
    models::auth::{AuthResponse, LoginPayload, RegisterPayload},
    models::user::User,
};

// Handler de registro
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let access_token = app_state
        .auth_service
        .register(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { access_token }))
}

// Handler de login
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let access_token = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { access_token }))
}

// Handler da rota protegida /me
pub async fn get_me(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<User>, AppError> {
    let user = app_state.user_service.get(principal.user_id, false).await?;
    Ok(Json(user))
}

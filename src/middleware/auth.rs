// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Claims, Principal},
};

// O gate de autenticação. Rotas públicas simplesmente não recebem esta
// camada; para as demais, token ausente/inválido/expirado é 401.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let auth_header = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let claims = app_state.auth_service.decode_token(token)?;

            // Dois slots separados nas extensions: as claims cruas do
            // verificador e o principal autenticado. O código de
            // autorização lê apenas o Principal.
            let principal = Principal::from_claims(&claims);
            request.extensions_mut().insert::<Claims>(claims);
            request.extensions_mut().insert::<Principal>(principal);
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::InvalidToken)
}

// Extrator para obter o principal autenticado diretamente nos handlers
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or(AppError::InvalidToken)
    }
}

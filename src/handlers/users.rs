// src/handlers/users.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{GetParams, ListParams, Page},
    },
    config::AppState,
    middleware::{
        auth::CurrentPrincipal,
        rbac::{ensure_admin, ensure_owner_or_admin, PermUsersRead, RequirePermission},
    },
    models::user::{UpdateUserPayload, User},
};

pub async fn list_users(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermUsersRead>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<User>>, AppError> {
    let page = app_state.user_service.list(&params).await?;
    Ok(Json(page))
}

// Autoatendimento: o dono enxerga o próprio registro; terceiros precisam
// ser administradores.
pub async fn get_user(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
    Query(params): Query<GetParams>,
) -> Result<Json<User>, AppError> {
    ensure_owner_or_admin(&principal, id)?;
    let user = app_state.user_service.get(id, params.include_deleted).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    ensure_owner_or_admin(&principal, id)?;

    // `active: true` equivale a restaurar, e restauração é só de admin:
    // o token do dono é anterior à exclusão e não prova a situação atual.
    if payload.active == Some(true) {
        ensure_admin(&principal)?;
    }

    let user = app_state.user_service.update(id, payload).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    ensure_owner_or_admin(&principal, id)?;
    let user = app_state.user_service.remove(id).await?;
    Ok(Json(user))
}

// Restauração é admin-only de propósito; ser dono não basta.
pub async fn restore_user(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    ensure_admin(&principal)?;
    let user = app_state.user_service.restore(id).await?;
    Ok(Json(user))
}

// src/handlers/permissions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{GetParams, ListParams},
    },
    config::AppState,
    middleware::rbac::{PermPermissionsRead, PermPermissionsWrite, RequirePermission},
    models::permission::{CreatePermissionPayload, UpdatePermissionPayload},
};

pub async fn create_permission(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPermissionsWrite>,
    Json(payload): Json<CreatePermissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let permission = app_state.permission_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

pub async fn get_permission(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPermissionsRead>,
    Path(id): Path<Uuid>,
    Query(params): Query<GetParams>,
) -> Result<impl IntoResponse, AppError> {
    let permission = app_state
        .permission_service
        .get(id, params.include_deleted)
        .await?;
    Ok(Json(permission))
}

// GET /api/permissions (o catálogo que o frontend usa na tela de perfis)
pub async fn list_permissions(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPermissionsRead>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.permission_service.list(&params).await?;
    Ok(Json(page))
}

pub async fn update_permission(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPermissionsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePermissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let permission = app_state.permission_service.update(id, payload).await?;
    Ok(Json(permission))
}

pub async fn delete_permission(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPermissionsWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let permission = app_state.permission_service.remove(id).await?;
    Ok(Json(permission))
}

pub async fn restore_permission(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermPermissionsWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let permission = app_state.permission_service.restore(id).await?;
    Ok(Json(permission))
}

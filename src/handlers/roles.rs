// src/handlers/roles.rs

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
    middleware::{
        rbac::{PermRolesRead, PermRolesWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::role::{CreateRolePayload, UpdateRolePayload},
};

// POST /api/roles
pub async fn create_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesWrite>,
    tenant: Option<TenantContext>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let response = app_state
        .role_service
        .create(payload, tenant.map(|t| t.0))
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesRead>,
    Path(id): Path<Uuid>,
    Query(params): Query<GetParams>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state.role_service.get(id, params.include_deleted).await?;
    Ok(Json(response))
}

// Com contexto de empresa, a listagem traz os perfis globais mais os da
// empresa ativa; sem contexto, todos.
pub async fn list_roles(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesRead>,
    tenant: Option<TenantContext>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .role_service
        .list(&params, tenant.map(|t| t.0))
        .await?;
    Ok(Json(page))
}

pub async fn update_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let response = app_state.role_service.update(id, payload).await?;
    Ok(Json(response))
}

pub async fn delete_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state.role_service.remove(id).await?;
    Ok(Json(role))
}

pub async fn restore_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state.role_service.restore(id).await?;
    Ok(Json(role))
}

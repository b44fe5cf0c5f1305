// src/handlers/companies.rs

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
        auth::CurrentPrincipal,
        rbac::{PermCompaniesRead, PermCompaniesWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::{
        company::{CreateCompanyPayload, UpdateCompanyPayload},
        membership::UpsertMembershipPayload,
    },
};

// Qualquer usuário autenticado pode abrir a própria empresa; ele entra
// como dono e primeiro membro.
pub async fn create_company(
    State(app_state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let company = app_state
        .company_service
        .create(payload, principal.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

// A empresa do contexto ativo (cabeçalho x-company-id > claim do token).
pub async fn current_company(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.get(tenant.0, false).await?;
    Ok(Json(company))
}

pub async fn get_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCompaniesRead>,
    Path(id): Path<Uuid>,
    Query(params): Query<GetParams>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state
        .company_service
        .get(id, params.include_deleted)
        .await?;
    Ok(Json(company))
}

pub async fn list_companies(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCompaniesRead>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.company_service.list(&params).await?;
    Ok(Json(page))
}

pub async fn update_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCompaniesWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let company = app_state.company_service.update(id, payload).await?;
    Ok(Json(company))
}

pub async fn delete_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCompaniesWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.remove(id).await?;
    Ok(Json(company))
}

pub async fn restore_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCompaniesWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.restore(id).await?;
    Ok(Json(company))
}

// PUT /api/companies/{id}/members/{user_id}
// Upsert: cria o vínculo ou substitui o conjunto de perfis do existente.
pub async fn upsert_member(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCompaniesWrite>,
    Path((company_id, user_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpsertMembershipPayload>,
) -> Result<impl IntoResponse, AppError> {
    let membership = app_state
        .company_service
        .upsert_member(company_id, user_id, payload.role_ids)
        .await?;
    Ok(Json(membership))
}

pub async fn list_members(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermCompaniesRead>,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let members = app_state.company_service.list_members(company_id).await?;
    Ok(Json(members))
}

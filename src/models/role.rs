// src/models/role.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// O que sai do banco (tabela roles). `company_id` nulo = perfil global.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub company_id: Option<Uuid>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O payload para criar um perfil. As permissões vêm por id e são
// validadas antes de qualquer escrita.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "O código é obrigatório."))]
    pub code: String,
    pub description: Option<String>,
    // Escopo explícito; na ausência vale o contexto de empresa da requisição.
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
    // Substitui o conjunto inteiro de permissões do perfil.
    pub permission_ids: Option<Vec<Uuid>>,
    pub active: Option<bool>,
}

impl UpdateRolePayload {
    pub fn has_field_changes(&self) -> bool {
        self.name.is_some() || self.description.is_some() || self.permission_ids.is_some()
    }
}

// Resposta completa (perfil + códigos das permissões)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<String>,
}

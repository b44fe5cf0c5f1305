// src/models/membership.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Vínculo usuário ↔ empresa. Único por par (user, company); o conjunto de
// perfis é substituído no upsert, nunca acrescentado.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMembershipPayload {
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

// Resposta do upsert: vínculo + perfis atribuídos.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    #[serde(flatten)]
    pub membership: Membership,
    pub role_ids: Vec<Uuid>,
}

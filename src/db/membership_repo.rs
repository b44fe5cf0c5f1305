// src/db/membership_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::membership::Membership};

const MEMBERSHIP_COLUMNS: &str = "id, user_id, company_id, created_at, updated_at";

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Upsert do vínculo (usuário, empresa). A constraint UNIQUE no par é o
    // backstop contra a corrida check-then-create: dois inserts simultâneos
    // convergem para a mesma linha.
    pub async fn upsert(
        &self,
        conn: &mut sqlx::PgConnection,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Membership, AppError> {
        let sql = format!(
            "INSERT INTO memberships (user_id, company_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, company_id) \
             DO UPDATE SET updated_at = now() \
             RETURNING {MEMBERSHIP_COLUMNS}"
        );
        let membership = sqlx::query_as::<_, Membership>(&sql)
            .bind(user_id)
            .bind(company_id)
            .fetch_one(conn)
            .await?;
        Ok(membership)
    }

    // Substitui o conjunto de perfis do vínculo (nunca acrescenta).
    pub async fn replace_roles(
        &self,
        conn: &mut sqlx::PgConnection,
        membership_id: Uuid,
        role_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM membership_roles WHERE membership_id = $1")
            .bind(membership_id)
            .execute(&mut *conn)
            .await?;

        if !role_ids.is_empty() {
            sqlx::query(
                "INSERT INTO membership_roles (membership_id, role_id) \
                 SELECT $1, unnest($2::uuid[]) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(membership_id)
            .bind(role_ids)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    pub async fn role_ids_of(&self, membership_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT role_id FROM membership_roles WHERE membership_id = $1",
        )
        .bind(membership_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn find_by_company(&self, company_id: Uuid) -> Result<Vec<Membership>, AppError> {
        let sql = format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships \
             WHERE company_id = $1 ORDER BY created_at"
        );
        let memberships = sqlx::query_as::<_, Membership>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(memberships)
    }
}

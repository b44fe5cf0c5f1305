// src/db/permission_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::ListParams},
    models::permission::Permission,
};

const PERMISSION_COLUMNS: &str =
    "id, name, code, description, is_active, deleted_at, created_at, updated_at";

#[derive(Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<Option<Permission>, AppError> {
        let sql = format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions \
             WHERE id = $1 AND ($2 OR deleted_at IS NULL)"
        );
        let maybe = sqlx::query_as::<_, Permission>(&sql)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn find_all(&self, params: &ListParams) -> Result<Vec<Permission>, AppError> {
        let sql = format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions \
             WHERE ($1 OR deleted_at IS NULL) \
               AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%') \
             ORDER BY code \
             LIMIT $3 OFFSET $4"
        );
        let permissions = sqlx::query_as::<_, Permission>(&sql)
            .bind(params.include_deleted)
            .bind(params.name_filter())
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(permissions)
    }

    pub async fn count_all(&self, params: &ListParams) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM permissions \
             WHERE ($1 OR deleted_at IS NULL) \
               AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')",
        )
        .bind(params.include_deleted)
        .bind(params.name_filter())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn name_in_use(
        &self,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM permissions \
                WHERE name = $1 AND deleted_at IS NULL \
                  AND ($2::uuid IS NULL OR id <> $2) \
             )",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn code_in_use(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM permissions WHERE code = $1 AND deleted_at IS NULL \
             )",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    // Usado pela validação antecipada de referências: devolve quais dos ids
    // pedidos existem vivos; o serviço compara com o que foi pedido.
    pub async fn find_alive_ids(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        let alive = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM permissions WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(alive)
    }

    pub async fn insert(
        &self,
        name: &str,
        code: &str,
        description: Option<&str>,
    ) -> Result<Permission, AppError> {
        let sql = format!(
            "INSERT INTO permissions (name, code, description) VALUES ($1, $2, $3) \
             RETURNING {PERMISSION_COLUMNS}"
        );
        let permission = sqlx::query_as::<_, Permission>(&sql)
            .bind(name)
            .bind(code)
            .bind(description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return match db_err.constraint() {
                            Some("idx_permissions_code_alive") => {
                                AppError::CodeAlreadyExists(code.to_string())
                            }
                            _ => AppError::NameAlreadyExists(name.to_string()),
                        };
                    }
                }
                e.into()
            })?;
        Ok(permission)
    }

    pub async fn update_fields(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Permission>, AppError> {
        let sql = format!(
            "UPDATE permissions SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {PERMISSION_COLUMNS}"
        );
        let maybe = sqlx::query_as::<_, Permission>(&sql)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn mark_deleted(&self, id: Uuid) -> Result<Option<Permission>, AppError> {
        let sql = format!(
            "UPDATE permissions SET deleted_at = now(), is_active = FALSE, updated_at = now() \
             WHERE id = $1 RETURNING {PERMISSION_COLUMNS}"
        );
        let maybe = sqlx::query_as::<_, Permission>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn clear_deleted(&self, id: Uuid) -> Result<Option<Permission>, AppError> {
        let sql = format!(
            "UPDATE permissions SET deleted_at = NULL, is_active = TRUE, updated_at = now() \
             WHERE id = $1 RETURNING {PERMISSION_COLUMNS}"
        );
        let maybe = sqlx::query_as::<_, Permission>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }
}

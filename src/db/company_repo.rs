// src/db/company_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::ListParams},
    models::company::Company,
};

const COMPANY_COLUMNS: &str =
    "id, name, description, owner_id, is_active, deleted_at, created_at, updated_at";

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<Option<Company>, AppError> {
        let sql = format!(
            "SELECT {COMPANY_COLUMNS} FROM companies \
             WHERE id = $1 AND ($2 OR deleted_at IS NULL)"
        );
        let maybe = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn find_all(&self, params: &ListParams) -> Result<Vec<Company>, AppError> {
        let sql = format!(
            "SELECT {COMPANY_COLUMNS} FROM companies \
             WHERE ($1 OR deleted_at IS NULL) \
               AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%') \
             ORDER BY name \
             LIMIT $3 OFFSET $4"
        );
        let companies = sqlx::query_as::<_, Company>(&sql)
            .bind(params.include_deleted)
            .bind(params.name_filter())
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    pub async fn count_all(&self, params: &ListParams) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM companies \
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
                SELECT 1 FROM companies \
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

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO companies (name, description, owner_id) VALUES ($1, $2, $3) \
             RETURNING {COMPANY_COLUMNS}"
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(name)
            .bind(description)
            .bind(owner_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::NameAlreadyExists(name.to_string());
                    }
                }
                e.into()
            })?;
        Ok(company)
    }

    pub async fn update_fields(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Company>, AppError> {
        let sql = format!(
            "UPDATE companies SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COMPANY_COLUMNS}"
        );
        let maybe = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn mark_deleted(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let sql = format!(
            "UPDATE companies SET deleted_at = now(), is_active = FALSE, updated_at = now() \
             WHERE id = $1 RETURNING {COMPANY_COLUMNS}"
        );
        let maybe = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn clear_deleted(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let sql = format!(
            "UPDATE companies SET deleted_at = NULL, is_active = TRUE, updated_at = now() \
             WHERE id = $1 RETURNING {COMPANY_COLUMNS}"
        );
        let maybe = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }
}

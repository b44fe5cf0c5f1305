// src/db/role_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::ListParams},
    models::role::Role,
};

const ROLE_COLUMNS: &str =
    "id, name, code, description, company_id, is_active, deleted_at, created_at, updated_at";

#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<Option<Role>, AppError> {
        let sql = format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1 AND ($2 OR deleted_at IS NULL)"
        );
        let maybe = sqlx::query_as::<_, Role>(&sql)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    // Com escopo de empresa presente, a listagem devolve os perfis globais
    // mais os da empresa ativa; sem escopo, todos.
    pub async fn find_all(
        &self,
        params: &ListParams,
        scope: Option<Uuid>,
    ) -> Result<Vec<Role>, AppError> {
        let sql = format!(
            "SELECT {ROLE_COLUMNS} FROM roles \
             WHERE ($1 OR deleted_at IS NULL) \
               AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%') \
               AND ($3::uuid IS NULL OR company_id IS NULL OR company_id = $3) \
             ORDER BY name \
             LIMIT $4 OFFSET $5"
        );
        let roles = sqlx::query_as::<_, Role>(&sql)
            .bind(params.include_deleted)
            .bind(params.name_filter())
            .bind(scope)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    pub async fn count_all(
        &self,
        params: &ListParams,
        scope: Option<Uuid>,
    ) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM roles \
             WHERE ($1 OR deleted_at IS NULL) \
               AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%') \
               AND ($3::uuid IS NULL OR company_id IS NULL OR company_id = $3)",
        )
        .bind(params.include_deleted)
        .bind(params.name_filter())
        .bind(scope)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    // Unicidade do nome dentro do escopo (global ou por empresa), apenas
    // entre linhas vivas.
    pub async fn name_in_scope_in_use(
        &self,
        name: &str,
        company_id: Option<Uuid>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM roles \
                WHERE name = $1 \
                  AND company_id IS NOT DISTINCT FROM $2 \
                  AND deleted_at IS NULL \
                  AND ($3::uuid IS NULL OR id <> $3) \
             )",
        )
        .bind(name)
        .bind(company_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    // Valida referências de perfil para o upsert de vínculo: o perfil
    // precisa estar vivo e ser global ou pertencer à empresa do vínculo.
    pub async fn find_alive_ids_in_scope(
        &self,
        ids: &[Uuid],
        company_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError> {
        let alive = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM roles \
             WHERE id = ANY($1) AND deleted_at IS NULL \
               AND (company_id IS NULL OR company_id = $2)",
        )
        .bind(ids)
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(alive)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        name: &str,
        code: &str,
        description: Option<&str>,
        company_id: Option<Uuid>,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO roles (name, code, description, company_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ROLE_COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&sql)
            .bind(name)
            .bind(code)
            .bind(description)
            .bind(company_id)
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
        Ok(role)
    }

    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE roles SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {ROLE_COLUMNS}"
        );
        let maybe = sqlx::query_as::<_, Role>(&sql)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(executor)
            .await?;
        Ok(maybe)
    }

    // Substitui o conjunto inteiro de permissões do perfil. Recebe a
    // conexão da transação em andamento: as duas escritas são atômicas.
    pub async fn replace_permissions(
        &self,
        conn: &mut sqlx::PgConnection,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *conn)
            .await?;

        if !permission_ids.is_empty() {
            // Inserção em massa usando UNNEST para performance
            sqlx::query(
                "INSERT INTO role_permissions (role_id, permission_id) \
                 SELECT $1, unnest($2::uuid[]) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(role_id)
            .bind(permission_ids)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    pub async fn permission_codes(&self, role_id: Uuid) -> Result<Vec<String>, AppError> {
        let codes = sqlx::query_scalar::<_, String>(
            "SELECT p.code FROM role_permissions rp \
             JOIN permissions p ON p.id = rp.permission_id AND p.deleted_at IS NULL \
             WHERE rp.role_id = $1 \
             ORDER BY p.code",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    pub async fn mark_deleted(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let sql = format!(
            "UPDATE roles SET deleted_at = now(), is_active = FALSE, updated_at = now() \
             WHERE id = $1 RETURNING {ROLE_COLUMNS}"
        );
        let maybe = sqlx::query_as::<_, Role>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn clear_deleted(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let sql = format!(
            "UPDATE roles SET deleted_at = NULL, is_active = TRUE, updated_at = now() \
             WHERE id = $1 RETURNING {ROLE_COLUMNS}"
        );
        let maybe = sqlx::query_as::<_, Role>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }
}

// Testes contra um banco real: o atributo cria um banco isolado por caso
// e aplica as migrações de ./migrations antes de rodar.
#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn linha_removida_some_da_visao_padrao(pool: PgPool) {
        let repo = RoleRepository::new(pool.clone());
        let role = repo
            .insert(&pool, "Vendedor", "VENDEDOR", None, None)
            .await
            .unwrap();

        let removed = repo.mark_deleted(role.id).await.unwrap().unwrap();
        assert!(removed.deleted_at.is_some());
        assert!(!removed.is_active);

        // A visão padrão não enxerga; include_deleted=true enxerga com as marcas.
        assert!(repo.find_by_id(role.id, false).await.unwrap().is_none());
        let full = repo.find_by_id(role.id, true).await.unwrap().unwrap();
        assert!(full.deleted_at.is_some());
        assert!(!full.is_active);
    }

    #[sqlx::test]
    async fn remover_e_restaurar_volta_a_visao_padrao(pool: PgPool) {
        let repo = RoleRepository::new(pool.clone());
        let role = repo
            .insert(&pool, "Vendedor", "VENDEDOR", None, None)
            .await
            .unwrap();

        repo.mark_deleted(role.id).await.unwrap().unwrap();
        let restored = repo.clear_deleted(role.id).await.unwrap().unwrap();
        assert!(restored.deleted_at.is_none());
        assert!(restored.is_active);
        assert!(repo.find_by_id(role.id, false).await.unwrap().is_some());
    }

    #[sqlx::test]
    async fn nome_de_linha_excluida_pode_ser_reutilizado(pool: PgPool) {
        let repo = RoleRepository::new(pool.clone());
        let first = repo
            .insert(&pool, "Vendedor", "VENDEDOR", None, None)
            .await
            .unwrap();
        repo.mark_deleted(first.id).await.unwrap().unwrap();

        // O índice parcial só cobre linhas vivas: o nome fica livre de novo.
        let second = repo
            .insert(&pool, "Vendedor", "VENDEDOR", None, None)
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
        assert!(!repo
            .name_in_scope_in_use("Vendedor", None, Some(second.id))
            .await
            .unwrap());
    }
}

// src/db/user_repo.rs

use std::collections::BTreeMap;

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::ListParams},
    models::{auth::RoleClaim, user::User},
};

const USER_COLUMNS: &str =
    "id, email, password_hash, is_active, deleted_at, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users'. As consultas padrão excluem linhas soft-deletadas; o
// parâmetro include_deleted abre a visão completa.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

#[derive(FromRow)]
struct RoleClaimRow {
    role_code: String,
    permission_code: Option<String>,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca para autenticação: só considera usuários vivos.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        );
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND ($2 OR deleted_at IS NULL)"
        );
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Listagem paginada; o filtro de nome se aplica ao e-mail.
    pub async fn find_all(&self, params: &ListParams) -> Result<Vec<User>, AppError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1 OR deleted_at IS NULL) \
               AND ($2::text IS NULL OR email ILIKE '%' || $2 || '%') \
             ORDER BY created_at \
             LIMIT $3 OFFSET $4"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(params.include_deleted)
            .bind(params.name_filter())
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn count_all(&self, params: &ListParams) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users \
             WHERE ($1 OR deleted_at IS NULL) \
               AND ($2::text IS NULL OR email ILIKE '%' || $2 || '%')",
        )
        .bind(params.include_deleted)
        .bind(params.name_filter())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    // Checagem de unicidade do serviço: só linhas vivas contam, um e-mail
    // de usuário excluído pode ser reutilizado.
    pub async fn email_in_use(
        &self,
        email: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM users \
                WHERE email = $1 AND deleted_at IS NULL \
                  AND ($2::uuid IS NULL OR id <> $2) \
             )",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn insert(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    // O índice parcial é o backstop contra corrida no cadastro.
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists;
                    }
                }
                e.into()
            })?;
        Ok(user)
    }

    // Atualização de campos permitida mesmo em linha excluída: dá para
    // corrigir metadados antes de uma restauração.
    pub async fn update_fields(
        &self,
        id: Uuid,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                password_hash = COALESCE($3, password_hash), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(email)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn mark_deleted(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET deleted_at = now(), is_active = FALSE, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn clear_deleted(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET deleted_at = NULL, is_active = TRUE, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Resolve os perfis do usuário (através dos vínculos com empresas) com
    // os códigos de permissão já materializados, para embutir no token.
    // Perfis, permissões e empresas soft-deletados ficam de fora da foto:
    // excluir a empresa desarma os perfis escopados a ela no próximo login.
    pub async fn load_role_claims(&self, user_id: Uuid) -> Result<Vec<RoleClaim>, AppError> {
        let rows = sqlx::query_as::<_, RoleClaimRow>(
            "SELECT r.code AS role_code, p.code AS permission_code \
             FROM memberships m \
             JOIN companies c ON c.id = m.company_id AND c.deleted_at IS NULL \
             JOIN membership_roles mr ON mr.membership_id = m.id \
             JOIN roles r ON r.id = mr.role_id AND r.deleted_at IS NULL \
             LEFT JOIN role_permissions rp ON rp.role_id = r.id \
             LEFT JOIN permissions p ON p.id = rp.permission_id AND p.deleted_at IS NULL \
             WHERE m.user_id = $1 \
             ORDER BY r.code",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        // Agrupa as linhas (perfil, permissão) em claims por perfil.
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in rows {
            let permissions = grouped.entry(row.role_code).or_default();
            if let Some(code) = row.permission_code {
                if !permissions.contains(&code) {
                    permissions.push(code);
                }
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(code, permissions)| RoleClaim { code, permissions })
            .collect())
    }

    // Empresa padrão embutida no token: o vínculo mais antigo do usuário
    // com uma empresa ainda viva.
    pub async fn default_company(&self, user_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let company = sqlx::query_scalar::<_, Uuid>(
            "SELECT m.company_id FROM memberships m \
             JOIN companies c ON c.id = m.company_id AND c.deleted_at IS NULL \
             WHERE m.user_id = $1 ORDER BY m.created_at LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CompanyRepository, MembershipRepository, RoleRepository};

    async fn vincula_com_perfil(pool: &PgPool, user_id: Uuid, company_id: Uuid, role_id: Uuid) {
        let memberships = MembershipRepository::new(pool.clone());
        let mut conn = pool.acquire().await.unwrap();
        let membership = memberships.upsert(&mut conn, user_id, company_id).await.unwrap();
        memberships
            .replace_roles(&mut conn, membership.id, &[role_id])
            .await
            .unwrap();
    }

    #[sqlx::test]
    async fn claims_ignoram_perfis_de_empresa_excluida(pool: PgPool) {
        let users = UserRepository::new(pool.clone());
        let companies = CompanyRepository::new(pool.clone());
        let roles = RoleRepository::new(pool.clone());

        let user = users.insert("dono@exemplo.com", "hash").await.unwrap();
        let company = companies.insert(&pool, "Acme", None, user.id).await.unwrap();
        let role = roles
            .insert(&pool, "Vendedor", "VENDEDOR", None, Some(company.id))
            .await
            .unwrap();
        vincula_com_perfil(&pool, user.id, company.id, role.id).await;

        let claims = users.load_role_claims(user.id).await.unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].code, "VENDEDOR");
        assert_eq!(users.default_company(user.id).await.unwrap(), Some(company.id));

        companies.mark_deleted(company.id).await.unwrap().unwrap();

        // Empresa excluída: os perfis escopados a ela saem da foto e ela
        // deixa de ser a empresa padrão do token.
        assert!(users.load_role_claims(user.id).await.unwrap().is_empty());
        assert_eq!(users.default_company(user.id).await.unwrap(), None);
    }

    #[sqlx::test]
    async fn email_removido_some_e_fica_livre_para_reuso(pool: PgPool) {
        let users = UserRepository::new(pool.clone());
        let first = users.insert("a@exemplo.com", "hash").await.unwrap();

        users.mark_deleted(first.id).await.unwrap().unwrap();
        assert!(users.find_by_email("a@exemplo.com").await.unwrap().is_none());
        assert!(users.find_by_id(first.id, false).await.unwrap().is_none());

        let full = users.find_by_id(first.id, true).await.unwrap().unwrap();
        assert!(full.deleted_at.is_some());
        assert!(!full.is_active);

        // O índice parcial libera o e-mail para um novo cadastro.
        let second = users.insert("a@exemplo.com", "hash").await.unwrap();
        assert_ne!(first.id, second.id);
    }
}

// src/services/role_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{ListParams, Page},
        soft_delete, update_intent,
        update_intent::UpdateIntent,
    },
    db::{CompanyRepository, PermissionRepository, RoleRepository},
    models::role::{CreateRolePayload, Role, RoleResponse, UpdateRolePayload},
};

#[derive(Clone)]
pub struct RoleService {
    repo: RoleRepository,
    permission_repo: PermissionRepository,
    company_repo: CompanyRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl RoleService {
    pub fn new(
        repo: RoleRepository,
        permission_repo: PermissionRepository,
        company_repo: CompanyRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, permission_repo, company_repo, pool }
    }

    // Valida toda referência de permissão antes de escrever qualquer coisa:
    // id inexistente (ou excluído) é erro de validação imediato, nunca uma
    // falha de chave estrangeira.
    async fn ensure_permissions_exist(&self, ids: &[Uuid]) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }
        let alive = self.permission_repo.find_alive_ids(ids).await?;
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !alive.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::InvalidReference(format!(
                "Permissões inexistentes: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        payload: CreateRolePayload,
        scope: Option<Uuid>,
    ) -> Result<RoleResponse, AppError> {
        // Escopo explícito do payload vence o contexto da requisição.
        let company_id = payload.company_id.or(scope);

        if let Some(cid) = company_id {
            self.company_repo
                .find_by_id(cid, false)
                .await?
                .ok_or_else(|| AppError::InvalidReference(format!("Empresa inexistente: {}", cid)))?;
        }

        if self
            .repo
            .name_in_scope_in_use(&payload.name, company_id, None)
            .await?
        {
            return Err(AppError::NameAlreadyExists(payload.name));
        }

        self.ensure_permissions_exist(&payload.permission_ids).await?;

        // Perfil e vínculos de permissão nascem na mesma transação.
        let mut tx = self.pool.begin().await?;

        let role = self
            .repo
            .insert(
                &mut *tx,
                &payload.name,
                &payload.code,
                payload.description.as_deref(),
                company_id,
            )
            .await?;

        self.repo
            .replace_permissions(&mut tx, role.id, &payload.permission_ids)
            .await?;

        tx.commit().await?;

        let permissions = self.repo.permission_codes(role.id).await?;
        Ok(RoleResponse { role, permissions })
    }

    pub async fn get(&self, id: Uuid, include_deleted: bool) -> Result<RoleResponse, AppError> {
        let role = self
            .repo
            .find_by_id(id, include_deleted)
            .await?
            .ok_or(AppError::NotFound("Perfil"))?;
        let permissions = self.repo.permission_codes(role.id).await?;
        Ok(RoleResponse { role, permissions })
    }

    pub async fn list(
        &self,
        params: &ListParams,
        scope: Option<Uuid>,
    ) -> Result<Page<Role>, AppError> {
        let items = self.repo.find_all(params, scope).await?;
        let total = self.repo.count_all(params, scope).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateRolePayload,
    ) -> Result<RoleResponse, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Perfil"))?;

        let intent = update_intent::resolve(
            payload.active,
            current.deleted_at.is_some(),
            payload.has_field_changes(),
        )?;

        if let Some(name) = payload.name.as_deref() {
            if self
                .repo
                .name_in_scope_in_use(name, current.company_id, Some(id))
                .await?
            {
                return Err(AppError::NameAlreadyExists(name.to_string()));
            }
        }

        if let Some(ids) = payload.permission_ids.as_deref() {
            self.ensure_permissions_exist(ids).await?;
        }

        if payload.has_field_changes() {
            let mut tx = self.pool.begin().await?;

            self.repo
                .update_fields(&mut *tx, id, payload.name.as_deref(), payload.description.as_deref())
                .await?
                .ok_or(AppError::NotFound("Perfil"))?;

            if let Some(ids) = payload.permission_ids.as_deref() {
                self.repo.replace_permissions(&mut tx, id, ids).await?;
            }

            tx.commit().await?;
        }

        match intent {
            UpdateIntent::Activate => {
                self.restore(id).await?;
            }
            UpdateIntent::Deactivate => {
                self.remove(id).await?;
            }
            UpdateIntent::FieldUpdate | UpdateIntent::NoOp => {}
        }

        self.get(id, true).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<Role, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Perfil"))?;
        soft_delete::ensure_removable(current.deleted_at)?;

        self.repo
            .mark_deleted(id)
            .await?
            .ok_or(AppError::NotFound("Perfil"))
    }

    pub async fn restore(&self, id: Uuid) -> Result<Role, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Perfil"))?;
        soft_delete::ensure_restorable(current.deleted_at)?;

        self.repo
            .clear_deleted(id)
            .await?
            .ok_or(AppError::NotFound("Perfil"))
    }
}

// src/services/company_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{ListParams, Page},
        soft_delete, update_intent,
        update_intent::UpdateIntent,
    },
    db::{CompanyRepository, MembershipRepository, RoleRepository, UserRepository},
    models::{
        company::{Company, CreateCompanyPayload, UpdateCompanyPayload},
        membership::MembershipResponse,
    },
};

#[derive(Clone)]
pub struct CompanyService {
    repo: CompanyRepository,
    membership_repo: MembershipRepository,
    role_repo: RoleRepository,
    user_repo: UserRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl CompanyService {
    pub fn new(
        repo: CompanyRepository,
        membership_repo: MembershipRepository,
        role_repo: RoleRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, membership_repo, role_repo, user_repo, pool }
    }

    // Cria a empresa e, atomicamente, o vínculo do dono como primeiro
    // membro (ainda sem perfis: eles entram pelo upsert de membros).
    pub async fn create(
        &self,
        payload: CreateCompanyPayload,
        owner_id: Uuid,
    ) -> Result<Company, AppError> {
        if self.repo.name_in_use(&payload.name, None).await? {
            return Err(AppError::NameAlreadyExists(payload.name));
        }

        let mut tx = self.pool.begin().await?;

        let company = self
            .repo
            .insert(&mut *tx, &payload.name, payload.description.as_deref(), owner_id)
            .await?;

        self.membership_repo
            .upsert(&mut tx, owner_id, company.id)
            .await?;

        tx.commit().await?;

        Ok(company)
    }

    pub async fn get(&self, id: Uuid, include_deleted: bool) -> Result<Company, AppError> {
        self.repo
            .find_by_id(id, include_deleted)
            .await?
            .ok_or(AppError::NotFound("Empresa"))
    }

    pub async fn list(&self, params: &ListParams) -> Result<Page<Company>, AppError> {
        let items = self.repo.find_all(params).await?;
        let total = self.repo.count_all(params).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateCompanyPayload,
    ) -> Result<Company, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        let intent = update_intent::resolve(
            payload.active,
            current.deleted_at.is_some(),
            payload.has_field_changes(),
        )?;

        if let Some(name) = payload.name.as_deref() {
            if self.repo.name_in_use(name, Some(id)).await? {
                return Err(AppError::NameAlreadyExists(name.to_string()));
            }
        }

        let company = if payload.has_field_changes() {
            self.repo
                .update_fields(id, payload.name.as_deref(), payload.description.as_deref())
                .await?
                .ok_or(AppError::NotFound("Empresa"))?
        } else {
            current
        };

        match intent {
            UpdateIntent::Activate => self.restore(id).await,
            UpdateIntent::Deactivate => self.remove(id).await,
            UpdateIntent::FieldUpdate | UpdateIntent::NoOp => Ok(company),
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<Company, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;
        soft_delete::ensure_removable(current.deleted_at)?;

        self.repo
            .mark_deleted(id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))
    }

    pub async fn restore(&self, id: Uuid) -> Result<Company, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;
        soft_delete::ensure_restorable(current.deleted_at)?;

        self.repo
            .clear_deleted(id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))
    }

    // Upsert do vínculo usuário ↔ empresa: o conjunto de perfis informado
    // SUBSTITUI o anterior. Referências são validadas antes da transação.
    pub async fn upsert_member(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        role_ids: Vec<Uuid>,
    ) -> Result<MembershipResponse, AppError> {
        self.repo
            .find_by_id(company_id, false)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;
        self.user_repo
            .find_by_id(user_id, false)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        if !role_ids.is_empty() {
            let alive = self
                .role_repo
                .find_alive_ids_in_scope(&role_ids, company_id)
                .await?;
            let missing: Vec<String> = role_ids
                .iter()
                .filter(|id| !alive.contains(id))
                .map(|id| id.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(AppError::InvalidReference(format!(
                    "Perfis inexistentes ou fora do escopo da empresa: {}",
                    missing.join(", ")
                )));
            }
        }

        let mut tx = self.pool.begin().await?;

        let membership = self.membership_repo.upsert(&mut tx, user_id, company_id).await?;
        self.membership_repo
            .replace_roles(&mut tx, membership.id, &role_ids)
            .await?;

        tx.commit().await?;

        Ok(MembershipResponse { membership, role_ids })
    }

    pub async fn list_members(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<MembershipResponse>, AppError> {
        self.repo
            .find_by_id(company_id, false)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        let memberships = self.membership_repo.find_by_company(company_id).await?;
        let mut out = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let role_ids = self.membership_repo.role_ids_of(membership.id).await?;
            out.push(MembershipResponse { membership, role_ids });
        }
        Ok(out)
    }
}

// src/services/user_service.rs

use bcrypt::hash;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{ListParams, Page},
        soft_delete, update_intent,
        update_intent::UpdateIntent,
    },
    db::UserRepository,
    models::user::{UpdateUserPayload, User},
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    // "Nunca existiu" e "existe mas está excluído" são indistinguíveis para
    // o chamador: ambos respondem NotFound na visão padrão.
    pub async fn get(&self, id: Uuid, include_deleted: bool) -> Result<User, AppError> {
        self.repo
            .find_by_id(id, include_deleted)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    pub async fn list(&self, params: &ListParams) -> Result<Page<User>, AppError> {
        let items = self.repo.find_all(params).await?;
        let total = self.repo.count_all(params).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn update(&self, id: Uuid, mut payload: UpdateUserPayload) -> Result<User, AppError> {
        // A visão inclui excluídos: atualizar metadados de uma linha
        // excluída é permitido (ex: corrigir antes de restaurar).
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        let has_field_changes = payload.has_field_changes();
        let intent = update_intent::resolve(
            payload.active,
            current.deleted_at.is_some(),
            has_field_changes,
        )?;

        if let Some(email) = payload.email.as_deref() {
            if self.repo.email_in_use(email, Some(id)).await? {
                return Err(AppError::EmailAlreadyExists);
            }
        }

        let password_hash = match payload.password.take() {
            Some(password) => Some(
                tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??,
            ),
            None => None,
        };

        let user = if has_field_changes {
            self.repo
                .update_fields(id, payload.email.as_deref(), password_hash.as_deref())
                .await?
                .ok_or(AppError::NotFound("Usuário"))?
        } else {
            current
        };

        // O toggle resolve por último: campos corrigidos valem na mesma
        // requisição que restaura/exclui.
        match intent {
            UpdateIntent::Activate => self.restore(id).await,
            UpdateIntent::Deactivate => self.remove(id).await,
            UpdateIntent::FieldUpdate | UpdateIntent::NoOp => Ok(user),
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<User, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;
        soft_delete::ensure_removable(current.deleted_at)?;

        self.repo
            .mark_deleted(id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    pub async fn restore(&self, id: Uuid) -> Result<User, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;
        soft_delete::ensure_restorable(current.deleted_at)?;

        self.repo
            .clear_deleted(id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }
}

// src/services/permission_service.rs

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{ListParams, Page},
        soft_delete, update_intent,
        update_intent::UpdateIntent,
    },
    db::PermissionRepository,
    models::permission::{CreatePermissionPayload, Permission, UpdatePermissionPayload},
};

#[derive(Clone)]
pub struct PermissionService {
    repo: PermissionRepository,
}

impl PermissionService {
    pub fn new(repo: PermissionRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, payload: CreatePermissionPayload) -> Result<Permission, AppError> {
        // Nome e código únicos entre linhas vivas; uma permissão excluída
        // não bloqueia o reuso.
        if self.repo.name_in_use(&payload.name, None).await? {
            return Err(AppError::NameAlreadyExists(payload.name));
        }
        if self.repo.code_in_use(&payload.code).await? {
            return Err(AppError::CodeAlreadyExists(payload.code));
        }

        self.repo
            .insert(&payload.name, &payload.code, payload.description.as_deref())
            .await
    }

    pub async fn get(&self, id: Uuid, include_deleted: bool) -> Result<Permission, AppError> {
        self.repo
            .find_by_id(id, include_deleted)
            .await?
            .ok_or(AppError::NotFound("Permissão"))
    }

    pub async fn list(&self, params: &ListParams) -> Result<Page<Permission>, AppError> {
        let items = self.repo.find_all(params).await?;
        let total = self.repo.count_all(params).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdatePermissionPayload,
    ) -> Result<Permission, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Permissão"))?;

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

        let permission = if payload.has_field_changes() {
            self.repo
                .update_fields(id, payload.name.as_deref(), payload.description.as_deref())
                .await?
                .ok_or(AppError::NotFound("Permissão"))?
        } else {
            current
        };

        match intent {
            UpdateIntent::Activate => self.restore(id).await,
            UpdateIntent::Deactivate => self.remove(id).await,
            UpdateIntent::FieldUpdate | UpdateIntent::NoOp => Ok(permission),
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<Permission, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Permissão"))?;
        soft_delete::ensure_removable(current.deleted_at)?;

        self.repo
            .mark_deleted(id)
            .await?
            .ok_or(AppError::NotFound("Permissão"))
    }

    pub async fn restore(&self, id: Uuid) -> Result<Permission, AppError> {
        let current = self
            .repo
            .find_by_id(id, true)
            .await?
            .ok_or(AppError::NotFound("Permissão"))?;
        soft_delete::ensure_restorable(current.deleted_at)?;

        self.repo
            .clear_deleted(id)
            .await?
            .ok_or(AppError::NotFound("Permissão"))
    }
}

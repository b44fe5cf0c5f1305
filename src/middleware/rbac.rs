// src/middleware/rbac.rs
//
// O gate de autorização. Decide apenas sobre as claims já anexadas pelo
// gate de autenticação: síncrono, sem nenhum acesso a banco.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Principal};

/// Decisão central: rota sem permissão declarada libera; principal sem
/// perfil nenhum falha diferente de principal com perfil errado (os dois
/// motivos de 403 são distintos de propósito); semântica OR sobre os
/// códigos exigidos, com atalho para o perfil administrador.
pub fn authorize(principal: &Principal, required: &[&str]) -> Result<(), AppError> {
    if required.is_empty() {
        return Ok(());
    }
    if !principal.has_roles() {
        return Err(AppError::NoRolesOrPermissions);
    }
    if principal.is_admin() {
        return Ok(());
    }
    if principal.has_any_permission(required) {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}

/// Autoatendimento de usuário: dono do recurso ou administrador.
pub fn ensure_owner_or_admin(principal: &Principal, target_user_id: Uuid) -> Result<(), AppError> {
    if principal.user_id == target_user_id || principal.is_admin() {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}

/// Regra mais estrita, usada na restauração de usuário: só administrador.
/// Ser dono não basta, porque o token ativo do próprio usuário é anterior
/// à exclusão e não prova a situação atual da conta.
pub fn ensure_admin(principal: &Principal) -> Result<(), AppError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}

/// O trait que declara as permissões exigidas por uma rota.
pub trait PermissionDef: Send + Sync + 'static {
    fn required() -> &'static [&'static str];
}

/// O extractor (guardião): colocar `RequirePermission<T>` na assinatura do
/// handler aplica o gate antes de qualquer lógica.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T> std::fmt::Debug for RequirePermission<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RequirePermission")
    }
}

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Token ausente/inválido já foi barrado pelo guard de autenticação
        // com 401; aqui, requisição sem principal não tem perfis a avaliar
        // e falha como autorização.
        let principal = parts
            .extensions
            .get::<Principal>()
            .ok_or(AppError::NoRolesOrPermissions)?;

        authorize(principal, T::required())?;

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---
// Leitura aceita o código de escrita do mesmo módulo (quem gerencia também
// enxerga); escrita exige o código de escrita.

pub struct PermUsersRead;
impl PermissionDef for PermUsersRead {
    fn required() -> &'static [&'static str] {
        &["usuarios:read", "usuarios:write"]
    }
}

pub struct PermRolesRead;
impl PermissionDef for PermRolesRead {
    fn required() -> &'static [&'static str] {
        &["perfis:read", "perfis:write"]
    }
}

pub struct PermRolesWrite;
impl PermissionDef for PermRolesWrite {
    fn required() -> &'static [&'static str] {
        &["perfis:write"]
    }
}

pub struct PermPermissionsRead;
impl PermissionDef for PermPermissionsRead {
    fn required() -> &'static [&'static str] {
        &["permissoes:read", "permissoes:write"]
    }
}

pub struct PermPermissionsWrite;
impl PermissionDef for PermPermissionsWrite {
    fn required() -> &'static [&'static str] {
        &["permissoes:write"]
    }
}

pub struct PermCompaniesRead;
impl PermissionDef for PermCompaniesRead {
    fn required() -> &'static [&'static str] {
        &["empresas:read", "empresas:write"]
    }
}

pub struct PermCompaniesWrite;
impl PermissionDef for PermCompaniesWrite {
    fn required() -> &'static [&'static str] {
        &["empresas:write"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{RoleClaim, ADMIN_ROLE_CODE};

    fn principal(perms: &[&str]) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "teste@exemplo.com".into(),
            roles: vec![RoleClaim {
                code: "OPERADOR".into(),
                permissions: perms.iter().map(|p| p.to_string()).collect(),
            }],
            company_id: None,
        }
    }

    fn sem_perfis() -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "teste@exemplo.com".into(),
            roles: Vec::new(),
            company_id: None,
        }
    }

    fn admin() -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "admin@exemplo.com".into(),
            roles: vec![RoleClaim { code: ADMIN_ROLE_CODE.into(), permissions: Vec::new() }],
            company_id: None,
        }
    }

    #[test]
    fn rota_sem_permissao_declarada_libera() {
        assert!(authorize(&sem_perfis(), &[]).is_ok());
    }

    #[test]
    fn intersecao_nao_vazia_libera() {
        // {A,B} contra rota exigindo {B,C}: basta uma (OR).
        assert!(authorize(&principal(&["a", "b"]), &["b", "c"]).is_ok());
    }

    #[test]
    fn intersecao_vazia_nega_com_permissoes_insuficientes() {
        let err = authorize(&principal(&["a"]), &["b", "c"]).unwrap_err();
        assert!(matches!(err, AppError::InsufficientPermissions));
    }

    #[test]
    fn principal_sem_perfis_nega_com_motivo_proprio() {
        let err = authorize(&sem_perfis(), &["b"]).unwrap_err();
        assert!(matches!(err, AppError::NoRolesOrPermissions));
    }

    #[test]
    fn admin_passa_sem_permissao_explicita() {
        assert!(authorize(&admin(), &["qualquer:coisa"]).is_ok());
    }

    #[test]
    fn dono_acessa_o_proprio_recurso_sem_perfil() {
        let p = sem_perfis();
        assert!(ensure_owner_or_admin(&p, p.user_id).is_ok());
    }

    #[test]
    fn nao_dono_sem_admin_e_negado() {
        let p = principal(&["usuarios:read"]);
        let err = ensure_owner_or_admin(&p, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::InsufficientPermissions));
    }

    #[test]
    fn admin_acessa_recurso_de_terceiro() {
        assert!(ensure_owner_or_admin(&admin(), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn restauracao_exige_admin_mesmo_para_o_dono() {
        // Assimetria intencional: o dono não restaura a própria conta.
        let dono = sem_perfis();
        assert!(matches!(ensure_admin(&dono).unwrap_err(), AppError::InsufficientPermissions));
        assert!(ensure_admin(&admin()).is_ok());
    }

    #[tokio::test]
    async fn extractor_sem_principal_nega_como_autorizacao() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();

        let err = RequirePermission::<PermUsersRead>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoRolesOrPermissions));
    }

    #[tokio::test]
    async fn extractor_com_principal_autorizado_libera() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        parts.extensions.insert(principal(&["usuarios:read"]));

        assert!(
            RequirePermission::<PermUsersRead>::from_request_parts(&mut parts, &())
                .await
                .is_ok()
        );
    }
}

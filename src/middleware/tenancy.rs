// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Principal};

// O nome do nosso cabeçalho HTTP customizado
const COMPANY_ID_HEADER: &str = "x-company-id";

// Contexto de empresa da requisição. Estritamente request-scoped: vive
// nas extensions da requisição, nunca em estado global.
#[derive(Debug, Clone)]
pub struct TenantContext(pub Uuid);

// Resolução do contexto: o cabeçalho explícito tem precedência sobre a
// empresa embutida no token; sem nenhum dos dois, não há contexto.
fn resolve_company(
    headers: &HeaderMap,
    principal: Option<&Principal>,
) -> Result<Option<Uuid>, AppError> {
    if let Some(value) = headers.get(COMPANY_ID_HEADER) {
        let value_str = value.to_str().map_err(|_| AppError::InvalidTenantHeader)?;
        let company_id =
            Uuid::parse_str(value_str).map_err(|_| AppError::InvalidTenantHeader)?;
        return Ok(Some(company_id));
    }

    Ok(principal.and_then(|p| p.company_id))
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        resolve_company(&parts.headers, parts.extensions.get::<Principal>())?
            .map(TenantContext)
            .ok_or(AppError::MissingTenant)
    }
}

// Versão opcional: rotas que funcionam com ou sem escopo de empresa.
impl<S> OptionalFromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(resolve_company(&parts.headers, parts.extensions.get::<Principal>())?
            .map(TenantContext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal_com_empresa(company_id: Option<Uuid>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "teste@exemplo.com".into(),
            roles: Vec::new(),
            company_id,
        }
    }

    #[test]
    fn cabecalho_tem_precedencia_sobre_o_token() {
        let do_header = Uuid::new_v4();
        let do_token = Uuid::new_v4();

        let mut headers = HeaderMap::new();
        headers.insert(COMPANY_ID_HEADER, do_header.to_string().parse().unwrap());

        let principal = principal_com_empresa(Some(do_token));
        let resolved = resolve_company(&headers, Some(&principal)).unwrap();
        assert_eq!(resolved, Some(do_header));
    }

    #[test]
    fn sem_cabecalho_vale_a_empresa_do_token() {
        let do_token = Uuid::new_v4();
        let principal = principal_com_empresa(Some(do_token));

        let resolved = resolve_company(&HeaderMap::new(), Some(&principal)).unwrap();
        assert_eq!(resolved, Some(do_token));
    }

    #[test]
    fn sem_cabecalho_e_sem_claim_nao_ha_contexto() {
        let principal = principal_com_empresa(None);
        assert_eq!(resolve_company(&HeaderMap::new(), Some(&principal)).unwrap(), None);
        assert_eq!(resolve_company(&HeaderMap::new(), None).unwrap(), None);
    }

    #[test]
    fn cabecalho_que_nao_e_uuid_e_rejeitado() {
        let mut headers = HeaderMap::new();
        headers.insert(COMPANY_ID_HEADER, "nao-e-um-uuid".parse().unwrap());

        let err = resolve_company(&headers, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidTenantHeader));
    }
}

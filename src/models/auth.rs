// src/models/auth.rs

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Código de perfil reconhecido pelo atalho de administrador.
/// É a única comparação de perfil feita por código fixo; toda outra
/// decisão de autorização usa códigos de permissão.
pub const ADMIN_ROLE_CODE: &str = "ADMIN";

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
}

// Um perfil dentro do token: código + códigos de permissão já resolvidos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleClaim {
    pub code: String,
    pub permissions: Vec<String>,
}

// Estrutura de dados ("claims") dentro do JWT. Forma canônica achatada:
// o token é a foto autoritativa dos perfis/permissões no momento do login;
// mudanças posteriores só valem após novo login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // Subject (ID do usuário)
    pub email: String,
    pub roles: Vec<RoleClaim>,
    // Empresa padrão do usuário no momento do login, se houver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

/// O principal autenticado da requisição. Construído a partir das claims
/// verificadas e inserido nas extensions em um slot próprio, separado das
/// claims cruas: o código de autorização lê apenas este tipo.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<RoleClaim>,
    pub company_id: Option<Uuid>,
}

impl Principal {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            roles: claims.roles.clone(),
            company_id: claims.company_id,
        }
    }

    pub fn has_roles(&self) -> bool {
        !self.roles.is_empty()
    }

    /// Atalho de administrador: igualdade do *código* do perfil com a
    /// constante fixa. Nomes de perfil nunca entram na decisão.
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r.code == ADMIN_ROLE_CODE)
    }

    /// Achata os códigos de permissão de todos os perfis em um conjunto.
    pub fn permission_codes(&self) -> HashSet<&str> {
        self.roles
            .iter()
            .flat_map(|r| r.permissions.iter().map(String::as_str))
            .collect()
    }

    /// Semântica OR: basta uma das permissões exigidas.
    pub fn has_any_permission(&self, required: &[&str]) -> bool {
        let held = self.permission_codes();
        required.iter().any(|code| held.contains(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal_com(roles: Vec<RoleClaim>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "teste@exemplo.com".into(),
            roles,
            company_id: None,
        }
    }

    #[test]
    fn achata_permissoes_de_todos_os_perfis() {
        let p = principal_com(vec![
            RoleClaim {
                code: "VENDEDOR".into(),
                permissions: vec!["usuarios:read".into(), "empresas:read".into()],
            },
            RoleClaim {
                code: "ESTOQUISTA".into(),
                permissions: vec!["empresas:read".into(), "perfis:read".into()],
            },
        ]);

        let codes = p.permission_codes();
        assert_eq!(codes.len(), 3);
        assert!(codes.contains("usuarios:read"));
        assert!(codes.contains("perfis:read"));
    }

    #[test]
    fn semantica_or_basta_uma_permissao() {
        let p = principal_com(vec![RoleClaim {
            code: "VENDEDOR".into(),
            permissions: vec!["a".into(), "b".into()],
        }]);

        assert!(p.has_any_permission(&["b", "c"]));
        assert!(!p.has_any_permission(&["c", "d"]));
    }

    #[test]
    fn atalho_admin_compara_codigo_e_nao_nome() {
        let admin = principal_com(vec![RoleClaim {
            code: ADMIN_ROLE_CODE.into(),
            permissions: vec![],
        }]);
        assert!(admin.is_admin());

        // Perfil chamado "Administrador" mas com código diferente não conta.
        let quase = principal_com(vec![RoleClaim {
            code: "Administrador".into(),
            permissions: vec![],
        }]);
        assert!(!quase.is_admin());
    }

    #[test]
    fn principal_copia_as_claims() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@b.com".into(),
            roles: vec![RoleClaim { code: "X".into(), permissions: vec!["p".into()] }],
            company_id: Some(Uuid::new_v4()),
            exp: 0,
            iat: 0,
        };
        let p = Principal::from_claims(&claims);
        assert_eq!(p.user_id, claims.sub);
        assert_eq!(p.email, claims.email);
        assert_eq!(p.company_id, claims.company_id);
        assert_eq!(p.roles, claims.roles);
    }
}

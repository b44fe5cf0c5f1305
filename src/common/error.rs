// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A taxonomia segue os status HTTP: 400 validação, 401 autenticação,
// 403 autorização, 404 não encontrado, 409 conflito, 500 o resto.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Referência a uma entidade relacionada que não existe (ex: id de
    // permissão inexistente ao criar um perfil). Checado antes de qualquer
    // mutação, nunca deixado estourar como erro de chave estrangeira.
    #[error("Referência inválida: {0}")]
    InvalidReference(String),

    #[error("Cabeçalho x-company-id inválido")]
    InvalidTenantHeader,

    #[error("Nenhuma empresa no contexto da requisição")]
    MissingTenant,

    // Mensagem única para usuário inexistente E senha errada: a resposta
    // não pode revelar qual dos dois ocorreu.
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Os dois motivos de 403 são variantes distintas de propósito: o
    // chamador consegue distinguir "sem perfil nenhum" de "perfil errado".
    #[error("Usuário não possui perfis ou permissões")]
    NoRolesOrPermissions,

    #[error("Permissões insuficientes")]
    InsufficientPermissions,

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Este e-mail já está em uso")]
    EmailAlreadyExists,

    #[error("Já existe um registro com o nome '{0}'")]
    NameAlreadyExists(String),

    #[error("Já existe um registro com o código '{0}'")]
    CodeAlreadyExists(String),

    #[error("O registro já está excluído")]
    AlreadyDeleted,

    #[error("O registro não está excluído")]
    NotDeleted,

    // Toggle de `active` que bate com o estado atual da linha: conflito,
    // não um no-op.
    #[error("O registro já se encontra neste estado")]
    ActiveStateUnchanged,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidReference(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidTenantHeader => (
                StatusCode::BAD_REQUEST,
                "Cabeçalho x-company-id inválido (não é um UUID).".to_string(),
            ),
            AppError::MissingTenant => (
                StatusCode::BAD_REQUEST,
                "Nenhuma empresa no contexto: envie o cabeçalho x-company-id ou use um token com empresa.".to_string(),
            ),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::NoRolesOrPermissions => (
                StatusCode::FORBIDDEN,
                "Usuário não possui perfis ou permissões.".to_string(),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "Permissões insuficientes para esta operação.".to_string(),
            ),
            AppError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", entity))
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::NameAlreadyExists(name) => (
                StatusCode::CONFLICT,
                format!("Já existe um registro ativo com o nome '{}'.", name),
            ),
            AppError::CodeAlreadyExists(code) => (
                StatusCode::CONFLICT,
                format!("Já existe um registro ativo com o código '{}'.", code),
            ),
            AppError::AlreadyDeleted => {
                (StatusCode::CONFLICT, "O registro já está excluído.".to_string())
            }
            AppError::NotDeleted => {
                (StatusCode::CONFLICT, "O registro não está excluído.".to_string())
            }
            AppError::ActiveStateUnchanged => (
                StatusCode::CONFLICT,
                "O registro já se encontra neste estado.".to_string(),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError...)
            // viram 500. O detalhe fica no log do servidor; a resposta ao
            // cliente é genérica, sem vazamento.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                if std::env::var("APP_ENV").as_deref() == Ok("test") {
                    // Em ambiente de diagnóstico o detalhe completo também
                    // sai no stream de erro.
                    eprintln!("[diagnóstico] {:?}", e);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// src/common/soft_delete.rs
//
// Regras de transição do soft-delete, uniformes para usuários, empresas,
// perfis e permissões. Os serviços buscam a linha com include_deleted=true
// e aplicam estas regras antes de tocar no banco.

use chrono::{DateTime, Utc};

use crate::common::error::AppError;

/// Exclusão de linha já excluída é conflito, não no-op.
pub fn ensure_removable(deleted_at: Option<DateTime<Utc>>) -> Result<(), AppError> {
    match deleted_at {
        Some(_) => Err(AppError::AlreadyDeleted),
        None => Ok(()),
    }
}

/// Restauração só vale para linha atualmente excluída.
pub fn ensure_restorable(deleted_at: Option<DateTime<Utc>>) -> Result<(), AppError> {
    match deleted_at {
        Some(_) => Ok(()),
        None => Err(AppError::NotDeleted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remover_linha_viva_passa() {
        assert!(ensure_removable(None).is_ok());
    }

    #[test]
    fn remover_linha_ja_excluida_conflita() {
        let err = ensure_removable(Some(Utc::now())).unwrap_err();
        assert!(matches!(err, AppError::AlreadyDeleted));
    }

    #[test]
    fn restaurar_linha_excluida_passa() {
        assert!(ensure_restorable(Some(Utc::now())).is_ok());
    }

    #[test]
    fn restaurar_linha_viva_conflita() {
        let err = ensure_restorable(None).unwrap_err();
        assert!(matches!(err, AppError::NotDeleted));
    }
}

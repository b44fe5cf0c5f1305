// src/common/update_intent.rs
//
// Os endpoints de atualização aceitam um campo booleano `active` com
// semântica sobrecarregada: false em linha viva = excluir, true em linha
// excluída = restaurar. Em vez de inferir a intenção espalhada pelos
// serviços, resolvemos o payload para uma variante explícita antes de
// despachar para remove/restore/update.

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateIntent {
    /// Nada a fazer: sem campos e sem toggle.
    NoOp,
    /// `active: true` sobre linha excluída → restaurar.
    Activate,
    /// `active: false` sobre linha viva → excluir.
    Deactivate,
    /// Apenas campos de dados mudam.
    FieldUpdate,
}

/// Resolve o toggle `active` contra o estado atual da linha.
/// Toggle que bate com o estado atual é conflito (não no-op).
pub fn resolve(
    active: Option<bool>,
    currently_deleted: bool,
    has_field_changes: bool,
) -> Result<UpdateIntent, AppError> {
    match active {
        Some(true) if currently_deleted => Ok(UpdateIntent::Activate),
        Some(false) if !currently_deleted => Ok(UpdateIntent::Deactivate),
        Some(_) => Err(AppError::ActiveStateUnchanged),
        None if has_field_changes => Ok(UpdateIntent::FieldUpdate),
        None => Ok(UpdateIntent::NoOp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desativar_linha_viva() {
        assert_eq!(resolve(Some(false), false, false).unwrap(), UpdateIntent::Deactivate);
    }

    #[test]
    fn ativar_linha_excluida() {
        assert_eq!(resolve(Some(true), true, false).unwrap(), UpdateIntent::Activate);
    }

    #[test]
    fn toggle_redundante_conflita() {
        assert!(matches!(
            resolve(Some(true), false, false).unwrap_err(),
            AppError::ActiveStateUnchanged
        ));
        assert!(matches!(
            resolve(Some(false), true, true).unwrap_err(),
            AppError::ActiveStateUnchanged
        ));
    }

    #[test]
    fn sem_toggle_resolve_pelos_campos() {
        assert_eq!(resolve(None, false, true).unwrap(), UpdateIntent::FieldUpdate);
        assert_eq!(resolve(None, true, true).unwrap(), UpdateIntent::FieldUpdate);
        assert_eq!(resolve(None, false, false).unwrap(), UpdateIntent::NoOp);
    }
}

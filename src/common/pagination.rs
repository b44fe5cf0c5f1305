// src/common/pagination.rs

use serde::{Deserialize, Serialize};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

// Parâmetros de listagem compartilhados por todos os endpoints paginados.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    // Filtro "nome contém", opcional.
    pub name: Option<String>,
    // Por padrão linhas excluídas ficam de fora; este flag as inclui.
    #[serde(default)]
    pub include_deleted: bool,
}

impl ListParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.per_page()
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }

    // Filtro "contém" com os metacaracteres do LIKE neutralizados: um
    // filtro de "%" busca o caractere literal, não todas as linhas.
    pub fn name_filter(&self) -> Option<String> {
        self.name.as_deref().map(|name| {
            name.replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        })
    }
}

// Parâmetros de busca por id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetParams {
    #[serde(default)]
    pub include_deleted: bool,
}

// Envelope de resposta paginada.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page(),
            per_page: params.per_page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_e_limites() {
        let params = ListParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 20);
        assert_eq!(params.offset(), 0);

        let params = ListParams {
            page: Some(3),
            per_page: Some(500),
            ..Default::default()
        };
        assert_eq!(params.per_page(), 100);
        assert_eq!(params.offset(), 200);

        let params = ListParams {
            page: Some(0),
            per_page: Some(0),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 1);
    }

    #[test]
    fn filtro_de_nome_escapa_metacaracteres() {
        let params = ListParams {
            name: Some("100%_a\\b".into()),
            ..Default::default()
        };
        assert_eq!(params.name_filter().as_deref(), Some("100\\%\\_a\\\\b"));
        assert_eq!(ListParams::default().name_filter(), None);
    }
}

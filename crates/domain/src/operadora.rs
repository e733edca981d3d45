//! Operadora catalog records and list pages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One catalog record.
///
/// Only `cnpj` and `razao_social` carry meaning for the client. Every other
/// field (`id`, `nome_fantasia`, `uf`, `cidade`, ...) is passed through
/// unmodified in `fields`, explicit nulls included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operadora {
    /// Identifier used as primary key by the catalog.
    pub cnpj: String,
    /// Display name.
    pub razao_social: String,
    /// Descriptive fields, kept as received.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Operadora {
    /// Creates a record with only the identifying fields set.
    #[must_use]
    pub fn new(cnpj: impl Into<String>, razao_social: impl Into<String>) -> Self {
        Self {
            cnpj: cnpj.into(),
            razao_social: razao_social.into(),
            fields: Map::new(),
        }
    }

    /// Sets the federative unit.
    #[must_use]
    pub fn with_uf(mut self, uf: impl Into<String>) -> Self {
        self.fields.insert("uf".to_string(), Value::String(uf.into()));
        self
    }

    /// Federative unit (state code), when the server sent a string.
    #[must_use]
    pub fn uf(&self) -> Option<&str> {
        self.text("uf")
    }

    /// Trade name, when the server sent a string.
    #[must_use]
    pub fn nome_fantasia(&self) -> Option<&str> {
        self.text("nome_fantasia")
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// One page of the operadora list as returned by the server.
///
/// `total` is the full match count reported by the server and is
/// independent of `items.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperadoraPage {
    /// Records on this page.
    #[serde(rename = "data")]
    pub items: Vec<Operadora>,
    /// Number of records matching the query across all pages.
    pub total: u64,
    /// Page echoed back by the server, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size echoed back by the server, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl OperadoraPage {
    /// Creates a page from its items and total.
    #[must_use]
    pub const fn new(items: Vec<Operadora>, total: u64) -> Self {
        Self {
            items,
            total,
            page: None,
            limit: None,
        }
    }
}

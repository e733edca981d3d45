//! Expense records belonging to an operadora.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One expense record.
///
/// Despesas are looked up by the owning operadora's CNPJ; they carry no
/// back-reference to it. Only the amount is interpreted; `id`, `ano`,
/// `trimestre` and anything else stay in `fields` as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Despesa {
    /// Amount for the period.
    #[serde(rename = "valor_despesas")]
    pub amount: f64,
    /// Descriptive fields, kept as received.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Despesa {
    /// Creates a record for the given period and amount.
    #[must_use]
    pub fn new(ano: i32, trimestre: u8, amount: f64) -> Self {
        let mut fields = Map::new();
        fields.insert("ano".to_string(), Value::from(ano));
        fields.insert("trimestre".to_string(), Value::from(trimestre));
        Self { amount, fields }
    }

    /// Reference year, when the server sent an integer.
    #[must_use]
    pub fn ano(&self) -> Option<i64> {
        self.fields.get("ano").and_then(Value::as_i64)
    }

    /// Reference quarter, when the server sent an integer.
    #[must_use]
    pub fn trimestre(&self) -> Option<i64> {
        self.fields.get("trimestre").and_then(Value::as_i64)
    }
}

/// Sums the amounts of a despesa history.
#[must_use]
pub fn total_amount(despesas: &[Despesa]) -> f64 {
    despesas.iter().map(|d| d.amount).sum()
}

//! Aggregate statistics and the chart series derived from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of ranked entries used for the chart series.
pub const TOP_RANK_SIZE: usize = 5;

/// Aggregate snapshot returned by the statistics endpoint.
///
/// The body must be a JSON object. Backends that answer this route with a
/// bare array (a per-UF breakdown) fail to decode and surface as
/// `Decode` failures.
///
/// Only the ranking is interpreted. The aggregates (`total_despesas`,
/// `media_despesas`) and anything else are kept in `fields` as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Operadoras ranked by total expenses, highest first.
    #[serde(default)]
    pub top5_operadoras: Option<Vec<TopOperadora>>,
    /// Descriptive fields, kept as received.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Statistics {
    /// Creates a snapshot holding only a ranking.
    #[must_use]
    pub fn with_ranking(top: Vec<TopOperadora>) -> Self {
        Self {
            top5_operadoras: Some(top),
            fields: Map::new(),
        }
    }

    /// Sum of all expenses, when the server sent a number.
    #[must_use]
    pub fn total_despesas(&self) -> Option<f64> {
        self.fields.get("total_despesas").and_then(Value::as_f64)
    }

    /// Builds the chart series from the ranking, if the snapshot has one.
    #[must_use]
    pub fn chart_series(&self) -> Option<Vec<ChartPoint>> {
        self.top5_operadoras.as_deref().map(derive_chart_series)
    }
}

/// One ranked entry of the statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopOperadora {
    /// Display name.
    pub razao_social: String,
    /// Total expenses.
    pub total: f64,
    /// Descriptive fields such as `cnpj`, kept as received.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TopOperadora {
    /// Creates a ranked entry.
    #[must_use]
    pub fn new(razao_social: impl Into<String>, total: f64) -> Self {
        Self {
            razao_social: razao_social.into(),
            total,
            fields: Map::new(),
        }
    }
}

/// A labelled amount, ready for a bar chart.
///
/// On the wire the label is named `uf` and the amount `valor`. Despite the
/// name, `uf` carries the operadora's display name, not a state code; the
/// historical field names are kept so existing consumers keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Display name of the operadora.
    #[serde(rename = "uf")]
    pub label: String,
    /// Total expenses.
    #[serde(rename = "valor")]
    pub amount: f64,
}

/// Maps a ranking onto chart points, keeping rank order and at most
/// [`TOP_RANK_SIZE`] entries.
#[must_use]
pub fn derive_chart_series(ranking: &[TopOperadora]) -> Vec<ChartPoint> {
    ranking
        .iter()
        .take(TOP_RANK_SIZE)
        .map(|op| ChartPoint {
            label: op.razao_social.clone(),
            amount: op.total,
        })
        .collect()
}

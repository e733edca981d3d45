//! Presentation-facing catalog state.

use operadoras_domain::{
    ChartPoint, Despesa, ListQuery, Operadora, Statistics,
};
use serde::Serialize;

/// Snapshot of everything the views read.
///
/// The store replaces fields wholesale on each successful fetch; nothing is
/// merged. `operadoras` and `total` always come from the same response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogState {
    /// Records of the current page.
    pub operadoras: Vec<Operadora>,
    /// Server-reported match count for the current query.
    pub total: u64,
    /// Page, page size, search text and filters used by the next list fetch.
    pub query: ListQuery,
    /// True while the latest list request is in flight.
    pub loading: bool,
    /// Last statistics snapshot.
    pub statistics: Option<Statistics>,
    /// Chart series derived from the statistics ranking.
    pub top_derived: Vec<ChartPoint>,
    /// Operadora whose details are being shown.
    pub selected: Option<Operadora>,
    /// Despesa history of `selected`.
    pub despesas: Vec<Despesa>,
    /// Federative units available as filter values.
    pub ufs: Vec<String>,
    /// Display names available as filter values.
    pub razoes_sociais: Vec<String>,
}

impl CatalogState {
    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.query.page()
    }

    /// Current page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.query.limit()
    }

    /// Current search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.query.search
    }

    /// Number of pages for the current total, at least 1.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.query.total_pages(self.total)
    }
}

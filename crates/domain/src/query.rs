//! Pagination and filter parameters for the operadora list.

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 10;

/// Parameters of one list request.
///
/// `search` is always sent, even when empty: the server treats an empty
/// search as "no filter". The optional filters are only sent when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    page: u32,
    limit: u32,
    /// Free-text search over CNPJ and display name.
    pub search: String,
    /// Exact federative unit filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uf: Option<String>,
    /// Exact display name filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razao_social: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            uf: None,
            razao_social: None,
        }
    }
}

impl ListQuery {
    /// Creates a query for the given page and page size.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` or `limit` is zero.
    pub fn new(page: u32, limit: u32) -> DomainResult<Self> {
        Ok(Self {
            page: validate_page(page)?,
            limit: validate_limit(limit)?,
            ..Self::default()
        })
    }

    /// Sets the free-text search.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Sets the federative unit filter.
    #[must_use]
    pub fn with_uf(mut self, uf: impl Into<String>) -> Self {
        self.uf = Some(uf.into());
        self
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Changes the page number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPage` for page 0.
    pub fn set_page(&mut self, page: u32) -> DomainResult<()> {
        self.page = validate_page(page)?;
        Ok(())
    }

    /// Changes the page size.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLimit` for a limit of 0.
    pub fn set_limit(&mut self, limit: u32) -> DomainResult<()> {
        self.limit = validate_limit(limit)?;
        Ok(())
    }

    /// Number of pages needed to show `total` records, never less than 1.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u32 {
        let pages = total.div_ceil(u64::from(self.limit)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Returns the query string pairs, in the order they are sent.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("search", self.search.clone()),
        ];
        if let Some(uf) = &self.uf {
            pairs.push(("uf", uf.clone()));
        }
        if let Some(razao_social) = &self.razao_social {
            pairs.push(("razao_social", razao_social.clone()));
        }
        pairs
    }
}

const fn validate_page(page: u32) -> DomainResult<u32> {
    if page == 0 {
        return Err(DomainError::InvalidPage(page));
    }
    Ok(page)
}

const fn validate_limit(limit: u32) -> DomainResult<u32> {
    if limit == 0 {
        return Err(DomainError::InvalidLimit(limit));
    }
    Ok(limit)
}

//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while validating catalog inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The CNPJ identifier is empty or blank.
    #[error("invalid CNPJ: {0:?}")]
    InvalidCnpj(String),

    /// Page numbers start at 1.
    #[error("invalid page: {0} (pages start at 1)")]
    InvalidPage(u32),

    /// Page size must be at least 1.
    #[error("invalid limit: {0} (must be at least 1)")]
    InvalidLimit(u32),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

//! Catalog gateway port
//!
//! Defines the interface to the remote catalog API. Implementations issue
//! one fresh request per call: no retries, no caching.

use std::sync::Arc;

use async_trait::async_trait;
use operadoras_domain::{
    Cnpj, Despesa, FailureKind, ListQuery, Operadora, OperadoraPage, Statistics,
};

/// Errors that can occur while talking to the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Network unreachable, connection refused, or body read failure.
    #[error("transport error: {message}")]
    Transport {
        /// Description from the HTTP stack.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that was exceeded.
        timeout_ms: u64,
    },

    /// The server answered with a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The server answered 404 for the requested path.
    #[error("not found: {path}")]
    NotFound {
        /// Path that was requested.
        path: String,
    },

    /// The body did not match the expected shape.
    #[error("unexpected response body: {message}")]
    Decode {
        /// Decoder error description.
        message: String,
    },

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Builds the error for a non-2xx response, splitting out 404.
    #[must_use]
    pub fn from_status(status: u16, path: impl Into<String>, body: impl Into<String>) -> Self {
        if status == 404 {
            Self::NotFound { path: path.into() }
        } else {
            Self::HttpStatus {
                status,
                body: body.into(),
            }
        }
    }

    /// Returns the HTTP status behind this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Returns the display category of this error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } => FailureKind::Transport,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::HttpStatus { .. } => FailureKind::HttpStatus,
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::Decode { .. } => FailureKind::Decode,
            Self::InvalidUrl(_) => FailureKind::InvalidRequest,
        }
    }
}

/// Port for the remote catalog API.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetches one page of operadoras.
    ///
    /// # Errors
    /// Returns a `GatewayError` on transport, status, or decode failure.
    async fn list_operadoras(&self, query: &ListQuery) -> Result<OperadoraPage, GatewayError>;

    /// Fetches the aggregate statistics.
    ///
    /// # Errors
    /// Returns a `GatewayError` on transport, status, or decode failure.
    async fn get_statistics(&self) -> Result<Statistics, GatewayError>;

    /// Fetches the despesa history of one operadora.
    ///
    /// # Errors
    /// Returns `GatewayError::NotFound` when the server knows no such CNPJ.
    async fn get_despesas(&self, cnpj: &Cnpj) -> Result<Vec<Despesa>, GatewayError>;

    /// Fetches the detail record of one operadora.
    ///
    /// # Errors
    /// Returns `GatewayError::NotFound` when the server knows no such CNPJ.
    async fn get_operadora(&self, cnpj: &Cnpj) -> Result<Operadora, GatewayError>;

    /// Lists the distinct federative units present in the catalog.
    ///
    /// # Errors
    /// Returns a `GatewayError` on transport, status, or decode failure.
    async fn list_ufs(&self) -> Result<Vec<String>, GatewayError>;

    /// Lists the distinct display names present in the catalog.
    ///
    /// # Errors
    /// Returns a `GatewayError` on transport, status, or decode failure.
    async fn list_razoes_sociais(&self) -> Result<Vec<String>, GatewayError>;

    /// Probes the API health endpoint.
    ///
    /// # Errors
    /// Returns a `GatewayError` on transport, status, or decode failure.
    async fn health(&self) -> Result<(), GatewayError>;
}

#[async_trait]
impl<T: CatalogGateway + ?Sized> CatalogGateway for Arc<T> {
    async fn list_operadoras(&self, query: &ListQuery) -> Result<OperadoraPage, GatewayError> {
        (**self).list_operadoras(query).await
    }

    async fn get_statistics(&self) -> Result<Statistics, GatewayError> {
        (**self).get_statistics().await
    }

    async fn get_despesas(&self, cnpj: &Cnpj) -> Result<Vec<Despesa>, GatewayError> {
        (**self).get_despesas(cnpj).await
    }

    async fn get_operadora(&self, cnpj: &Cnpj) -> Result<Operadora, GatewayError> {
        (**self).get_operadora(cnpj).await
    }

    async fn list_ufs(&self) -> Result<Vec<String>, GatewayError> {
        (**self).list_ufs().await
    }

    async fn list_razoes_sociais(&self) -> Result<Vec<String>, GatewayError> {
        (**self).list_razoes_sociais().await
    }

    async fn health(&self) -> Result<(), GatewayError> {
        (**self).health().await
    }
}

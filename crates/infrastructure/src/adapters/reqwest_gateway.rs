//! Catalog gateway implementation using reqwest.
//!
//! This adapter implements the `CatalogGateway` port over HTTP. Every call
//! is a single unauthenticated GET; nothing is retried or cached.

use async_trait::async_trait;
use operadoras_application::ports::{CatalogGateway, GatewayError};
use operadoras_domain::{Cnpj, Despesa, ListQuery, Operadora, OperadoraPage, Statistics};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;

/// Longest error body kept in `GatewayError::HttpStatus`.
const MAX_ERROR_BODY: usize = 512;

/// HTTP gateway to the catalog API.
pub struct ReqwestCatalogGateway {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl ReqwestCatalogGateway {
    /// Creates a gateway from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self::with_client(client, config))
    }

    /// Creates a gateway around an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            timeout_ms: config.timeout_ms,
        }
    }

    /// Builds the URL for the given path segments under the base URL.
    ///
    /// Dot segments are rejected: the URL parser would drop them and the
    /// request would reach a different resource.
    fn endpoint(&self, segments: &[&str], trailing_slash: bool) -> Result<Url, GatewayError> {
        if let Some(segment) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(GatewayError::InvalidUrl(format!(
                "{}: path segment {segment:?} is not allowed",
                self.base_url
            )));
        }
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| GatewayError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
            if trailing_slash {
                path.push("");
            }
        }
        Ok(url)
    }

    fn list_url(&self, query: &ListQuery) -> Result<Url, GatewayError> {
        let mut url = self.endpoint(&["api", "operadoras"], true)?;
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        Ok(url)
    }

    /// Issues a GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        let path = url.path().to_string();
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_error(&e))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let text: String = text.chars().take(MAX_ERROR_BODY).collect();
            debug!(status = status.as_u16(), %path, "non-success response");
            return Err(GatewayError::from_status(status.as_u16(), path, text));
        }

        serde_json::from_slice(&body).map_err(|e| GatewayError::Decode {
            message: format!("{path}: {e}"),
        })
    }

    /// Maps reqwest errors to `GatewayError`.
    fn map_error(&self, error: &reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            return GatewayError::Timeout {
                timeout_ms: self.timeout_ms,
            };
        }
        if error.is_decode() {
            return GatewayError::Decode {
                message: error.to_string(),
            };
        }
        GatewayError::Transport {
            message: error.to_string(),
        }
    }
}

/// Drops the nulls the distinct-value endpoints may contain.
fn present_values(values: Vec<Option<String>>) -> Vec<String> {
    values.into_iter().flatten().collect()
}

#[async_trait]
impl CatalogGateway for ReqwestCatalogGateway {
    async fn list_operadoras(&self, query: &ListQuery) -> Result<OperadoraPage, GatewayError> {
        let url = self.list_url(query)?;
        self.get_json(url).await
    }

    async fn get_statistics(&self) -> Result<Statistics, GatewayError> {
        let url = self.endpoint(&["api", "estatisticas"], true)?;
        self.get_json(url).await
    }

    async fn get_despesas(&self, cnpj: &Cnpj) -> Result<Vec<Despesa>, GatewayError> {
        let url = self.endpoint(&["api", "operadoras", cnpj.as_str(), "despesas"], true)?;
        self.get_json(url).await
    }

    async fn get_operadora(&self, cnpj: &Cnpj) -> Result<Operadora, GatewayError> {
        let url = self.endpoint(&["api", "operadoras", cnpj.as_str()], false)?;
        self.get_json(url).await
    }

    async fn list_ufs(&self) -> Result<Vec<String>, GatewayError> {
        let url = self.endpoint(&["api", "operadoras", "ufs"], false)?;
        self.get_json(url).await.map(present_values)
    }

    async fn list_razoes_sociais(&self) -> Result<Vec<String>, GatewayError> {
        let url = self.endpoint(&["api", "operadoras", "razao_social"], false)?;
        self.get_json(url).await.map(present_values)
    }

    async fn health(&self) -> Result<(), GatewayError> {
        let url = self.endpoint(&["health"], false)?;
        let body: serde_json::Value = self.get_json(url).await?;
        match body.get("status").and_then(serde_json::Value::as_str) {
            Some("ok") => Ok(()),
            other => Err(GatewayError::Decode {
                message: format!("unexpected health status: {other:?}"),
            }),
        }
    }
}

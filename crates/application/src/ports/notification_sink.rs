//! Notification sink port
//!
//! Failed store actions never raise to the presentation layer. They are
//! reported here instead, and the presentation decides how to render them.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use operadoras_domain::{DomainError, FailureKind};
use serde::Serialize;

use super::GatewayError;

/// Store actions that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogAction {
    /// Loading a page of operadoras.
    ListOperadoras,
    /// Loading aggregate statistics.
    Estatisticas,
    /// Loading a despesa history.
    Despesas,
    /// Loading one operadora with its despesas.
    OperadoraDetail,
    /// Loading the filter option lists.
    FilterOptions,
    /// Probing API health.
    Health,
}

impl CatalogAction {
    /// Returns the user-facing message for a failure of this action.
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::ListOperadoras => "Could not load operadoras",
            Self::Estatisticas => "Could not load statistics",
            Self::Despesas => "Could not load despesa history",
            Self::OperadoraDetail => "Could not load operadora details",
            Self::FilterOptions => "Could not load filter options",
            Self::Health => "API is unavailable",
        }
    }
}

impl fmt::Display for CatalogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ListOperadoras => "list_operadoras",
            Self::Estatisticas => "estatisticas",
            Self::Despesas => "despesas",
            Self::OperadoraDetail => "operadora_detail",
            Self::FilterOptions => "filter_options",
            Self::Health => "health",
        };
        f.write_str(name)
    }
}

/// Structured descriptor of one failed action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// Action that failed.
    pub action: CatalogAction,
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable message.
    pub message: String,
    /// Technical details.
    pub details: Option<String>,
    /// HTTP status, when the server answered.
    pub status: Option<u16>,
    /// When the failure was observed.
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    /// Describes a gateway failure.
    #[must_use]
    pub fn from_gateway_error(
        action: CatalogAction,
        error: &GatewayError,
        raised_at: DateTime<Utc>,
    ) -> Self {
        Self {
            action,
            kind: error.kind(),
            message: action.failure_message().to_string(),
            details: Some(error.to_string()),
            status: error.status(),
            raised_at,
        }
    }

    /// Describes an input that was rejected before any request was made.
    #[must_use]
    pub fn from_domain_error(
        action: CatalogAction,
        error: &DomainError,
        raised_at: DateTime<Utc>,
    ) -> Self {
        Self {
            action,
            kind: FailureKind::InvalidRequest,
            message: action.failure_message().to_string(),
            details: Some(error.to_string()),
            status: None,
            raised_at,
        }
    }

    /// Returns the display title for this notification.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.kind.title()
    }
}

/// Port receiving failure notifications.
pub trait NotificationSink: Send + Sync {
    /// Delivers one notification. Must not block.
    fn notify(&self, notification: Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

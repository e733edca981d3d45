//! Operadoras Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the client configuration.

pub mod adapters;
pub mod config;

pub use adapters::{ChannelNotifier, ReqwestCatalogGateway, TracingNotifier};
pub use config::{API_TIMEOUT_ENV, API_URL_ENV, ApiConfig, ConfigError};

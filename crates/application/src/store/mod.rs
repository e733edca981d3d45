//! Catalog state store.
//!
//! This module provides:
//! - The presentation-facing `CatalogState` snapshot
//! - `CatalogStore`, which drives the gateway and commits results
//! - Latest-wins request sequencing per action slot

mod catalog_store;
mod request_tracker;
mod state;

pub use catalog_store::{CatalogStore, FetchOutcome};
pub use request_tracker::{RequestToken, RequestTracker};
pub use state::CatalogState;

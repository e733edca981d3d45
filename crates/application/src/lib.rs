//! Operadoras Application - State and orchestration
//!
//! This crate holds the catalog store and the ports it drives. It knows the
//! shape of the remote API but not how requests travel; adapters in the
//! infrastructure crate provide that.

pub mod ports;
pub mod store;

pub use ports::{
    CatalogAction, CatalogGateway, Clock, GatewayError, Notification, NotificationSink,
    SystemClock,
};
pub use store::{CatalogState, CatalogStore, FetchOutcome};

//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the catalog store and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod catalog_gateway;
mod clock;
mod notification_sink;

pub use catalog_gateway::{CatalogGateway, GatewayError};
pub use clock::{Clock, SystemClock};
pub use notification_sink::{CatalogAction, Notification, NotificationSink};

//! Adapters implementing the application ports.

mod notifiers;
mod reqwest_gateway;

pub use notifiers::{ChannelNotifier, TracingNotifier};
pub use reqwest_gateway::ReqwestCatalogGateway;

//! Operadoras Domain - Core catalog types
//!
//! This crate defines the data model of the operadoras catalog client.
//! All types here are pure Rust with no I/O dependencies.

pub mod cnpj;
pub mod despesa;
pub mod error;
pub mod failure;
pub mod operadora;
pub mod query;
pub mod statistics;

pub use cnpj::Cnpj;
pub use despesa::{Despesa, total_amount};
pub use error::{DomainError, DomainResult};
pub use failure::FailureKind;
pub use operadora::{Operadora, OperadoraPage};
pub use query::{DEFAULT_LIMIT, ListQuery};
pub use statistics::{
    ChartPoint, Statistics, TOP_RANK_SIZE, TopOperadora, derive_chart_series,
};

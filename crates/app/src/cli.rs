//! Command line surface.

use clap::{Parser, Subcommand};
use operadoras_infrastructure::{API_TIMEOUT_ENV, API_URL_ENV, ApiConfig, ConfigError};

/// Browse the operadoras catalog API from the terminal.
#[derive(Parser, Debug)]
#[command(name = "operadoras", version, about)]
pub struct Cli {
    /// Base URL of the catalog API.
    #[arg(long, env = API_URL_ENV)]
    pub api_url: Option<String>,
    /// Per-request timeout in milliseconds.
    #[arg(long, env = API_TIMEOUT_ENV)]
    pub timeout_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

/// One store action per subcommand.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List one page of operadoras.
    List {
        /// Page number, 1-based.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size.
        #[arg(long, default_value_t = operadoras_domain::DEFAULT_LIMIT)]
        limit: u32,
        /// Free-text search.
        #[arg(long, default_value = "")]
        search: String,
        /// Restrict to one state.
        #[arg(long)]
        uf: Option<String>,
        /// Restrict to one company name.
        #[arg(long)]
        razao_social: Option<String>,
    },
    /// Show aggregate statistics and the top-5 chart series.
    Stats,
    /// Show the expense records of one operadora.
    Despesas {
        /// Registry number of the operadora.
        cnpj: String,
    },
    /// Show one operadora with its expenses.
    Detail {
        /// Registry number of the operadora.
        cnpj: String,
    },
    /// Show the distinct states and company names.
    Filters,
    /// Probe the API health endpoint.
    Health,
}

impl Cli {
    /// Builds the API configuration from the flags, which clap already
    /// falls back to the environment for.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the URL or timeout is invalid.
    pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        ApiConfig::from_lookup(|key| match key {
            API_URL_ENV => self.api_url.clone(),
            API_TIMEOUT_ENV => self.timeout_ms.map(|ms| ms.to_string()),
            _ => None,
        })
    }
}

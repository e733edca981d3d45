//! Operadoras catalog client binary.
//!
//! Runs one store action per invocation and prints the resulting state
//! slice as JSON on stdout. Logs and failure notifications go to stderr.

mod cli;

use clap::Parser;
use operadoras_application::{CatalogStore, FetchOutcome, SystemClock};
use operadoras_domain::total_amount;
use operadoras_infrastructure::{ReqwestCatalogGateway, TracingNotifier};
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};

type Store = CatalogStore<ReqwestCatalogGateway, TracingNotifier, SystemClock>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.api_config()?;
    tracing::info!(
        base_url = %config.base_url,
        timeout_ms = config.timeout_ms,
        "operadoras v{}",
        env!("CARGO_PKG_VERSION")
    );

    let gateway = ReqwestCatalogGateway::new(&config)?;
    let store = CatalogStore::new(gateway, TracingNotifier, SystemClock);

    let output = run(&store, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(store: &Store, command: Command) -> Result<Value, Box<dyn std::error::Error>> {
    match command {
        Command::List {
            page,
            limit,
            search,
            uf,
            razao_social,
        } => {
            // Limit and filter changes reset the page, so the page goes last.
            store.set_limit(limit)?;
            store.set_search(search);
            store.set_uf(uf);
            store.set_razao_social(razao_social);
            store.set_page(page)?;
            expect_committed(store.fetch_operadoras().await, "list")?;

            let state = store.snapshot();
            Ok(json!({
                "page": state.page(),
                "limit": state.limit(),
                "total": state.total,
                "total_pages": state.total_pages(),
                "data": state.operadoras,
            }))
        }
        Command::Stats => {
            expect_committed(store.fetch_estatisticas().await, "stats")?;
            let state = store.snapshot();
            Ok(json!({
                "statistics": state.statistics,
                "chart": state.top_derived,
            }))
        }
        Command::Despesas { cnpj } => {
            let despesas = store.fetch_despesas(&cnpj).await;
            Ok(json!({
                "cnpj": cnpj,
                "total": total_amount(&despesas),
                "despesas": despesas,
            }))
        }
        Command::Detail { cnpj } => {
            expect_committed(store.select_operadora(&cnpj).await, "detail")?;
            let state = store.snapshot();
            Ok(json!({
                "operadora": state.selected,
                "despesas": state.despesas,
            }))
        }
        Command::Filters => {
            expect_committed(store.fetch_filter_options().await, "filters")?;
            let state = store.snapshot();
            Ok(json!({
                "ufs": state.ufs,
                "razoes_sociais": state.razoes_sociais,
            }))
        }
        Command::Health => {
            if store.check_health().await {
                Ok(json!({ "status": "ok" }))
            } else {
                Err("catalog API is unhealthy".into())
            }
        }
    }
}

fn expect_committed(outcome: FetchOutcome, command: &str) -> Result<(), Box<dyn std::error::Error>> {
    if outcome.is_committed() {
        Ok(())
    } else {
        Err(format!("{command} failed; see the log above").into())
    }
}

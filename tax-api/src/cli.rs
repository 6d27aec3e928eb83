use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tax_core::{
    DbConfig, ExpenseSheet, RepositoryError, TaxComputationRequest, TaxRepository, TaxService,
    net_savings,
};
use tracing::debug;

use crate::config::{AppConfig, ServerConfig};
use crate::logging::init_logging;
use crate::report::{TaxReport, country_listing};
use crate::server;
use crate::utils::{parse_decimal, parse_expense};

/// Progressive income tax and net savings for a salary in a given country.
///
/// Runs the HTTP API by default; `calculate` and `countries` work offline
/// against the same bracket store.
#[derive(Debug, Parser)]
#[command(name = "tax-api", version)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute tax and net savings for one salary
    Calculate(CalculateArgs),
    /// List the country catalog
    Countries,
}

/// Bracket store and logging options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Storage backend
    #[arg(long, env = "TAX_DB_BACKEND", default_value = "sqlite", global = true)]
    pub backend: String,

    /// Connection string; for SQLite a file path, a `sqlite:` URL or `:memory:`
    #[arg(long, env = "TAX_DB_URL", default_value = ":memory:", global = true)]
    pub db: String,

    /// Log level or EnvFilter directive; RUST_LOG takes precedence
    #[arg(long, env = "TAX_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl StoreArgs {
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.backend.clone(), self.db.clone())
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind: `localhost` or an IP literal
    #[arg(long, env = "TAX_API_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "TAX_API_PORT", default_value_t = 3000)]
    pub port: u16,
}

#[derive(Debug, Clone, Args)]
pub struct CalculateArgs {
    /// Two-letter country code, e.g. GB
    #[arg(long)]
    pub country: String,

    /// Annual gross salary; comma thousands separators are allowed
    #[arg(long)]
    pub salary: String,

    /// Recurring expense as category=amount[/monthly|/annual], repeatable
    #[arg(long = "expense", value_name = "CATEGORY=AMOUNT")]
    pub expenses: Vec<String>,
}

impl Cli {
    /// The configuration `serve` runs with.
    pub fn app_config(
        &self,
        serve: &ServeArgs,
    ) -> AppConfig {
        AppConfig {
            server: ServerConfig::new(serve.host.clone(), serve.port),
            db: self.store.db_config(),
            log_level: self.store.log_level.clone(),
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.store.log_level, cli.store.log_file.as_deref())?;

    match &cli.command {
        None => server::run(cli.app_config(&cli.serve)).await,
        Some(Command::Serve(serve)) => server::run(cli.app_config(serve)).await,
        Some(Command::Calculate(args)) => calculate(&cli.store, args).await,
        Some(Command::Countries) => countries(&cli.store).await,
    }
}

async fn calculate(
    store: &StoreArgs,
    args: &CalculateArgs,
) -> Result<()> {
    let income = parse_decimal(&args.salary).context("invalid --salary")?;
    let expenses = ExpenseSheet {
        expenses: args
            .expenses
            .iter()
            .map(|raw| parse_expense(raw))
            .collect::<Result<_, _>>()?,
    };
    debug!(expenses = expenses.expenses.len(), "parsed expenses");

    let repository = server::open_repository(&store.db_config()).await?;
    let country_code = args.country.trim().to_ascii_uppercase();
    let country = match repository.get_country(&country_code).await {
        Ok(country) => country,
        Err(RepositoryError::NotFound) => anyhow::bail!("unknown country '{country_code}'"),
        Err(err) => return Err(err.into()),
    };

    let service = TaxService::new(repository);
    let result = service
        .compute(&TaxComputationRequest::new(country_code, income))
        .await?;
    let savings = net_savings(income, &result, &expenses);

    println!(
        "{}",
        TaxReport {
            country: &country,
            income,
            result: &result,
            expenses: &expenses,
            savings: &savings,
        }
    );
    Ok(())
}

async fn countries(store: &StoreArgs) -> Result<()> {
    let repository = server::open_repository(&store.db_config()).await?;
    let countries = repository.list_countries().await?;
    println!("{}", country_listing(&countries));
    Ok(())
}

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_data::TaxBracketLoader;
use tax_db_sqlite::SqliteRepository;
use tracing_subscriber::EnvFilter;

/// Replace per-country income tax bracket tables from a CSV file.
///
/// Columns: `country_code,min_income,max_income,rate_percent`, one row per
/// bracket, an empty `max_income` marking a country's top bracket. Every
/// country named in the file gets its table replaced; the others are left
/// alone. A file with any bad schedule or unknown country changes nothing.
#[derive(Parser, Debug)]
#[command(name = "tax-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Bracket CSV to load
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite bracket store: a file path or `sqlite:` URL, created if missing
    #[arg(short, long, default_value = "brackets.db")]
    database: String,

    /// Create or upgrade the countries and tax_brackets tables first
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Seed the country catalog (and sample tables) from this directory
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Cannot open bracket store {}", args.database))?;

    if args.migrate {
        println!("Migrating bracket store schema...");
        repo.run_migrations()
            .await
            .context("Failed to migrate bracket store schema")?;
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Seeding country catalog from {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to seed from {}", seeds_dir.display()))?;
    }

    let file = File::open(&args.file)
        .with_context(|| format!("Cannot open bracket file {}", args.file.display()))?;
    let records = TaxBracketLoader::parse(file)
        .with_context(|| format!("Malformed bracket file {}", args.file.display()))?;

    for (country_code, brackets) in TaxBracketLoader::schedules(&records)? {
        let top = brackets.last().map(|b| b.rate_percent.normalize());
        println!(
            "  {country_code}: {} brackets, top rate {}%",
            brackets.len(),
            top.unwrap_or_default()
        );
    }

    let inserted = TaxBracketLoader::load(&repo, &records)
        .await
        .context("Bracket tables left unchanged")?;

    println!("Replaced tax bracket tables per country ({inserted} brackets).");

    Ok(())
}

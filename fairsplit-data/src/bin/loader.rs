use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fairsplit_data::HouseholdLoader;
use fairsplit_db_sqlite::SqliteRepository;
use tracing_subscriber::EnvFilter;

/// Load household data from a CSV file into the database.
///
/// Each row describes one household for one user and tax year:
/// - user_id, tax_year: identify the household (years 2020-2030)
/// - calculation_mode: `manual` (default) or `calculated`
/// - a_* / b_*: the partners' taxable income, tax class, assessed and
///   already paid amounts
/// - joint_*: the joint assessment
///
/// Existing households with the same user and year are replaced.
#[derive(Parser, Debug)]
#[command(name = "fairsplit-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing household data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:fairsplit.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:fairsplit.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database).await?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations().await?;
        println!("Migrations complete.");
    }

    println!("Loading households from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = HouseholdLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let saved = HouseholdLoader::load(&repo, &records)
        .await
        .context("Failed to load households into database")?;

    println!("Successfully loaded {} households into the database.", saved);

    Ok(())
}

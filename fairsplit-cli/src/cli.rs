use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::utils::parse_decimal;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Fair split of a couple's joint income tax assessment.
///
/// Apportions the joint liability in proportion to what each partner would
/// have owed when assessed individually, and compares each share with what
/// the partner has already paid.
#[derive(Debug, Parser)]
#[command(name = "fairsplit", version, about)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database backend to use (overrides the config file).
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database connection string (overrides the config file).
    /// For SQLite this is a file path (e.g. `fairsplit.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate the split for a household described in a TOML file.
    Calculate {
        /// Household file.
        #[arg(long)]
        input: PathBuf,

        /// Store the household under this user id.
        #[arg(long, requires = "store")]
        user: Option<String>,

        /// Store the household after a successful calculation.
        #[arg(long, requires = "user")]
        store: bool,

        /// Also write an HTML report to this path.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Estimate income tax and solidarity surcharge for a taxable income.
    Estimate {
        /// Taxable income, e.g. `50000` or `50,000.00`.
        #[arg(value_parser = parse_decimal, allow_negative_numbers = true)]
        income: Decimal,

        /// Use the joint-assessment schedule.
        #[arg(long)]
        joint: bool,
    },

    /// Print the individual and joint bracket schedules.
    Brackets,

    /// Recalculate and report on a stored household.
    Show {
        #[arg(long)]
        user: String,

        /// Tax year; defaults to the configured year.
        #[arg(long)]
        year: Option<i32>,

        /// Also write an HTML report to this path.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// List the tax years stored for a user.
    Years {
        #[arg(long)]
        user: String,
    },

    /// Delete a stored household.
    Delete {
        #[arg(long)]
        user: String,

        #[arg(long)]
        year: i32,
    },
}

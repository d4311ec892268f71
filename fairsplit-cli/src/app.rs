use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use fairsplit_core::calculations::{
    BracketSchedule, Calculation, CalculationError, ValidationError, run_calculation,
    validate_tax_year,
};
use fairsplit_core::db::RepositoryRegistry;
use fairsplit_core::{NewTaxHousehold, RepositoryError, TaxDataRepository, TaxHousehold};
use fairsplit_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::Command;
use crate::config::Config;
use crate::household_file::{self, Household, HouseholdFileError};
use crate::report::Report;
use crate::utils::{format_amount, format_factor};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error(transparent)]
    TaxYear(#[from] ValidationError),

    #[error(transparent)]
    HouseholdFile(#[from] HouseholdFileError),

    #[error("no household stored for user '{user_id}' and tax year {tax_year}")]
    NotFound { user_id: String, tax_year: i32 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("cannot write report '{path}': {source}")]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// Messages to show for input the user has to correct, one per problem.
    /// `None` for every other error.
    pub fn input_messages(&self) -> Option<Vec<String>> {
        match self {
            Self::Calculation(CalculationError::Invalid(errors))
            | Self::HouseholdFile(HouseholdFileError::Invalid(errors)) => {
                Some(errors.iter().map(ToString::to_string).collect())
            }
            Self::TaxYear(error) => Some(vec![error.to_string()]),
            _ => None,
        }
    }
}

/// Registry with every storage backend this binary ships with.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

async fn open_repository(config: &Config) -> Result<Box<dyn TaxDataRepository>, AppError> {
    let db_config = config.db_config();
    debug!("connecting to {} backend", db_config.backend);
    Ok(build_registry().create(&db_config).await?)
}

/// Validates and calculates a household, resolving its tax year against
/// `default_tax_year`.
pub fn calculate_household(
    household: &Household,
    default_tax_year: i32,
) -> Result<(i32, Calculation), AppError> {
    let tax_year = household.tax_year.unwrap_or(default_tax_year);
    validate_tax_year(tax_year)?;
    let calculation = run_calculation(
        &household.partner_a,
        &household.partner_b,
        &household.joint_data,
    )?;
    Ok((tax_year, calculation))
}

/// Stores the household as entered. Calculated-mode households keep their
/// mode, so estimates are refreshed whenever they are shown.
pub async fn store_household(
    repo: &dyn TaxDataRepository,
    user_id: &str,
    tax_year: i32,
    household: &Household,
) -> Result<TaxHousehold, AppError> {
    let saved = repo
        .save_household(NewTaxHousehold {
            user_id: user_id.to_string(),
            tax_year,
            partner_a: household.partner_a.clone(),
            partner_b: household.partner_b.clone(),
            joint_data: household.joint_data.clone(),
        })
        .await?;
    info!(user_id, tax_year, id = saved.id, "household stored");
    Ok(saved)
}

/// Loads a stored household and calculates it again.
pub async fn show_household(
    repo: &dyn TaxDataRepository,
    user_id: &str,
    tax_year: i32,
) -> Result<(TaxHousehold, Calculation), AppError> {
    let household = repo
        .get_household(user_id, tax_year)
        .await
        .map_err(|e| not_found_for(e, user_id, tax_year))?;
    let calculation = run_calculation(
        &household.partner_a,
        &household.partner_b,
        &household.joint_data,
    )?;
    Ok((household, calculation))
}

pub async fn delete_household(
    repo: &dyn TaxDataRepository,
    user_id: &str,
    tax_year: i32,
) -> Result<String, AppError> {
    repo.delete_household(user_id, tax_year)
        .await
        .map_err(|e| not_found_for(e, user_id, tax_year))?;
    info!(user_id, tax_year, "household deleted");
    Ok(format!("Deleted household of '{user_id}' for tax year {tax_year}.\n"))
}

pub async fn list_years(
    repo: &dyn TaxDataRepository,
    user_id: &str,
) -> Result<String, AppError> {
    let years = repo.list_tax_years(user_id).await?;
    if years.is_empty() {
        return Ok(format!("No households stored for '{user_id}'.\n"));
    }
    let mut out = String::new();
    for year in years {
        let _ = writeln!(out, "{year}");
    }
    Ok(out)
}

fn not_found_for(
    error: RepositoryError,
    user_id: &str,
    tax_year: i32,
) -> AppError {
    match error {
        RepositoryError::NotFound => AppError::NotFound {
            user_id: user_id.to_string(),
            tax_year,
        },
        other => AppError::Repository(other),
    }
}

pub fn write_html(
    path: &Path,
    report: &Report<'_>,
) -> Result<(), AppError> {
    std::fs::write(path, report.render_html()).map_err(|source| AppError::WriteReport {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "HTML report written");
    Ok(())
}

pub fn render_estimate(
    income: Decimal,
    joint: bool,
) -> String {
    let schedule = if joint {
        BracketSchedule::joint_2024()
    } else {
        BracketSchedule::individual_2024()
    };
    let estimate = schedule.estimate(income);
    let taxable_amount = (income - schedule.basic_allowance).max(Decimal::ZERO);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} assessment, taxable income {}",
        if joint { "Joint" } else { "Individual" },
        format_amount(income)
    );
    let _ = writeln!(out, "{:<22}{:>14}", "Income tax", format_amount(estimate.income_tax));
    let _ = writeln!(out, "{:<22}{:>14}", "Solidarity surcharge", format_amount(estimate.surcharge));
    let _ = writeln!(
        out,
        "{:<22}{:>14}",
        "Total",
        format_amount(estimate.income_tax + estimate.surcharge)
    );
    if estimate.income_tax > Decimal::ZERO {
        let _ = writeln!(
            out,
            "{:<22}{:>14}",
            "Rate applied",
            format_factor(schedule.marginal_rate(taxable_amount))
        );
    }
    out
}

pub fn render_brackets() -> String {
    let mut out = String::new();
    for (title, schedule) in [
        ("Individual assessment", BracketSchedule::individual_2024()),
        ("Joint assessment", BracketSchedule::joint_2024()),
    ] {
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "  Basic allowance: {}", format_amount(schedule.basic_allowance));
        for tier in schedule.tiers() {
            let range = match tier.up_to {
                Some(up_to) => format!("{} - {}", format_amount(tier.above), format_amount(up_to)),
                None => format!("above {}", format_amount(tier.above)),
            };
            let _ = writeln!(out, "  {:<28}{:>9}", range, format_factor(tier.rate));
        }
        let _ = writeln!(out, "  Solidarity surcharge: {}", format_factor(schedule.surcharge_rate));
        let _ = writeln!(out);
    }
    out
}

/// Runs one command and returns what it prints on stdout.
pub async fn run(
    command: Command,
    config: &Config,
) -> Result<String, AppError> {
    match command {
        Command::Calculate {
            input,
            user,
            store,
            html,
        } => {
            let household = household_file::load_from_file(&input)?;
            let (tax_year, calculation) = calculate_household(&household, config.default_tax_year)?;

            if let (true, Some(user_id)) = (store, user.as_deref()) {
                let repo = open_repository(config).await?;
                store_household(repo.as_ref(), user_id, tax_year, &household).await?;
            }

            let report = Report::new(tax_year, &calculation);
            if let Some(path) = &html {
                write_html(path, &report)?;
            }
            Ok(report.render_text())
        }
        Command::Estimate { income, joint } => Ok(render_estimate(income, joint)),
        Command::Brackets => Ok(render_brackets()),
        Command::Show { user, year, html } => {
            let tax_year = year.unwrap_or(config.default_tax_year);
            let repo = open_repository(config).await?;
            let (_, calculation) = show_household(repo.as_ref(), &user, tax_year).await?;

            let report = Report::new(tax_year, &calculation);
            if let Some(path) = &html {
                write_html(path, &report)?;
            }
            Ok(report.render_text())
        }
        Command::Years { user } => {
            let repo = open_repository(config).await?;
            list_years(repo.as_ref(), &user).await
        }
        Command::Delete { user, year } => {
            let repo = open_repository(config).await?;
            delete_household(repo.as_ref(), &user, year).await
        }
    }
}

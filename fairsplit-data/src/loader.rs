use std::io::Read;

use fairsplit_core::calculations::{validate_amounts, validate_partners, validate_tax_year};
use fairsplit_core::{
    CalculationMode, JointTaxData, NewTaxHousehold, PartnerId, RepositoryError, TaxDataRepository,
    TaxPartner,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading household data.
#[derive(Debug, Error)]
pub enum HouseholdLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Row {row}: invalid calculation mode '{value}' (expected 'manual' or 'calculated')")]
    InvalidCalculationMode { row: usize, value: String },

    #[error("Row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for HouseholdLoaderError {
    fn from(err: csv::Error) -> Self {
        HouseholdLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of the household CSV file.
///
/// One row holds a complete household for one user and year. Partner columns
/// carry an `a_` or `b_` prefix, joint columns a `joint_` prefix:
///
/// | column                                   | required | empty / missing |
/// |------------------------------------------|----------|-----------------|
/// | `user_id`, `tax_year`                    | yes      | error           |
/// | `calculation_mode`                       | no       | `manual`        |
/// | `a_taxable_income`, `b_taxable_income`   | yes      | 0 when empty    |
/// | `joint_taxable_income`                   | yes      | 0 when empty    |
/// | `*_tax_class`                            | no       | 1               |
/// | `*_name`, `*_tax_id`                     | no       | none            |
/// | every other amount column                | no       | 0               |
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HouseholdRecord {
    pub user_id: String,
    pub tax_year: i32,
    #[serde(default)]
    pub calculation_mode: Option<String>,

    #[serde(default)]
    pub a_name: Option<String>,
    #[serde(default)]
    pub a_tax_id: Option<String>,
    #[serde(deserialize_with = "amount")]
    pub a_taxable_income: Decimal,
    #[serde(default = "default_tax_class", deserialize_with = "tax_class")]
    pub a_tax_class: i32,
    #[serde(default, deserialize_with = "amount")]
    pub a_income_related_expenses: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub a_special_expenses: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub a_extraordinary_expenses: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub a_child_allowance: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub a_assessed_income_tax: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub a_assessed_surcharge: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub a_paid_wage_tax: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub a_paid_prepayment: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub a_paid_surcharge: Decimal,

    #[serde(default)]
    pub b_name: Option<String>,
    #[serde(default)]
    pub b_tax_id: Option<String>,
    #[serde(deserialize_with = "amount")]
    pub b_taxable_income: Decimal,
    #[serde(default = "default_tax_class", deserialize_with = "tax_class")]
    pub b_tax_class: i32,
    #[serde(default, deserialize_with = "amount")]
    pub b_income_related_expenses: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub b_special_expenses: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub b_extraordinary_expenses: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub b_child_allowance: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub b_assessed_income_tax: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub b_assessed_surcharge: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub b_paid_wage_tax: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub b_paid_prepayment: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub b_paid_surcharge: Decimal,

    #[serde(deserialize_with = "amount")]
    pub joint_taxable_income: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub joint_assessed_income_tax: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub joint_assessed_surcharge: Decimal,
}

fn default_tax_class() -> i32 {
    1
}

fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(Decimal::ZERO),
        Some(s) => s.parse::<Decimal>().map_err(serde::de::Error::custom),
    }
}

fn tax_class<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(default_tax_class()),
        Some(s) => s.parse::<i32>().map_err(serde::de::Error::custom),
    }
}

impl HouseholdRecord {
    /// Convert into a household ready for storage. `row` is the 1-based data
    /// row number used in error messages.
    ///
    /// Rows that the validator would reject are refused here, so stored data
    /// can always be calculated.
    pub fn to_household(
        &self,
        row: usize,
    ) -> Result<NewTaxHousehold, HouseholdLoaderError> {
        let user_id = self.user_id.trim();
        if user_id.is_empty() {
            return Err(HouseholdLoaderError::InvalidRecord {
                row,
                reason: "user_id must not be empty".to_string(),
            });
        }

        validate_tax_year(self.tax_year).map_err(|e| HouseholdLoaderError::InvalidRecord {
            row,
            reason: e.to_string(),
        })?;

        let calculation_mode = match self.calculation_mode.as_deref().map(str::trim) {
            None | Some("") => CalculationMode::Manual,
            Some(value) => CalculationMode::parse(&value.to_lowercase()).ok_or_else(|| {
                HouseholdLoaderError::InvalidCalculationMode {
                    row,
                    value: value.to_string(),
                }
            })?,
        };

        let partner_a = TaxPartner {
            name: self.a_name.clone(),
            tax_id: self.a_tax_id.clone(),
            taxable_income: self.a_taxable_income,
            tax_class: self.a_tax_class,
            income_related_expenses: self.a_income_related_expenses,
            special_expenses: self.a_special_expenses,
            extraordinary_expenses: self.a_extraordinary_expenses,
            child_allowance: self.a_child_allowance,
            assessed_income_tax: self.a_assessed_income_tax,
            assessed_surcharge: self.a_assessed_surcharge,
            paid_wage_tax: self.a_paid_wage_tax,
            paid_prepayment: self.a_paid_prepayment,
            paid_surcharge: self.a_paid_surcharge,
            ..TaxPartner::new(PartnerId::A)
        };
        let partner_b = TaxPartner {
            name: self.b_name.clone(),
            tax_id: self.b_tax_id.clone(),
            taxable_income: self.b_taxable_income,
            tax_class: self.b_tax_class,
            income_related_expenses: self.b_income_related_expenses,
            special_expenses: self.b_special_expenses,
            extraordinary_expenses: self.b_extraordinary_expenses,
            child_allowance: self.b_child_allowance,
            assessed_income_tax: self.b_assessed_income_tax,
            assessed_surcharge: self.b_assessed_surcharge,
            paid_wage_tax: self.b_paid_wage_tax,
            paid_prepayment: self.b_paid_prepayment,
            paid_surcharge: self.b_paid_surcharge,
            ..TaxPartner::new(PartnerId::B)
        };
        let joint_data = JointTaxData {
            joint_taxable_income: self.joint_taxable_income,
            joint_assessed_income_tax: self.joint_assessed_income_tax,
            joint_assessed_surcharge: self.joint_assessed_surcharge,
            calculation_mode,
        };

        let mut errors = validate_partners(&partner_a, &partner_b, &joint_data);
        errors.extend(validate_amounts(&partner_a, &partner_b, &joint_data));
        if !errors.is_empty() {
            let reason = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(HouseholdLoaderError::InvalidRecord { row, reason });
        }

        Ok(NewTaxHousehold {
            user_id: user_id.to_string(),
            tax_year: self.tax_year,
            partner_a,
            partner_b,
            joint_data,
        })
    }
}

/// Loader for household data from CSV files.
///
/// Reads CSV data and stores it through the [`TaxDataRepository`] trait, so
/// it works with any database backend.
pub struct HouseholdLoader;

impl HouseholdLoader {
    /// Parse household records from a CSV reader.
    ///
    /// The reader can be anything implementing `Read`, such as a file or a
    /// byte slice. Surrounding whitespace in headers and fields is ignored.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<HouseholdRecord>, HouseholdLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in csv_reader.deserialize() {
            let record: HouseholdRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Store the records, returning how many households were written.
    ///
    /// Every row is converted before anything is written, so a bad row leaves
    /// the store untouched. Households are upserted on `(user_id, tax_year)`,
    /// which makes loading the same file twice a no-op.
    pub async fn load<R: TaxDataRepository + ?Sized>(
        repo: &R,
        records: &[HouseholdRecord],
    ) -> Result<usize, HouseholdLoaderError> {
        let households = records
            .iter()
            .enumerate()
            .map(|(idx, record)| record.to_household(idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let mut saved = 0;
        for household in households {
            debug!(user_id = %household.user_id, tax_year = household.tax_year, "storing household");
            repo.save_household(household).await?;
            saved += 1;
        }

        info!(saved, "households loaded");
        Ok(saved)
    }
}

//! TOML household input for `fairsplit calculate`.
//!
//! ## Format
//!
//! ```toml
//! tax_year = 2024                 # optional, falls back to the config default
//! calculation_mode = "manual"     # or "calculated"; optional, default manual
//!
//! [partner_a]
//! name = "Alex"                   # optional
//! tax_id = "12 345 678 901"       # optional
//! taxable_income = 50000
//! tax_class = 4                   # optional, default 1
//! assessed_income_tax = 8000
//! assessed_surcharge = 440
//! paid_wage_tax = 6000
//! paid_prepayment = 1500
//! paid_surcharge = 330
//!
//! [partner_b]
//! taxable_income = 40000
//! # ...
//!
//! [joint]
//! taxable_income = 90000
//! assessed_income_tax = 13000
//! assessed_surcharge = 715
//! ```
//!
//! Amounts may be integers, floats or quoted strings (`"5877.86"`); quoted
//! strings are parsed exactly. Every amount except `taxable_income` is
//! optional and defaults to 0. Assessed amounts and deductions must not be
//! negative. Further optional partner keys:
//! `income_related_expenses`, `special_expenses`, `extraordinary_expenses`,
//! `child_allowance`.

use std::path::{Path, PathBuf};

use fairsplit_core::calculations::{ValidationError, validate_amounts};
use fairsplit_core::{CalculationMode, JointTaxData, PartnerId, TaxPartner};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HouseholdFileError {
    #[error("cannot read household file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid household file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid household file: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartnerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    pub taxable_income: Decimal,
    #[serde(default = "default_tax_class")]
    pub tax_class: i32,
    #[serde(default)]
    pub income_related_expenses: Decimal,
    #[serde(default)]
    pub special_expenses: Decimal,
    #[serde(default)]
    pub extraordinary_expenses: Decimal,
    #[serde(default)]
    pub child_allowance: Decimal,
    #[serde(default)]
    pub assessed_income_tax: Decimal,
    #[serde(default)]
    pub assessed_surcharge: Decimal,
    #[serde(default)]
    pub paid_wage_tax: Decimal,
    #[serde(default)]
    pub paid_prepayment: Decimal,
    #[serde(default)]
    pub paid_surcharge: Decimal,
}

fn default_tax_class() -> i32 {
    1
}

impl PartnerInput {
    fn into_partner(
        self,
        id: PartnerId,
    ) -> TaxPartner {
        TaxPartner {
            id,
            name: self.name,
            tax_id: self.tax_id,
            taxable_income: self.taxable_income,
            tax_class: self.tax_class,
            income_related_expenses: self.income_related_expenses,
            special_expenses: self.special_expenses,
            extraordinary_expenses: self.extraordinary_expenses,
            child_allowance: self.child_allowance,
            assessed_income_tax: self.assessed_income_tax,
            assessed_surcharge: self.assessed_surcharge,
            paid_wage_tax: self.paid_wage_tax,
            paid_prepayment: self.paid_prepayment,
            paid_surcharge: self.paid_surcharge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointInput {
    pub taxable_income: Decimal,
    #[serde(default)]
    pub assessed_income_tax: Decimal,
    #[serde(default)]
    pub assessed_surcharge: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HouseholdFile {
    #[serde(default)]
    pub tax_year: Option<i32>,
    #[serde(default)]
    pub calculation_mode: CalculationMode,
    pub partner_a: PartnerInput,
    pub partner_b: PartnerInput,
    pub joint: JointInput,
}

/// The calculation inputs read from a household file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Household {
    pub tax_year: Option<i32>,
    pub partner_a: TaxPartner,
    pub partner_b: TaxPartner,
    pub joint_data: JointTaxData,
}

impl From<HouseholdFile> for Household {
    fn from(file: HouseholdFile) -> Self {
        Self {
            tax_year: file.tax_year,
            partner_a: file.partner_a.into_partner(PartnerId::A),
            partner_b: file.partner_b.into_partner(PartnerId::B),
            joint_data: JointTaxData {
                joint_taxable_income: file.joint.taxable_income,
                joint_assessed_income_tax: file.joint.assessed_income_tax,
                joint_assessed_surcharge: file.joint.assessed_surcharge,
                calculation_mode: file.calculation_mode,
            },
        }
    }
}

/// Parses a household file. Negative assessed amounts or deductions reject
/// the whole file with [`HouseholdFileError::Invalid`].
pub fn load_from_str(input: &str) -> Result<Household, HouseholdFileError> {
    let file: HouseholdFile = toml::from_str(input)?;
    let household = Household::from(file);

    let errors = validate_amounts(&household.partner_a, &household.partner_b, &household.joint_data);
    if !errors.is_empty() {
        return Err(HouseholdFileError::Invalid(errors));
    }
    Ok(household)
}

pub fn load_from_file(path: &Path) -> Result<Household, HouseholdFileError> {
    let contents = std::fs::read_to_string(path).map_err(|source| HouseholdFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

#[cfg(test)]
mod tests {
    use fairsplit_core::calculations::AmountField;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const MINIMAL: &str = r#"
[partner_a]
taxable_income = 50000

[partner_b]
taxable_income = 40000

[joint]
taxable_income = 90000
"#;

    #[test]
    fn minimal_file_uses_defaults() {
        let household = load_from_str(MINIMAL).unwrap();

        assert_eq!(household.tax_year, None);
        assert_eq!(household.joint_data.calculation_mode, CalculationMode::Manual);
        assert_eq!(
            household.partner_a,
            TaxPartner {
                taxable_income: dec!(50000),
                ..TaxPartner::new(PartnerId::A)
            }
        );
        assert_eq!(household.partner_b.id, PartnerId::B);
        assert_eq!(household.partner_b.tax_class, 1);
        assert_eq!(household.joint_data.joint_assessed_income_tax, Decimal::ZERO);
    }

    #[test]
    fn reads_all_partner_fields() {
        let household = load_from_str(
            r#"
tax_year = 2024
calculation_mode = "calculated"

[partner_a]
name = "Alex"
tax_id = "12 345 678 901"
taxable_income = 50000
tax_class = 4
income_related_expenses = 1230
special_expenses = 800.5
extraordinary_expenses = 0
child_allowance = 3306
assessed_income_tax = 8000
assessed_surcharge = 440
paid_wage_tax = 6000
paid_prepayment = 1500
paid_surcharge = 330

[partner_b]
taxable_income = 40000

[joint]
taxable_income = 90000
assessed_income_tax = 13000
assessed_surcharge = 715
"#,
        )
        .unwrap();

        assert_eq!(household.tax_year, Some(2024));
        assert_eq!(household.joint_data.calculation_mode, CalculationMode::Calculated);
        let a = &household.partner_a;
        assert_eq!(a.label(), "Alex");
        assert_eq!(a.tax_id.as_deref(), Some("12 345 678 901"));
        assert_eq!(a.tax_class, 4);
        assert_eq!(a.special_expenses, dec!(800.5));
        assert_eq!(a.child_allowance, dec!(3306));
        assert_eq!(a.assessed_total(), dec!(8440));
        assert_eq!(a.paid_total(), dec!(7830));
        assert_eq!(household.joint_data.assessed_total(), dec!(13715));
    }

    #[test]
    fn quoted_amounts_are_exact() {
        let input = MINIMAL.replace(
            "taxable_income = 40000",
            "taxable_income = \"40000.01\"\npaid_surcharge = \"246.99\"",
        );

        let household = load_from_str(&input).unwrap();

        assert_eq!(household.partner_b.taxable_income, dec!(40000.01));
        assert_eq!(household.partner_b.paid_surcharge, dec!(246.99));
    }

    #[test]
    fn negative_amounts_are_read_for_the_validator() {
        let input = MINIMAL.replace("taxable_income = 50000", "taxable_income = -1000\ntax_class = 0");

        let household = load_from_str(&input).unwrap();

        assert_eq!(household.partner_a.taxable_income, dec!(-1000));
        assert_eq!(household.partner_a.tax_class, 0);
    }

    #[test]
    fn negative_joint_assessment_is_rejected() {
        let input = MINIMAL.replace(
            "taxable_income = 90000",
            "taxable_income = 90000\nassessed_income_tax = \"-100\"",
        );

        let err = load_from_str(&input).unwrap_err();

        let HouseholdFileError::Invalid(errors) = &err else {
            panic!("expected Invalid, got {err:?}");
        };
        assert_eq!(
            errors,
            &vec![ValidationError::NegativeJointAmount {
                field: AmountField::AssessedIncomeTax
            }]
        );
        assert_eq!(
            err.to_string(),
            "invalid household file: Joint assessed income tax must not be negative"
        );
    }

    #[test]
    fn negative_partner_deduction_is_rejected() {
        let input = MINIMAL.replace(
            "taxable_income = 40000",
            "taxable_income = 40000\nchild_allowance = -3306\nassessed_surcharge = -1",
        );

        let err = load_from_str(&input).unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid household file: Partner B: assessed solidarity surcharge must not be negative; \
             Partner B: child allowance must not be negative"
        );
    }

    #[test]
    fn missing_section_is_an_error() {
        let input = "[partner_a]\ntaxable_income = 1\n[partner_b]\ntaxable_income = 1\n";

        let err = load_from_str(input).unwrap_err();

        assert!(err.to_string().contains("joint"), "{err}");
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let input = format!("calculation_mode = \"guess\"\n{MINIMAL}");

        assert!(matches!(load_from_str(&input), Err(HouseholdFileError::Parse(_))));
    }

    #[test]
    fn misspelled_key_is_an_error() {
        let input = MINIMAL.replace("taxable_income = 90000", "taxable_income = 90000\nsurcharge = 715");

        let err = load_from_str(&input).unwrap_err();

        assert!(err.to_string().contains("surcharge"), "{err}");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_from_file(Path::new("/nonexistent/household.toml")).unwrap_err();

        assert!(matches!(err, HouseholdFileError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/household.toml"));
    }
}

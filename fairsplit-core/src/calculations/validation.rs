//! Advisory input checks run before a fair split is calculated.
//!
//! Every rule is checked and all problems are reported, in the order
//! partner A, partner B, joint data. The apportioner never re-checks these.

use std::fmt;
use std::ops::RangeInclusive;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{JointTaxData, PartnerId, TaxPartner};

/// Valid tax classes.
pub const TAX_CLASSES: RangeInclusive<i32> = 1..=6;

/// Assessment years accepted for storage.
pub const SUPPORTED_TAX_YEARS: RangeInclusive<i32> = 2020..=2030;

/// The already-paid amounts of a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    WageTax,
    Prepayment,
    Surcharge,
}

impl fmt::Display for PaymentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WageTax => "wage tax",
            Self::Prepayment => "prepayment",
            Self::Surcharge => "solidarity surcharge",
        })
    }
}

/// Assessed and deduction amounts of a household record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    AssessedIncomeTax,
    AssessedSurcharge,
    IncomeRelatedExpenses,
    SpecialExpenses,
    ExtraordinaryExpenses,
    ChildAllowance,
}

impl fmt::Display for AmountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AssessedIncomeTax => "assessed income tax",
            Self::AssessedSurcharge => "assessed solidarity surcharge",
            Self::IncomeRelatedExpenses => "income-related expenses",
            Self::SpecialExpenses => "special expenses",
            Self::ExtraordinaryExpenses => "extraordinary expenses",
            Self::ChildAllowance => "child allowance",
        })
    }
}

/// A single problem with the calculation inputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Partner {0}: taxable income must not be negative")]
    NegativeTaxableIncome(PartnerId),

    #[error("Partner {partner}: tax class must be between 1 and 6 (got {tax_class})")]
    InvalidTaxClass { partner: PartnerId, tax_class: i32 },

    #[error("Partner {partner}: already paid {field} must not be negative")]
    NegativePayment {
        partner: PartnerId,
        field: PaymentField,
    },

    #[error("Joint taxable income must not be negative")]
    NegativeJointTaxableIncome,

    #[error("Partner {partner}: {field} must not be negative")]
    NegativeAmount {
        partner: PartnerId,
        field: AmountField,
    },

    #[error("Joint {field} must not be negative")]
    NegativeJointAmount { field: AmountField },

    #[error("Tax year {0} is outside the supported range 2020-2030")]
    UnsupportedTaxYear(i32),
}

/// Checks both partners and the joint data, returning every problem found.
///
/// An empty list means the inputs are valid.
pub fn validate_partners(
    partner_a: &TaxPartner,
    partner_b: &TaxPartner,
    joint_data: &JointTaxData,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_partner(partner_a, &mut errors);
    validate_partner(partner_b, &mut errors);

    if joint_data.joint_taxable_income < Decimal::ZERO {
        errors.push(ValidationError::NegativeJointTaxableIncome);
    }

    errors
}

fn validate_partner(
    partner: &TaxPartner,
    errors: &mut Vec<ValidationError>,
) {
    if partner.taxable_income < Decimal::ZERO {
        errors.push(ValidationError::NegativeTaxableIncome(partner.id));
    }

    if !TAX_CLASSES.contains(&partner.tax_class) {
        errors.push(ValidationError::InvalidTaxClass {
            partner: partner.id,
            tax_class: partner.tax_class,
        });
    }

    let payments = [
        (PaymentField::WageTax, partner.paid_wage_tax),
        (PaymentField::Prepayment, partner.paid_prepayment),
        (PaymentField::Surcharge, partner.paid_surcharge),
    ];
    for (field, amount) in payments {
        if amount < Decimal::ZERO {
            errors.push(ValidationError::NegativePayment {
                partner: partner.id,
                field,
            });
        }
    }
}

/// Record-level checks applied when a household is read from a file or a
/// CSV row: assessed amounts and deductions must not be negative.
///
/// Kept apart from [`validate_partners`] because decoders reject such
/// records outright, before any calculation is attempted.
pub fn validate_amounts(
    partner_a: &TaxPartner,
    partner_b: &TaxPartner,
    joint_data: &JointTaxData,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for partner in [partner_a, partner_b] {
        let amounts = [
            (AmountField::AssessedIncomeTax, partner.assessed_income_tax),
            (AmountField::AssessedSurcharge, partner.assessed_surcharge),
            (AmountField::IncomeRelatedExpenses, partner.income_related_expenses),
            (AmountField::SpecialExpenses, partner.special_expenses),
            (AmountField::ExtraordinaryExpenses, partner.extraordinary_expenses),
            (AmountField::ChildAllowance, partner.child_allowance),
        ];
        for (field, amount) in amounts {
            if amount < Decimal::ZERO {
                errors.push(ValidationError::NegativeAmount {
                    partner: partner.id,
                    field,
                });
            }
        }
    }

    let joint_amounts = [
        (AmountField::AssessedIncomeTax, joint_data.joint_assessed_income_tax),
        (AmountField::AssessedSurcharge, joint_data.joint_assessed_surcharge),
    ];
    for (field, amount) in joint_amounts {
        if amount < Decimal::ZERO {
            errors.push(ValidationError::NegativeJointAmount { field });
        }
    }

    errors
}

/// Checks that `tax_year` is one the application stores.
pub fn validate_tax_year(tax_year: i32) -> Result<(), ValidationError> {
    if SUPPORTED_TAX_YEARS.contains(&tax_year) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedTaxYear(tax_year))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn valid_partner(id: PartnerId) -> TaxPartner {
        TaxPartner {
            taxable_income: dec!(50000),
            tax_class: 4,
            paid_wage_tax: dec!(6000),
            paid_prepayment: dec!(1500),
            paid_surcharge: dec!(330),
            ..TaxPartner::new(id)
        }
    }

    fn valid_joint() -> JointTaxData {
        JointTaxData {
            joint_taxable_income: dec!(90000),
            ..JointTaxData::default()
        }
    }

    fn messages(errors: &[ValidationError]) -> Vec<String> {
        errors.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn valid_inputs_produce_no_errors() {
        let errors = validate_partners(
            &valid_partner(PartnerId::A),
            &valid_partner(PartnerId::B),
            &valid_joint(),
        );

        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn zero_amounts_are_valid() {
        let errors = validate_partners(
            &TaxPartner::new(PartnerId::A),
            &TaxPartner::new(PartnerId::B),
            &JointTaxData::default(),
        );

        assert!(errors.is_empty());
    }

    #[test]
    fn negative_taxable_income_is_reported() {
        let mut a = valid_partner(PartnerId::A);
        a.taxable_income = dec!(-1000);

        let errors = validate_partners(&a, &valid_partner(PartnerId::B), &valid_joint());

        assert_eq!(
            messages(&errors),
            vec!["Partner A: taxable income must not be negative"]
        );
    }

    #[test]
    fn tax_class_out_of_range_is_reported_for_both_partners() {
        let mut a = valid_partner(PartnerId::A);
        a.tax_class = 0;
        let mut b = valid_partner(PartnerId::B);
        b.tax_class = 7;

        let errors = validate_partners(&a, &b, &valid_joint());

        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidTaxClass {
                    partner: PartnerId::A,
                    tax_class: 0
                },
                ValidationError::InvalidTaxClass {
                    partner: PartnerId::B,
                    tax_class: 7
                },
            ]
        );
    }

    #[test]
    fn tax_class_bounds_are_inclusive() {
        let mut a = valid_partner(PartnerId::A);
        a.tax_class = 1;
        let mut b = valid_partner(PartnerId::B);
        b.tax_class = 6;

        assert!(validate_partners(&a, &b, &valid_joint()).is_empty());
    }

    #[test]
    fn each_negative_payment_is_reported_separately() {
        let mut a = valid_partner(PartnerId::A);
        a.paid_wage_tax = dec!(-100);
        a.paid_prepayment = dec!(-1);
        a.paid_surcharge = dec!(-0.01);

        let errors = validate_partners(&a, &valid_partner(PartnerId::B), &valid_joint());

        assert_eq!(
            messages(&errors),
            vec![
                "Partner A: already paid wage tax must not be negative",
                "Partner A: already paid prepayment must not be negative",
                "Partner A: already paid solidarity surcharge must not be negative",
            ]
        );
    }

    #[test]
    fn negative_joint_income_is_reported() {
        let joint = JointTaxData {
            joint_taxable_income: dec!(-1000),
            ..JointTaxData::default()
        };

        let errors = validate_partners(
            &valid_partner(PartnerId::A),
            &valid_partner(PartnerId::B),
            &joint,
        );

        assert_eq!(errors, vec![ValidationError::NegativeJointTaxableIncome]);
    }

    #[test]
    fn errors_accumulate_in_partner_then_joint_order() {
        let mut a = valid_partner(PartnerId::A);
        a.taxable_income = dec!(-1000);
        a.tax_class = 0;
        a.paid_wage_tax = dec!(-100);
        let mut b = valid_partner(PartnerId::B);
        b.taxable_income = dec!(-500);
        b.tax_class = 7;
        b.paid_prepayment = dec!(-200);
        let joint = JointTaxData {
            joint_taxable_income: dec!(-1000),
            ..JointTaxData::default()
        };

        let errors = validate_partners(&a, &b, &joint);

        assert_eq!(
            messages(&errors),
            vec![
                "Partner A: taxable income must not be negative",
                "Partner A: tax class must be between 1 and 6 (got 0)",
                "Partner A: already paid wage tax must not be negative",
                "Partner B: taxable income must not be negative",
                "Partner B: tax class must be between 1 and 6 (got 7)",
                "Partner B: already paid prepayment must not be negative",
                "Joint taxable income must not be negative",
            ]
        );
    }

    #[test]
    fn negative_assessed_and_deduction_amounts_are_reported() {
        let mut a = valid_partner(PartnerId::A);
        a.assessed_income_tax = dec!(-1);
        a.child_allowance = dec!(-3306);
        let mut b = valid_partner(PartnerId::B);
        b.special_expenses = dec!(-0.01);
        let joint = JointTaxData {
            joint_assessed_income_tax: dec!(-100),
            ..valid_joint()
        };

        let errors = validate_amounts(&a, &b, &joint);

        assert_eq!(
            messages(&errors),
            vec![
                "Partner A: assessed income tax must not be negative",
                "Partner A: child allowance must not be negative",
                "Partner B: special expenses must not be negative",
                "Joint assessed income tax must not be negative",
            ]
        );
    }

    #[test]
    fn amount_checks_are_not_part_of_the_advisory_rules() {
        let joint = JointTaxData {
            joint_assessed_surcharge: dec!(-5),
            ..valid_joint()
        };

        assert!(
            validate_partners(&valid_partner(PartnerId::A), &valid_partner(PartnerId::B), &joint)
                .is_empty()
        );
        assert_eq!(
            validate_amounts(&valid_partner(PartnerId::A), &valid_partner(PartnerId::B), &joint),
            vec![ValidationError::NegativeJointAmount {
                field: AmountField::AssessedSurcharge
            }]
        );
    }

    #[test]
    fn tax_year_range() {
        assert_eq!(validate_tax_year(2020), Ok(()));
        assert_eq!(validate_tax_year(2030), Ok(()));
        assert_eq!(
            validate_tax_year(2019),
            Err(ValidationError::UnsupportedTaxYear(2019))
        );
        assert_eq!(
            validate_tax_year(2031),
            Err(ValidationError::UnsupportedTaxYear(2031))
        );
    }
}

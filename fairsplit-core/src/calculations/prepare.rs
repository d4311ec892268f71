//! Full calculation pipeline: validate, fill in estimates, apportion.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculations::estimator::{estimate_individual_tax, estimate_joint_tax};
use crate::calculations::fair_split::calculate_fair_split;
use crate::calculations::validation::{ValidationError, validate_partners};
use crate::models::{CalculationMode, FairSplitResult, JointTaxData, TaxPartner};

/// Errors that stop a calculation before the split is attempted.
///
/// An implausible split is not an error; it is reported inside
/// [`Calculation::result`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error("{} validation error(s): {}", .0.len(), join_messages(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Partner and joint records as fed to the apportioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedInputs {
    pub partner_a: TaxPartner,
    pub partner_b: TaxPartner,
    pub joint_data: JointTaxData,
}

/// The prepared inputs together with the split computed from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    pub inputs: PreparedInputs,
    pub result: FairSplitResult,
}

/// Returns copies of the inputs with assessed amounts filled in from the
/// bracket estimator when the joint data asks for calculated values.
/// In manual mode the copies are unchanged.
pub fn prepare_inputs(
    partner_a: &TaxPartner,
    partner_b: &TaxPartner,
    joint_data: &JointTaxData,
) -> PreparedInputs {
    match joint_data.calculation_mode {
        CalculationMode::Manual => PreparedInputs {
            partner_a: partner_a.clone(),
            partner_b: partner_b.clone(),
            joint_data: joint_data.clone(),
        },
        CalculationMode::Calculated => {
            let joint_estimate = estimate_joint_tax(joint_data.joint_taxable_income);
            PreparedInputs {
                partner_a: with_estimate(partner_a),
                partner_b: with_estimate(partner_b),
                joint_data: JointTaxData {
                    joint_assessed_income_tax: joint_estimate.income_tax,
                    joint_assessed_surcharge: joint_estimate.surcharge,
                    ..joint_data.clone()
                },
            }
        }
    }
}

fn with_estimate(partner: &TaxPartner) -> TaxPartner {
    let estimate = estimate_individual_tax(partner.taxable_income);
    TaxPartner {
        assessed_income_tax: estimate.income_tax,
        assessed_surcharge: estimate.surcharge,
        ..partner.clone()
    }
}

/// Validates, prepares and apportions in one step.
///
/// # Errors
///
/// Returns [`CalculationError::Invalid`] carrying every validation problem
/// when any input rule fails.
pub fn run_calculation(
    partner_a: &TaxPartner,
    partner_b: &TaxPartner,
    joint_data: &JointTaxData,
) -> Result<Calculation, CalculationError> {
    let errors = validate_partners(partner_a, partner_b, joint_data);
    if !errors.is_empty() {
        debug!(count = errors.len(), "rejecting invalid calculation input");
        return Err(CalculationError::Invalid(errors));
    }

    let inputs = prepare_inputs(partner_a, partner_b, joint_data);
    debug!(
        mode = joint_data.calculation_mode.as_str(),
        a_assessed = %inputs.partner_a.assessed_total(),
        b_assessed = %inputs.partner_b.assessed_total(),
        joint_assessed = %inputs.joint_data.assessed_total(),
        "prepared calculation inputs"
    );

    let result = calculate_fair_split(&inputs.partner_a, &inputs.partner_b, &inputs.joint_data);
    if result.plausible {
        info!(
            factor_a = %result.factor_a,
            factor_b = %result.factor_b,
            joint_tax_due = %result.joint_tax_due,
            "fair split calculated"
        );
    } else {
        warn!(
            reason = result.plausibility_error.as_deref().unwrap_or_default(),
            "fair split implausible"
        );
    }

    Ok(Calculation { inputs, result })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::PartnerId;

    fn partner(
        id: PartnerId,
        taxable_income: rust_decimal::Decimal,
    ) -> TaxPartner {
        TaxPartner {
            taxable_income,
            tax_class: 4,
            assessed_income_tax: dec!(1),
            assessed_surcharge: dec!(2),
            ..TaxPartner::new(id)
        }
    }

    fn joint(mode: CalculationMode) -> JointTaxData {
        JointTaxData {
            joint_taxable_income: dec!(120000),
            joint_assessed_income_tax: dec!(3),
            joint_assessed_surcharge: dec!(4),
            calculation_mode: mode,
        }
    }

    #[test]
    fn manual_mode_passes_values_through() {
        let a = partner(PartnerId::A, dec!(100000));
        let b = partner(PartnerId::B, dec!(20000));
        let j = joint(CalculationMode::Manual);

        let prepared = prepare_inputs(&a, &b, &j);

        assert_eq!(prepared.partner_a, a);
        assert_eq!(prepared.partner_b, b);
        assert_eq!(prepared.joint_data, j);
    }

    #[test]
    fn calculated_mode_overwrites_assessed_values() {
        let a = partner(PartnerId::A, dec!(100000));
        let b = partner(PartnerId::B, dec!(20000));
        let j = joint(CalculationMode::Calculated);

        let prepared = prepare_inputs(&a, &b, &j);

        assert_eq!(prepared.partner_a.assessed_income_tax, dec!(37126));
        assert_eq!(prepared.partner_a.assessed_surcharge, dec!(2042));
        assert_eq!(prepared.partner_b.assessed_income_tax, dec!(1175));
        assert_eq!(prepared.partner_b.assessed_surcharge, dec!(65));
        assert_eq!(prepared.joint_data.joint_assessed_income_tax, dec!(23230));
        assert_eq!(prepared.joint_data.joint_assessed_surcharge, dec!(1278));
        assert_eq!(prepared.joint_data.calculation_mode, CalculationMode::Calculated);

        // Original records are untouched.
        assert_eq!(a.assessed_income_tax, dec!(1));
        assert_eq!(j.joint_assessed_income_tax, dec!(3));
    }

    #[test]
    fn run_calculation_rejects_invalid_input() {
        let mut a = partner(PartnerId::A, dec!(-1000));
        a.tax_class = 0;
        a.paid_wage_tax = dec!(-100);
        let b = partner(PartnerId::B, dec!(20000));

        let result = run_calculation(&a, &b, &joint(CalculationMode::Manual));

        match result {
            Err(CalculationError::Invalid(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn run_calculation_with_estimates() {
        let a = partner(PartnerId::A, dec!(100000));
        let b = partner(PartnerId::B, dec!(20000));

        let calculation = run_calculation(&a, &b, &joint(CalculationMode::Calculated))
            .expect("valid input should calculate");

        // 39168 / 40408 and 1240 / 40408
        assert!(calculation.result.plausible);
        assert_eq!(calculation.result.factor_a, dec!(0.9693));
        assert_eq!(calculation.result.factor_b, dec!(0.0307));
        assert_eq!(calculation.result.joint_tax_due, dec!(24508));
    }

    #[test]
    fn run_calculation_returns_implausible_result_as_ok() {
        let a = partner(PartnerId::A, dec!(50000));
        let b = partner(PartnerId::B, dec!(40000));

        // Same tier for everyone: individual and joint totals coincide.
        let j = JointTaxData {
            joint_taxable_income: dec!(90000),
            ..joint(CalculationMode::Calculated)
        };

        let calculation = run_calculation(&a, &b, &j).expect("implausible split is not an error");

        assert!(!calculation.result.plausible);
        assert!(calculation.result.plausibility_error.is_some());
    }

    #[test]
    fn run_calculation_with_negative_joint_assessment_and_nothing_owed() {
        let j = JointTaxData {
            joint_assessed_income_tax: dec!(-100),
            ..JointTaxData::default()
        };

        let calculation = run_calculation(&TaxPartner::new(PartnerId::A), &TaxPartner::new(PartnerId::B), &j)
            .expect("advisory rules accept this input");

        assert!(!calculation.result.plausible);
        assert_eq!(calculation.result.factor_a, dec!(0));
        assert_eq!(calculation.result.joint_tax_due, dec!(0));
    }

    #[test]
    fn invalid_error_message_lists_every_problem() {
        let error = CalculationError::Invalid(vec![
            ValidationError::NegativeTaxableIncome(PartnerId::A),
            ValidationError::NegativeJointTaxableIncome,
        ]);

        assert_eq!(
            error.to_string(),
            "2 validation error(s): Partner A: taxable income must not be negative; \
             Joint taxable income must not be negative"
        );
    }
}

//! Fair-split calculation engine.
//!
//! This module provides the bracket estimator, the fair-split apportioner and
//! the advisory input validator, plus the pipeline that ties them together.
//! Everything here is pure and synchronous.

pub mod common;
pub mod estimator;
pub mod fair_split;
pub mod prepare;
pub mod validation;

pub use estimator::{BracketSchedule, BracketTier, estimate_individual_tax, estimate_joint_tax};
pub use fair_split::{calculate_fair_split, partner_summary};
pub use prepare::{Calculation, CalculationError, PreparedInputs, prepare_inputs, run_calculation};
pub use validation::{
    AmountField, PaymentField, ValidationError, validate_amounts, validate_partners,
    validate_tax_year,
};

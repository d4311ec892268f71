//! Fair split of a joint assessment between two partners.
//!
//! The joint liability is divided in proportion to what each partner would
//! have owed when assessed individually:
//!
//! | Value            | Calculation |
//! |------------------|-------------|
//! | Individual total | (A tax + A surcharge) + (B tax + B surcharge) |
//! | Joint total      | joint tax + joint surcharge |
//! | Plausible        | individual total > joint total and > 0 |
//! | Factor A / B     | partner total / individual total |
//! | Must now pay     | factor × joint total |
//! | Already paid     | wage tax + prepayment + surcharge paid |
//! | Difference       | must now pay − already paid |
//!
//! Factors are rounded to four places and amounts to cents, each field on its
//! own and only at the output. Intermediate values keep full precision, so the
//! rounded factors may sum to 1 ± 0.0002.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fairsplit_core::calculations::calculate_fair_split;
//! use fairsplit_core::{JointTaxData, PartnerId, TaxPartner};
//!
//! let mut a = TaxPartner::new(PartnerId::A);
//! a.assessed_income_tax = dec!(8000);
//! a.assessed_surcharge = dec!(440);
//!
//! let mut b = TaxPartner::new(PartnerId::B);
//! b.assessed_income_tax = dec!(6000);
//! b.assessed_surcharge = dec!(330);
//!
//! let joint = JointTaxData {
//!     joint_assessed_income_tax: dec!(13000),
//!     joint_assessed_surcharge: dec!(715),
//!     ..JointTaxData::default()
//! };
//!
//! let result = calculate_fair_split(&a, &b, &joint);
//!
//! assert!(result.plausible);
//! assert_eq!(result.factor_a, dec!(0.5714));
//! assert_eq!(result.partner_a.must_now_pay, dec!(7837.14));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{round_cents, round_dp};
use crate::models::{FairSplitResult, JointTaxData, PartnerShare, PartnerSummary, TaxPartner};

const FACTOR_DECIMAL_PLACES: u32 = 4;

/// Apportions the joint liability between `partner_a` and `partner_b`.
///
/// Never fails. When the individual totals do not strictly exceed the joint
/// total, or are not positive, the result is marked implausible and every
/// numeric field is zero.
pub fn calculate_fair_split(
    partner_a: &TaxPartner,
    partner_b: &TaxPartner,
    joint_data: &JointTaxData,
) -> FairSplitResult {
    let owed_a = partner_a.assessed_total();
    let owed_b = partner_b.assessed_total();
    let total_individual = owed_a + owed_b;
    let total_joint = joint_data.assessed_total();

    if total_individual <= total_joint {
        return FairSplitResult::implausible(format!(
            "Plausibility check failed: individual taxes ({:.2}) must exceed joint taxes ({:.2})",
            total_individual, total_joint
        ));
    }
    if total_individual <= Decimal::ZERO {
        return FairSplitResult::implausible(format!(
            "Plausibility check failed: individual taxes ({:.2}) must be positive",
            total_individual
        ));
    }

    let factor_a = owed_a / total_individual;
    let factor_b = owed_b / total_individual;

    FairSplitResult {
        plausible: true,
        plausibility_error: None,
        factor_a: round_dp(factor_a, FACTOR_DECIMAL_PLACES),
        factor_b: round_dp(factor_b, FACTOR_DECIMAL_PLACES),
        joint_tax_due: round_cents(total_joint),
        partner_a: partner_share(partner_a, factor_a, total_joint),
        partner_b: partner_share(partner_b, factor_b, total_joint),
    }
}

/// Computes one partner's share from the unrounded factor.
fn partner_share(
    partner: &TaxPartner,
    factor: Decimal,
    total_joint: Decimal,
) -> PartnerShare {
    let must_now_pay = factor * total_joint;
    let already_paid = partner.paid_total();

    PartnerShare {
        would_have_owed: round_cents(partner.assessed_total()),
        must_now_pay: round_cents(must_now_pay),
        already_paid: round_cents(already_paid),
        difference: round_cents(must_now_pay - already_paid),
    }
}

/// A partner's position under individual filing: what they owe against what
/// they have already paid.
pub fn partner_summary(partner: &TaxPartner) -> PartnerSummary {
    let would_have_owed = partner.assessed_total();
    let already_paid = partner.paid_total();

    PartnerSummary {
        would_have_owed: round_cents(would_have_owed),
        already_paid: round_cents(already_paid),
        difference: round_cents(would_have_owed - already_paid),
    }
}

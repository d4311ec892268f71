use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a fair split for one partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartnerShare {
    /// Assessed income tax plus surcharge under individual filing.
    pub would_have_owed: Decimal,
    /// Share of the joint liability attributed to this partner.
    pub must_now_pay: Decimal,
    /// Wage tax, prepayments and surcharge already paid.
    pub already_paid: Decimal,
    /// `must_now_pay - already_paid`; positive means the partner still owes.
    pub difference: Decimal,
}

/// Result of apportioning a joint assessment between two partners.
///
/// An implausible result is a normal return value, not an error: every
/// numeric field is zero and `plausibility_error` explains why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairSplitResult {
    pub plausible: bool,
    pub plausibility_error: Option<String>,
    pub factor_a: Decimal,
    pub factor_b: Decimal,
    pub joint_tax_due: Decimal,
    pub partner_a: PartnerShare,
    pub partner_b: PartnerShare,
}

impl FairSplitResult {
    pub fn implausible(reason: impl Into<String>) -> Self {
        Self {
            plausible: false,
            plausibility_error: Some(reason.into()),
            factor_a: Decimal::ZERO,
            factor_b: Decimal::ZERO,
            joint_tax_due: Decimal::ZERO,
            partner_a: PartnerShare::default(),
            partner_b: PartnerShare::default(),
        }
    }
}

/// A partner's stand-alone position without any joint assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerSummary {
    pub would_have_owed: Decimal,
    pub already_paid: Decimal,
    /// `would_have_owed - already_paid`.
    pub difference: Decimal,
}

/// Income tax and solidarity surcharge produced by the bracket estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxEstimate {
    pub income_tax: Decimal,
    pub surcharge: Decimal,
}

//! Bracket estimator for income tax and solidarity surcharge.
//!
//! This is a deliberately crude three-tier approximation of the progressive
//! schedule, meant to give a rough preview when no real assessment is
//! available yet. It is not the statutory formula.
//!
//! | Step | Calculation |
//! |------|-------------|
//! | 1    | Income ≤ 0 → no tax |
//! | 2    | Taxable amount = max(0, income − basic allowance) |
//! | 3    | Rate: entry up to the lower threshold, middle up to the upper threshold, top above |
//! | 4    | Income tax = round(taxable amount × rate) |
//! | 5    | Surcharge = round(income tax × 5.5%) |
//!
//! Thresholds compare with strict `>`, so an amount exactly on a threshold
//! takes the lower rate. Both results are whole currency units.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fairsplit_core::calculations::{estimate_individual_tax, estimate_joint_tax};
//!
//! let single = estimate_individual_tax(dec!(50000));
//! assert_eq!(single.income_tax, dec!(9215));
//! assert_eq!(single.surcharge, dec!(507));
//!
//! let joint = estimate_joint_tax(dec!(23208));
//! assert_eq!(joint.income_tax, dec!(0));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_whole;
use crate::models::TaxEstimate;

/// One tier of a [`BracketSchedule`], expressed in terms of the amount above
/// the basic allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTier {
    /// Exclusive lower bound of the tier.
    pub above: Decimal,
    /// Inclusive upper bound; `None` for the top tier.
    pub up_to: Option<Decimal>,
    pub rate: Decimal,
}

/// Allowance, thresholds and rates for one filing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSchedule {
    pub basic_allowance: Decimal,
    pub lower_threshold: Decimal,
    pub upper_threshold: Decimal,
    pub entry_rate: Decimal,
    pub middle_rate: Decimal,
    pub top_rate: Decimal,
    pub surcharge_rate: Decimal,
}

impl BracketSchedule {
    /// 2024 individual filing: basic allowance 11,604.
    pub fn individual_2024() -> Self {
        Self {
            basic_allowance: Decimal::from(11_604),
            lower_threshold: Decimal::from(10_908),
            upper_threshold: Decimal::from(62_809),
            ..Self::common_rates()
        }
    }

    /// 2024 joint filing: allowance and thresholds doubled (income splitting).
    pub fn joint_2024() -> Self {
        Self {
            basic_allowance: Decimal::from(23_208),
            lower_threshold: Decimal::from(21_816),
            upper_threshold: Decimal::from(125_618),
            ..Self::common_rates()
        }
    }

    fn common_rates() -> Self {
        Self {
            basic_allowance: Decimal::ZERO,
            lower_threshold: Decimal::ZERO,
            upper_threshold: Decimal::ZERO,
            entry_rate: Decimal::new(14, 2),
            middle_rate: Decimal::new(24, 2),
            top_rate: Decimal::new(42, 2),
            surcharge_rate: Decimal::new(55, 3),
        }
    }

    /// Estimates income tax and surcharge for `taxable_income`.
    ///
    /// Never fails: any input, including negative income, produces a
    /// (possibly zero) estimate.
    pub fn estimate(
        &self,
        taxable_income: Decimal,
    ) -> TaxEstimate {
        if taxable_income <= Decimal::ZERO {
            return TaxEstimate::default();
        }

        let taxable_amount = (taxable_income - self.basic_allowance).max(Decimal::ZERO);
        let income_tax = round_whole(taxable_amount * self.marginal_rate(taxable_amount));
        let surcharge = round_whole(income_tax * self.surcharge_rate);

        TaxEstimate {
            income_tax,
            surcharge,
        }
    }

    /// Rate applied to the whole taxable amount.
    pub fn marginal_rate(
        &self,
        taxable_amount: Decimal,
    ) -> Decimal {
        if taxable_amount > self.upper_threshold {
            self.top_rate
        } else if taxable_amount > self.lower_threshold {
            self.middle_rate
        } else {
            self.entry_rate
        }
    }

    /// The three tiers in ascending order.
    pub fn tiers(&self) -> [BracketTier; 3] {
        [
            BracketTier {
                above: Decimal::ZERO,
                up_to: Some(self.lower_threshold),
                rate: self.entry_rate,
            },
            BracketTier {
                above: self.lower_threshold,
                up_to: Some(self.upper_threshold),
                rate: self.middle_rate,
            },
            BracketTier {
                above: self.upper_threshold,
                up_to: None,
                rate: self.top_rate,
            },
        ]
    }
}

/// Estimates tax for one partner filing individually.
pub fn estimate_individual_tax(taxable_income: Decimal) -> TaxEstimate {
    BracketSchedule::individual_2024().estimate(taxable_income)
}

/// Estimates tax for a jointly assessed couple.
pub fn estimate_joint_tax(joint_taxable_income: Decimal) -> TaxEstimate {
    BracketSchedule::joint_2024().estimate(joint_taxable_income)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn estimate(
        income_tax: Decimal,
        surcharge: Decimal,
    ) -> TaxEstimate {
        TaxEstimate {
            income_tax,
            surcharge,
        }
    }

    // =========================================================================
    // non-positive income
    // =========================================================================

    #[test]
    fn individual_zero_income_is_untaxed() {
        assert_eq!(estimate_individual_tax(dec!(0)), TaxEstimate::default());
    }

    #[test]
    fn individual_negative_income_is_untaxed() {
        assert_eq!(estimate_individual_tax(dec!(-1000)), TaxEstimate::default());
    }

    #[test]
    fn joint_negative_income_is_untaxed() {
        assert_eq!(estimate_joint_tax(dec!(-1000)), TaxEstimate::default());
        assert_eq!(estimate_joint_tax(dec!(0)), TaxEstimate::default());
    }

    // =========================================================================
    // basic allowance
    // =========================================================================

    #[test]
    fn individual_at_basic_allowance_is_untaxed() {
        assert_eq!(estimate_individual_tax(dec!(11604)), estimate(dec!(0), dec!(0)));
    }

    #[test]
    fn individual_below_basic_allowance_is_untaxed() {
        assert_eq!(estimate_individual_tax(dec!(0.01)), estimate(dec!(0), dec!(0)));
        assert_eq!(estimate_individual_tax(dec!(11000)), estimate(dec!(0), dec!(0)));
    }

    #[test]
    fn joint_at_basic_allowance_is_untaxed() {
        assert_eq!(estimate_joint_tax(dec!(23208)), estimate(dec!(0), dec!(0)));
    }

    // =========================================================================
    // bracket boundaries
    // =========================================================================

    #[test]
    fn individual_lower_threshold_uses_entry_rate() {
        let result = estimate_individual_tax(dec!(11604) + dec!(10908));

        // 10908 * 0.14 = 1527.12 -> 1527; 1527 * 0.055 = 83.985 -> 84
        assert_eq!(result, estimate(dec!(1527), dec!(84)));
    }

    #[test]
    fn individual_just_above_lower_threshold_uses_middle_rate() {
        let result = estimate_individual_tax(dec!(11604) + dec!(10909));

        // 10909 * 0.24 = 2618.16 -> 2618; 2618 * 0.055 = 143.99 -> 144
        assert_eq!(result, estimate(dec!(2618), dec!(144)));
    }

    #[test]
    fn individual_upper_threshold_uses_middle_rate() {
        let result = estimate_individual_tax(dec!(11604) + dec!(62809));

        // 62809 * 0.24 = 15074.16 -> 15074; 15074 * 0.055 = 829.07 -> 829
        assert_eq!(result, estimate(dec!(15074), dec!(829)));
    }

    #[test]
    fn individual_above_upper_threshold_uses_top_rate() {
        let result = estimate_individual_tax(dec!(11604) + dec!(62809) + dec!(1));

        // 62810 * 0.42 = 26380.2 -> 26380; 26380 * 0.055 = 1450.9 -> 1451
        assert_eq!(result, estimate(dec!(26380), dec!(1451)));
    }

    #[test]
    fn joint_thresholds_are_doubled() {
        let schedule = BracketSchedule::joint_2024();

        assert_eq!(schedule.marginal_rate(dec!(21816)), dec!(0.14));
        assert_eq!(schedule.marginal_rate(dec!(21817)), dec!(0.24));
        assert_eq!(schedule.marginal_rate(dec!(125618)), dec!(0.24));
        assert_eq!(schedule.marginal_rate(dec!(125619)), dec!(0.42));
    }

    // =========================================================================
    // typical incomes
    // =========================================================================

    #[test]
    fn individual_typical_income() {
        // 50000 - 11604 = 38396; * 0.24 = 9215.04 -> 9215; * 0.055 = 506.825 -> 507
        assert_eq!(estimate_individual_tax(dec!(50000)), estimate(dec!(9215), dec!(507)));
    }

    #[test]
    fn joint_typical_income_rounds_midpoint_away_from_zero() {
        // 90000 - 23208 = 66792; * 0.24 = 16030.08 -> 16030; * 0.055 = 881.65 -> 882
        assert_eq!(estimate_joint_tax(dec!(90000)), estimate(dec!(16030), dec!(882)));
    }

    #[test]
    fn individual_large_income() {
        // 1000000 - 11604 = 988396; * 0.42 = 415126.32 -> 415126; * 0.055 = 22831.93 -> 22832
        assert_eq!(
            estimate_individual_tax(dec!(1000000)),
            estimate(dec!(415126), dec!(22832))
        );
    }

    #[test]
    fn joint_filing_is_cheaper_for_unequal_incomes() {
        let a = estimate_individual_tax(dec!(100000));
        let b = estimate_individual_tax(dec!(20000));
        let joint = estimate_joint_tax(dec!(120000));

        // A: 37126 + 2042, B: 1175 + 65, joint: 23230 + 1278
        assert_eq!(a.income_tax + a.surcharge + b.income_tax + b.surcharge, dec!(40408));
        assert_eq!(joint.income_tax + joint.surcharge, dec!(24508));
    }

    #[test]
    fn same_tier_incomes_give_no_joint_advantage() {
        let a = estimate_individual_tax(dec!(50000));
        let b = estimate_individual_tax(dec!(40000));
        let joint = estimate_joint_tax(dec!(90000));

        // Within one tier the approximation is linear, so the totals coincide.
        assert_eq!(
            a.income_tax + a.surcharge + b.income_tax + b.surcharge,
            joint.income_tax + joint.surcharge
        );
    }

    // =========================================================================
    // tiers
    // =========================================================================

    #[test]
    fn tiers_are_contiguous() {
        let tiers = BracketSchedule::individual_2024().tiers();

        assert_eq!(tiers[0].above, dec!(0));
        assert_eq!(tiers[0].up_to, Some(tiers[1].above));
        assert_eq!(tiers[1].up_to, Some(tiers[2].above));
        assert_eq!(tiers[2].up_to, None);
        assert_eq!(tiers[2].rate, dec!(0.42));
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether assessed amounts are entered by hand or derived from the
/// bracket estimator before the split is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    #[default]
    Manual,
    Calculated,
}

impl CalculationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Calculated => "calculated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "calculated" => Some(Self::Calculated),
            _ => None,
        }
    }
}

/// The couple's joint-assessment figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointTaxData {
    pub joint_taxable_income: Decimal,
    #[serde(default)]
    pub joint_assessed_income_tax: Decimal,
    #[serde(default)]
    pub joint_assessed_surcharge: Decimal,
    #[serde(default)]
    pub calculation_mode: CalculationMode,
}

impl JointTaxData {
    /// Joint assessed income tax plus joint assessed surcharge.
    pub fn assessed_total(&self) -> Decimal {
        self.joint_assessed_income_tax + self.joint_assessed_surcharge
    }
}

impl Default for JointTaxData {
    fn default() -> Self {
        Self {
            joint_taxable_income: Decimal::ZERO,
            joint_assessed_income_tax: Decimal::ZERO,
            joint_assessed_surcharge: Decimal::ZERO,
            calculation_mode: CalculationMode::Manual,
        }
    }
}

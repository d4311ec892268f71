use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartnerId {
    A,
    B,
}

impl PartnerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            _ => None,
        }
    }
}

impl std::fmt::Display for PartnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One spouse's tax figures for a single assessment year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPartner {
    pub id: PartnerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,

    // Inputs
    pub taxable_income: Decimal,
    pub tax_class: i32,

    // Deductions recorded alongside the income; not used by the calculation
    #[serde(default)]
    pub income_related_expenses: Decimal,
    #[serde(default)]
    pub special_expenses: Decimal,
    #[serde(default)]
    pub extraordinary_expenses: Decimal,
    #[serde(default)]
    pub child_allowance: Decimal,

    // Assessed amounts had the partner filed individually
    #[serde(default)]
    pub assessed_income_tax: Decimal,
    #[serde(default)]
    pub assessed_surcharge: Decimal,

    // Already paid
    #[serde(default)]
    pub paid_wage_tax: Decimal,
    #[serde(default)]
    pub paid_prepayment: Decimal,
    #[serde(default)]
    pub paid_surcharge: Decimal,
}

impl TaxPartner {
    /// An empty record for the given partner, tax class 1.
    pub fn new(id: PartnerId) -> Self {
        Self {
            id,
            name: None,
            tax_id: None,
            taxable_income: Decimal::ZERO,
            tax_class: 1,
            income_related_expenses: Decimal::ZERO,
            special_expenses: Decimal::ZERO,
            extraordinary_expenses: Decimal::ZERO,
            child_allowance: Decimal::ZERO,
            assessed_income_tax: Decimal::ZERO,
            assessed_surcharge: Decimal::ZERO,
            paid_wage_tax: Decimal::ZERO,
            paid_prepayment: Decimal::ZERO,
            paid_surcharge: Decimal::ZERO,
        }
    }

    /// Assessed income tax plus assessed surcharge.
    pub fn assessed_total(&self) -> Decimal {
        self.assessed_income_tax + self.assessed_surcharge
    }

    /// Wage tax, prepayments and surcharge already paid.
    pub fn paid_total(&self) -> Decimal {
        self.paid_wage_tax + self.paid_prepayment + self.paid_surcharge
    }

    /// Display label, e.g. `"Partner A"` or the partner's name when set.
    pub fn label(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Partner {}", self.id),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JointTaxData, TaxPartner};

/// A stored household: both partners and the joint figures for one user and
/// assessment year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxHousehold {
    pub id: i64,
    pub user_id: String,
    pub tax_year: i32,
    pub partner_a: TaxPartner,
    pub partner_b: TaxPartner,
    pub joint_data: JointTaxData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For saving households (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaxHousehold {
    pub user_id: String,
    pub tax_year: i32,
    pub partner_a: TaxPartner,
    pub partner_b: TaxPartner,
    pub joint_data: JointTaxData,
}

impl From<TaxHousehold> for NewTaxHousehold {
    fn from(household: TaxHousehold) -> Self {
        Self {
            user_id: household.user_id,
            tax_year: household.tax_year,
            partner_a: household.partner_a,
            partner_b: household.partner_b,
            joint_data: household.joint_data,
        }
    }
}

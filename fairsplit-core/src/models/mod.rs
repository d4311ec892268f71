mod fair_split_result;
mod joint_tax_data;
mod partner;
mod tax_household;

pub use fair_split_result::{FairSplitResult, PartnerShare, PartnerSummary, TaxEstimate};
pub use joint_tax_data::{CalculationMode, JointTaxData};
pub use partner::{PartnerId, TaxPartner};
pub use tax_household::{NewTaxHousehold, TaxHousehold};

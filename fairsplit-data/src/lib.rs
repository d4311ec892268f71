//! Bulk import of household records from CSV into any
//! [`fairsplit_core::TaxDataRepository`] backend.

pub mod loader;

pub use loader::{HouseholdLoader, HouseholdLoaderError, HouseholdRecord};

pub mod calculations;
pub mod db;
pub mod models;

pub use db::repository::{RepositoryError, TaxDataRepository};
pub use models::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewTaxHousehold, TaxHousehold};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for household records, one per user and assessment year.
#[async_trait]
pub trait TaxDataRepository: Send + Sync {
    async fn get_household(
        &self,
        user_id: &str,
        tax_year: i32,
    ) -> Result<TaxHousehold, RepositoryError>;

    /// Inserts the household or replaces the one stored for the same user
    /// and year.
    async fn save_household(
        &self,
        household: NewTaxHousehold,
    ) -> Result<TaxHousehold, RepositoryError>;

    async fn delete_household(
        &self,
        user_id: &str,
        tax_year: i32,
    ) -> Result<(), RepositoryError>;

    /// Years with stored data for `user_id`, newest first.
    async fn list_tax_years(&self, user_id: &str) -> Result<Vec<i32>, RepositoryError>;

    async fn list_households(
        &self,
        tax_year: Option<i32>,
    ) -> Result<Vec<TaxHousehold>, RepositoryError>;
}

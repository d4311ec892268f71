use async_trait::async_trait;
use fairsplit_core::db::{DbConfig, RepositoryFactory};
use fairsplit_core::{RepositoryError, TaxDataRepository};
use tracing::info;

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`fairsplit_core::db::RepositoryRegistry`] to make
/// the `"sqlite"` backend available:
///
/// ```rust,no_run
/// use fairsplit_core::db::RepositoryRegistry;
/// use fairsplit_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// Accepted connection strings: a bare file path (`fairsplit.db`, created
    /// if missing), `:memory:`, or any sqlx SQLite URL.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxDataRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(database = %config.connection_string, "sqlite repository ready");
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use fairsplit_core::db::{DbConfig, RepositoryFactory, RepositoryRegistry};
    use fairsplit_core::RepositoryError;

    use super::SqliteRepositoryFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_migrated_in_memory_repository() {
        let repo = SqliteRepositoryFactory
            .create(&DbConfig::default())
            .await
            .expect("failed to create in-memory repository");

        let years = repo
            .list_tax_years("user-1")
            .await
            .expect("tax_household table should exist");
        assert!(years.is_empty());
    }

    #[tokio::test]
    async fn registry_dispatches_to_sqlite() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(SqliteRepositoryFactory));

        let repo = registry.create(&DbConfig::default()).await;

        assert!(repo.is_ok(), "expected Ok, got {:#?}", repo.err());
    }

    #[tokio::test]
    async fn unopenable_path_is_a_connection_error() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: "/nonexistent-dir/sub/fairsplit.db".to_string(),
        };

        let result = SqliteRepositoryFactory.create(&config).await;

        assert!(
            matches!(result.err(), Some(RepositoryError::Connection(_))),
            "expected a connection error"
        );
    }
}

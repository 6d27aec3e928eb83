use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tax_core::db::{DbConfig, RepositoryError, RepositoryFactory, TaxRepository};

use crate::repository::SqliteRepository;

pub const SEEDS_DIR_ENV: &str = "TAX_DB_SQLITE_SEEDS_DIR";

/// Resolve the seeds directory at runtime so it works from the build tree and
/// from an installed binary.
///
/// Resolution order:
/// 1. `TAX_DB_SQLITE_SEEDS_DIR` if set.
/// 2. `./seeds` if it exists in the current working directory.
/// 3. `$CARGO_MANIFEST_DIR/seeds`.
pub fn seeds_dir() -> PathBuf {
    resolve_seeds_dir(std::env::var_os(SEEDS_DIR_ENV).map(PathBuf::from))
}

fn resolve_seeds_dir(env_override: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override {
        return dir;
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use tax_core::db::RepositoryRegistry;
/// use tax_db_sqlite::SqliteRepositoryFactory;
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

    /// Opens `config.connection_string` (see [`SqliteRepository::new`]),
    /// migrates it and loads the seed catalog from [`seeds_dir`].
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Arc<dyn TaxRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        repo.run_seeds(&seeds_dir())
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Arc::new(repo))
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{RepositoryError, TaxRepository};

/// Which bracket store backend to open, and how to reach it.
///
/// `connection_string` is opaque to this crate and handed to the backend
/// factory unchanged.
///
/// | backend    | connection_string examples                      |
/// |------------|-------------------------------------------------|
/// | `sqlite`   | `brackets.db`, `sqlite:brackets.db`, `:memory:` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl DbConfig {
    pub fn new(
        backend: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            connection_string: connection_string.into(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new("sqlite", ":memory:")
    }
}

/// Opens a [`TaxRepository`] for one backend. Backend crates export a unit
/// struct implementing this and the binary registers it at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase identifier, e.g. `"sqlite"`.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the store and return a repository whose country and
    /// bracket tables are ready to query. Migrations and seed data run here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Arc<dyn TaxRepository>, RepositoryError>;
}

/// Backend factories keyed by [`RepositoryFactory::backend_name`].
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registering a second factory under the same name replaces the first.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens the repository for `config.backend` (matched case-insensitively).
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no factory has that name; the
    ///   message lists the requested and the available backends.
    /// * Whatever the chosen factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Arc<dyn TaxRepository>, RepositoryError> {
        let requested = config.backend.trim().to_ascii_lowercase();
        let factory = self.factories.get(requested.as_str()).ok_or_else(|| {
            RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            ))
        })?;

        debug!(backend = %requested, "opening bracket store");
        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

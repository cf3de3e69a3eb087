//! SurrealDB connection management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use tracing::debug;

use crate::error::{PersistenceResult, from_surrealdb_error};

/// Configuration for the state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection URL (e.g., "mem://", "rocksdb://path", "ws://localhost:8000")
    #[serde(default = "default_url")]
    pub url: String,
    /// Namespace to use
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Database to use
    #[serde(default = "default_database")]
    pub database: String,
    /// Optional root credentials
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// Root credentials for authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl StoreConfig {
    /// Create an in-memory configuration for testing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "mem://".to_string(),
            namespace: default_namespace(),
            database: "test".to_string(),
            credentials: None,
        }
    }

    /// Set the connection URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set credentials for authentication.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            namespace: default_namespace(),
            database: default_database(),
            credentials: None,
        }
    }
}

fn default_url() -> String {
    "rocksdb://.subwatch/db".to_string()
}

fn default_namespace() -> String {
    "subwatch".to_string()
}

fn default_database() -> String {
    "production".to_string()
}

/// SurrealDB-backed state store.
///
/// Record operations live in [`crate::state_store`].
#[derive(Debug, Clone)]
pub struct SurrealStateStore {
    db: Arc<Surreal<Any>>,
    config: StoreConfig,
}

impl SurrealStateStore {
    /// Connect to the database with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or authentication fails.
    pub async fn connect(config: StoreConfig) -> PersistenceResult<Self> {
        let db = Surreal::<Any>::init();

        db.connect(&config.url)
            .await
            .map_err(from_surrealdb_error)?;

        if let Some(creds) = &config.credentials {
            db.signin(Root {
                username: &creds.username,
                password: &creds.password,
            })
            .await
            .map_err(from_surrealdb_error)?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(from_surrealdb_error)?;

        debug!(url = %config.url, namespace = %config.namespace, "Connected to state store");

        Ok(Self {
            db: Arc::new(db),
            config,
        })
    }

    /// Get a reference to the underlying database client.
    #[must_use]
    pub fn db(&self) -> &Surreal<Any> {
        &self.db
    }

    /// Get the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Check if the database is healthy.
    ///
    /// # Errors
    ///
    /// Returns an error if the health check fails.
    pub async fn health_check(&self) -> PersistenceResult<()> {
        self.db
            .query("INFO FOR DB")
            .await
            .map_err(from_surrealdb_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_in_memory() {
        let config = StoreConfig::in_memory();
        assert_eq!(config.url, "mem://");
        assert_eq!(config.namespace, "subwatch");
        assert_eq!(config.database, "test");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_store_config_default_is_on_disk() {
        let config = StoreConfig::default();
        assert!(config.url.starts_with("rocksdb://"));
        assert_eq!(config.database, "production");
    }

    #[test]
    fn test_store_config_builder() {
        let config = StoreConfig::in_memory()
            .with_url("ws://localhost:8000")
            .with_credentials("root", "secret");

        assert_eq!(config.url, "ws://localhost:8000");
        assert_eq!(
            config.credentials,
            Some(Credentials {
                username: "root".to_string(),
                password: "secret".to_string(),
            })
        );
    }

    #[test]
    fn test_store_config_partial_deserialize() -> Result<(), serde_json::Error> {
        let config: StoreConfig = serde_json::from_str(r#"{"url": "mem://"}"#)?;
        assert_eq!(config.url, "mem://");
        assert_eq!(config.namespace, "subwatch");
        Ok(())
    }

    #[tokio::test]
    async fn test_connect_in_memory_and_health_check() -> PersistenceResult<()> {
        let store = SurrealStateStore::connect(StoreConfig::in_memory()).await?;
        store.health_check().await?;
        assert_eq!(store.config().url, "mem://");
        Ok(())
    }
}

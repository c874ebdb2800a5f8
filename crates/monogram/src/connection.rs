//! Connection management
//!
//! A process talks to one or more MongoDB deployments through named aliases.
//! `ConnectionManager` holds a process-wide registry mapping alias to an
//! established [`Connection`]; document schemas reference connections by
//! alias only, so wiring happens once at startup.

use std::collections::HashMap;
use std::sync::{Arc, RwLock as StdRwLock};
use std::time::Duration;

use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Database};

use monogram_common::{MonogramError, Result};

/// Connection pool tuning passed through to the driver
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_pool_size: u32,
    pub max_pool_size: u32,
    pub max_idle_time: Duration,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
    pub app_name: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_pool_size: 0,
            max_pool_size: 10,
            max_idle_time: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
            server_selection_timeout: Duration::from_secs(30),
            app_name: None,
        }
    }
}

impl PoolConfig {
    fn apply(&self, options: &mut ClientOptions) {
        options.min_pool_size = Some(self.min_pool_size);
        options.max_pool_size = Some(self.max_pool_size);
        options.max_idle_time = Some(self.max_idle_time);
        options.connect_timeout = Some(self.connect_timeout);
        options.server_selection_timeout = Some(self.server_selection_timeout);
        if let Some(name) = &self.app_name {
            options.app_name = Some(name.clone());
        }
    }
}

/// Settings for one named connection
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// MongoDB connection string
    pub uri: String,
    /// Database name; falls back to the default database in the URI
    pub database: Option<String>,
    pub pool: PoolConfig,
}

impl ConnectionSettings {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: None,
            pool: PoolConfig::default(),
        }
    }

    pub fn database(mut self, name: impl Into<String>) -> Self {
        self.database = Some(name.into());
        self
    }

    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}

/// An established client bound to one database
#[derive(Debug, Clone)]
pub struct Connection {
    client: Client,
    database: Database,
    database_name: String,
}

impl Connection {
    /// Build a client from settings
    ///
    /// The driver connects lazily; this parses the URI and resolves the
    /// target database but does not reach the server. Use
    /// [`Connection::ping`] to verify reachability.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let mut options = ClientOptions::parse(&settings.uri).await?;
        settings.pool.apply(&mut options);
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

        let client = Client::with_options(options)?;
        let database = match &settings.database {
            Some(name) => client.database(name),
            None => client.default_database().ok_or_else(|| {
                MonogramError::Connection(
                    "no database name in settings and none in the connection URI".to_string(),
                )
            })?,
        };
        let database_name = database.name().to_string();
        Ok(Self {
            client,
            database,
            database_name,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> Database {
        self.database.clone()
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn collection(&self, name: &str) -> mongodb::Collection<bson::Document> {
        self.database.collection(name)
    }

    /// Round-trip to the server
    pub async fn ping(&self) -> Result<()> {
        self.database.run_command(bson::doc! { "ping": 1 }).await?;
        Ok(())
    }
}

static REGISTRY: StdRwLock<Option<HashMap<String, Arc<Connection>>>> = StdRwLock::new(None);

fn lock_error() -> MonogramError {
    MonogramError::Connection("connection registry lock poisoned".to_string())
}

/// Process-wide registry of named connections
pub struct ConnectionManager;

impl ConnectionManager {
    /// Register connections for several aliases at once
    ///
    /// Existing aliases are overwritten, which makes reconnection with new
    /// settings a plain re-`connect`.
    pub async fn connect(settings: HashMap<String, ConnectionSettings>) -> Result<()> {
        for (alias, settings) in settings {
            Self::connect_alias(&alias, &settings).await?;
        }
        Ok(())
    }

    /// Register a connection under a single alias
    pub async fn connect_alias(alias: &str, settings: &ConnectionSettings) -> Result<()> {
        let connection = Connection::connect(settings).await?;
        tracing::info!(
            alias = alias,
            database = connection.database_name(),
            "registered mongodb connection"
        );
        let mut registry = REGISTRY.write().map_err(|_| lock_error())?;
        registry
            .get_or_insert_with(HashMap::new)
            .insert(alias.to_string(), Arc::new(connection));
        Ok(())
    }

    /// Look up the connection registered under an alias
    pub fn get(alias: &str) -> Result<Arc<Connection>> {
        let registry = REGISTRY.read().map_err(|_| lock_error())?;
        registry
            .as_ref()
            .and_then(|map| map.get(alias))
            .cloned()
            .ok_or_else(|| {
                MonogramError::Connection(format!("no connection registered for alias '{}'", alias))
            })
    }

    /// Handle to the database behind an alias
    pub fn database(alias: &str) -> Result<Database> {
        Ok(Self::get(alias)?.database())
    }

    pub fn is_connected(alias: &str) -> bool {
        Self::get(alias).is_ok()
    }

    /// Drop the connection for an alias; returns whether it existed
    ///
    /// The driver closes pooled sockets when the last clone of the client is
    /// dropped.
    pub fn disconnect(alias: &str) -> bool {
        let Ok(mut registry) = REGISTRY.write() else {
            return false;
        };
        registry
            .as_mut()
            .and_then(|map| map.remove(alias))
            .is_some()
    }

    /// Drop every registered connection
    pub fn reset() {
        if let Ok(mut registry) = REGISTRY.write() {
            *registry = None;
        }
    }

    /// Verify the server behind an alias is reachable
    pub async fn ping(alias: &str) -> Result<()> {
        Self::get(alias)?.ping().await
    }

    /// Drop the database behind an alias (test teardown)
    pub async fn drop_database(alias: &str) -> Result<()> {
        let connection = Self::get(alias)?;
        tracing::warn!(
            alias = alias,
            database = connection.database_name(),
            "dropping database"
        );
        connection.database().drop().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ClientOptions::parse and Client::with_options do not touch the
    // network, so registry behavior is testable without a server. Each test
    // uses its own aliases and avoids reset() to stay independent.

    fn settings(db: Option<&str>) -> ConnectionSettings {
        let mut s = ConnectionSettings::new("mongodb://localhost:27017/fallback");
        if let Some(db) = db {
            s = s.database(db);
        }
        s
    }

    #[test]
    fn test_pool_config_defaults() {
        let pool = PoolConfig::default();
        assert_eq!(pool.max_pool_size, 10);
        assert_eq!(pool.max_idle_time, Duration::from_secs(300));
        assert!(pool.app_name.is_none());
    }

    #[tokio::test]
    async fn test_connect_uses_explicit_database() {
        let connection = Connection::connect(&settings(Some("explicit"))).await.unwrap();
        assert_eq!(connection.database_name(), "explicit");
    }

    #[tokio::test]
    async fn test_connect_falls_back_to_uri_database() {
        let connection = Connection::connect(&settings(None)).await.unwrap();
        assert_eq!(connection.database_name(), "fallback");
    }

    #[tokio::test]
    async fn test_connect_without_any_database_fails() {
        let s = ConnectionSettings::new("mongodb://localhost:27017");
        let err = Connection::connect(&s).await.unwrap_err();
        assert!(matches!(err, MonogramError::Connection(_)));
    }

    #[tokio::test]
    async fn test_registry_lookup_and_disconnect() {
        let alias = "conn-test-lookup";
        ConnectionManager::connect_alias(alias, &settings(Some("lookup")))
            .await
            .unwrap();
        assert!(ConnectionManager::is_connected(alias));
        assert_eq!(
            ConnectionManager::get(alias).unwrap().database_name(),
            "lookup"
        );
        assert!(ConnectionManager::disconnect(alias));
        assert!(!ConnectionManager::is_connected(alias));
        assert!(!ConnectionManager::disconnect(alias));
    }

    #[tokio::test]
    async fn test_registry_overwrites_alias() {
        let alias = "conn-test-overwrite";
        ConnectionManager::connect_alias(alias, &settings(Some("first")))
            .await
            .unwrap();
        ConnectionManager::connect_alias(alias, &settings(Some("second")))
            .await
            .unwrap();
        assert_eq!(
            ConnectionManager::get(alias).unwrap().database_name(),
            "second"
        );
        ConnectionManager::disconnect(alias);
    }

    #[test]
    fn test_unknown_alias_errors() {
        let err = ConnectionManager::get("conn-test-unknown").unwrap_err();
        assert!(matches!(err, MonogramError::Connection(_)));
        assert!(err.to_string().contains("conn-test-unknown"));
    }
}

//! The Redis extension: settings resolution, client binding, registration.

use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tokio::sync::{OnceCell, Semaphore};
use tracing::{debug, info};

use appredis_core::app::Application;
use appredis_core::config::Settings;

use crate::client::{BoundClient, POOL_CAPACITY, mask_redis_url};
use crate::connection::RedisConnection;
use crate::deprecation::Deprecation;
use crate::error::{ExtensionError, ExtensionResult};
use crate::keys::{NODES_KEY, SettingKeys};
use crate::nodes::parse_startup_nodes;
use crate::provider::{ClientProvider, SingleNodeMode};

/// Default configuration prefix.
pub const DEFAULT_CONFIG_PREFIX: &str = "REDIS";

/// URL used when `<PREFIX>_URL` is not set.
pub const DEFAULT_URL: &str = "redis://localhost:6379/0";

/// Name the extension registers under in the application's extension table.
pub const EXTENSION_KEY: &str = "redis";

/// Redis client attached to an [`Application`].
///
/// The provider and the bound client are each set once. After
/// [`initialize`](Self::initialize) the extension is found in the
/// application under [`EXTENSION_KEY`] and hands out delegating
/// connections through [`connection`](Self::connection).
#[derive(Debug)]
pub struct RedisExtension {
    /// Namespace for `<PREFIX>_URL` and `<PREFIX>_DATABASE`.
    config_prefix: String,
    /// Chosen client provider.
    provider: OnceLock<ClientProvider>,
    /// Client built during initialization.
    client: OnceLock<BoundClient>,
    /// Shared connection for lenient and cluster clients, opened on first use.
    connection: OnceCell<RedisConnection>,
    /// In-flight command gate shared by every connection clone.
    gate: Arc<Semaphore>,
}

/// URL and raw database value resolved from the settings map.
///
/// The database index is only parsed where a single-node client is built;
/// the cluster path ignores it.
#[derive(Debug, Clone, PartialEq)]
struct ConnectionSettings {
    url: String,
    database: Option<Value>,
}

impl ConnectionSettings {
    fn database_index(&self) -> ExtensionResult<Option<i64>> {
        self.database.as_ref().map(parse_database).transpose()
    }

    fn single_node(&self, mode: SingleNodeMode) -> ExtensionResult<BoundClient> {
        BoundClient::single_node(&self.url, self.database_index()?, mode)
    }
}

impl RedisExtension {
    /// Create an uninitialized extension reading keys under `config_prefix`.
    pub fn new(config_prefix: &str) -> Self {
        Self {
            config_prefix: config_prefix.to_string(),
            provider: OnceLock::new(),
            client: OnceLock::new(),
            connection: OnceCell::new(),
            gate: Arc::new(Semaphore::new(POOL_CAPACITY)),
        }
    }

    /// Create an extension and, when `app` is given, initialize it right away.
    pub fn create(
        app: Option<&mut Application>,
        strict: bool,
        config_prefix: &str,
    ) -> ExtensionResult<Arc<Self>> {
        let extension = Arc::new(Self::new(config_prefix));
        if let Some(app) = app {
            extension.initialize(app, strict)?;
        }
        Ok(extension)
    }

    /// Create an extension with a fixed provider.
    ///
    /// Fails with [`ExtensionError::MissingProvider`] when `provider` is
    /// `None`, before anything else happens. The provider is fixed before
    /// `initialize` runs, so `initialize` does not derive one from `strict`.
    pub fn from_custom_provider(
        provider: Option<ClientProvider>,
        app: Option<&mut Application>,
        config_prefix: &str,
    ) -> ExtensionResult<Arc<Self>> {
        let provider = provider.ok_or(ExtensionError::MissingProvider)?;

        let extension = Self::new(config_prefix);
        extension
            .provider
            .set(provider)
            .map_err(|_| ExtensionError::AlreadyInitialized)?;
        let extension = Arc::new(extension);

        if let Some(app) = app {
            extension.initialize(app, false)?;
        }
        Ok(extension)
    }

    /// Resolve settings, bind the client, and register in `app`.
    ///
    /// Steps, in order: fix the provider if none is set, read
    /// `<PREFIX>_URL` and `<PREFIX>_DATABASE`, build the client, then insert
    /// the extension into the application's extension table under
    /// [`EXTENSION_KEY`]. Errors from building the client are returned
    /// as-is and leave the application untouched.
    pub fn initialize(self: &Arc<Self>, app: &mut Application, strict: bool) -> ExtensionResult<()> {
        if self.client.get().is_some() {
            return Err(ExtensionError::AlreadyInitialized);
        }

        let provider = self
            .provider
            .get_or_init(|| ClientProvider::SingleNode(SingleNodeMode::from_strict(strict)));
        debug!(prefix = %self.config_prefix, provider = provider.name(), "Provider resolved");

        let resolved = self.resolve_connection_settings(app.settings());
        let client = self.build_client(&resolved, app.settings())?;

        info!(
            app = app.name(),
            prefix = %self.config_prefix,
            provider = provider.name(),
            url = %mask_redis_url(&resolved.url),
            cluster = client.is_cluster(),
            "Redis extension initialized"
        );

        self.client
            .set(client)
            .map_err(|_| ExtensionError::AlreadyInitialized)?;
        app.extensions_mut().insert(EXTENSION_KEY, Arc::clone(self));
        Ok(())
    }

    fn resolve_connection_settings(&self, settings: &Settings) -> ConnectionSettings {
        let keys = SettingKeys::for_prefix(&self.config_prefix);

        let url = settings.get_str_or(&keys.url, DEFAULT_URL);

        let database = settings.get_value(&keys.database).cloned();
        if database.is_some() {
            Deprecation::DatabaseSetting.emit();
        }

        ConnectionSettings { url, database }
    }

    fn build_client(
        &self,
        resolved: &ConnectionSettings,
        settings: &Settings,
    ) -> ExtensionResult<BoundClient> {
        let provider = self
            .provider
            .get()
            .ok_or(ExtensionError::UnresolvedProvider)?;

        if let Some(mode) = provider.single_node_mode() {
            return resolved.single_node(mode);
        }

        match parse_startup_nodes(settings.get_value(NODES_KEY))? {
            None => {
                debug!(
                    provider = provider.name(),
                    "No startup nodes configured, falling back to a single-node client"
                );
                resolved.single_node(SingleNodeMode::Lenient)
            }
            Some(nodes) => {
                debug!(
                    provider = provider.name(),
                    nodes = nodes.len(),
                    "Building client from startup nodes"
                );
                match provider {
                    ClientProvider::Custom(factory) => factory.build(&nodes, POOL_CAPACITY),
                    _ => BoundClient::cluster(&nodes),
                }
            }
        }
    }

    /// Configuration prefix.
    pub fn config_prefix(&self) -> &str {
        &self.config_prefix
    }

    /// The chosen provider, once resolved.
    pub fn provider(&self) -> Option<&ClientProvider> {
        self.provider.get()
    }

    /// Whether a client has been bound.
    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }

    /// The bound client.
    pub fn client(&self) -> ExtensionResult<&BoundClient> {
        self.client.get().ok_or(ExtensionError::NotInitialized)
    }

    /// Maximum number of in-flight commands.
    pub fn max_connections(&self) -> usize {
        POOL_CAPACITY
    }

    /// A delegating connection to the bound client.
    ///
    /// Strict single-node clients get a fresh multiplexed connection per
    /// call, since a multiplexed connection never reconnects after the
    /// socket drops. Lenient and cluster connections reconnect on their own
    /// and are opened once, then shared. A failed open is returned unchanged.
    pub async fn connection(&self) -> ExtensionResult<RedisConnection> {
        let client = self.client()?;
        if client.mode() == Some(SingleNodeMode::Strict) {
            return RedisConnection::open(client, Arc::clone(&self.gate)).await;
        }

        let connection = self
            .connection
            .get_or_try_init(|| RedisConnection::open(client, Arc::clone(&self.gate)))
            .await?;
        Ok(connection.clone())
    }

    /// `PING` the server through the delegating connection.
    pub async fn health_check(&self) -> ExtensionResult<bool> {
        let mut connection = self.connection().await?;
        let pong = connection.ping().await?;
        Ok(pong == "PONG")
    }
}

/// Integers and numeric strings are accepted; anything else, including a
/// negative index, is `InvalidDatabase`.
fn parse_database(value: &Value) -> ExtensionResult<i64> {
    let index = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    index
        .filter(|db| *db >= 0)
        .ok_or_else(|| ExtensionError::InvalidDatabase(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(settings: Settings) -> Application {
        Application::new("test", settings)
    }

    #[test]
    fn test_resolve_defaults() {
        let extension = RedisExtension::new(DEFAULT_CONFIG_PREFIX);
        let resolved = extension.resolve_connection_settings(&Settings::new());
        assert_eq!(
            resolved,
            ConnectionSettings {
                url: DEFAULT_URL.to_string(),
                database: None,
            }
        );
    }

    #[test]
    fn test_resolve_uses_prefix() {
        let settings = Settings::new()
            .with("REDIS_URL", "redis://ignored:6379/0")
            .with("CACHE_URL", "redis://cache:6380/1")
            .with("CACHE_DATABASE", "4");
        let extension = RedisExtension::new("CACHE");
        let resolved = extension.resolve_connection_settings(&settings);
        assert_eq!(resolved.url, "redis://cache:6380/1");
        assert_eq!(resolved.database_index().expect("numeric"), Some(4));
    }

    #[test]
    fn test_non_numeric_database_fails_only_when_parsed() {
        let settings = Settings::new().with("REDIS_DATABASE", "primary");
        let extension = RedisExtension::new(DEFAULT_CONFIG_PREFIX);
        let resolved = extension.resolve_connection_settings(&settings);
        assert!(matches!(
            resolved.database_index(),
            Err(ExtensionError::InvalidDatabase(_))
        ));
    }

    #[test]
    fn test_parse_database() {
        assert_eq!(parse_database(&Value::from(3)).expect("int"), 3);
        assert_eq!(parse_database(&Value::from(" 2 ")).expect("string"), 2);
        assert!(parse_database(&Value::from(-1)).is_err());
        assert!(parse_database(&Value::from(true)).is_err());
    }

    #[test]
    fn test_build_without_provider_is_unresolved() {
        let extension = RedisExtension::new(DEFAULT_CONFIG_PREFIX);
        let resolved = ConnectionSettings {
            url: DEFAULT_URL.to_string(),
            database: None,
        };
        assert!(matches!(
            extension.build_client(&resolved, &Settings::new()),
            Err(ExtensionError::UnresolvedProvider)
        ));
    }

    #[cfg(feature = "single-node")]
    #[test]
    fn test_failed_build_leaves_app_untouched() {
        let mut app = app(Settings::new().with("REDIS_URL", "not a url"));
        let extension = Arc::new(RedisExtension::new(DEFAULT_CONFIG_PREFIX));

        let err = extension.initialize(&mut app, false).expect_err("bad url");
        assert!(matches!(err, ExtensionError::Redis(_)));
        assert!(app.extensions().is_none());
        assert!(!extension.is_initialized());
        // The provider choice survives the failed attempt.
        assert!(extension.provider().is_some());
    }

    #[tokio::test]
    async fn test_connection_before_initialize() {
        let extension = RedisExtension::new(DEFAULT_CONFIG_PREFIX);
        assert!(matches!(
            extension.connection().await,
            Err(ExtensionError::NotInitialized)
        ));
    }
}

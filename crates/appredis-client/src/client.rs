//! The bound client and its construction.
//!
//! Construction never touches the network: `redis::Client::open` and
//! `ClusterClient::new` only validate their input. Connections are
//! established when [`RedisConnection`](crate::connection::RedisConnection)
//! is opened.

use std::fmt;

use redis::cluster::ClusterClient;

use crate::error::{ExtensionError, ExtensionResult};
use crate::provider::SingleNodeMode;

/// Maximum number of in-flight commands per extension.
pub const POOL_CAPACITY: usize = 128;

/// A constructed Redis client.
#[derive(Clone)]
pub enum BoundClient {
    /// Single-server client.
    #[cfg(feature = "single-node")]
    SingleNode {
        /// Underlying client.
        client: redis::Client,
        /// Strict or lenient connection handling.
        mode: SingleNodeMode,
        /// Effective URL, database override applied.
        url: String,
        /// Database override, if one was configured.
        database: Option<i64>,
    },
    /// Redis Cluster client.
    Cluster {
        /// Underlying client.
        client: ClusterClient,
        /// Startup nodes used for topology discovery.
        startup_nodes: Vec<String>,
    },
}

impl BoundClient {
    /// Build a single-node client from `url`, applying the database override.
    #[cfg(feature = "single-node")]
    pub fn single_node(
        url: &str,
        database: Option<i64>,
        mode: SingleNodeMode,
    ) -> ExtensionResult<Self> {
        let url = apply_database(url, database)?;
        let client = redis::Client::open(url.as_str())?;
        Ok(Self::SingleNode {
            client,
            mode,
            url,
            database,
        })
    }

    /// Single-node support is compiled out.
    #[cfg(not(feature = "single-node"))]
    pub fn single_node(
        _url: &str,
        _database: Option<i64>,
        _mode: SingleNodeMode,
    ) -> ExtensionResult<Self> {
        Err(ExtensionError::MissingDependency("single-node"))
    }

    /// Build a cluster client bootstrapped from `startup_nodes`.
    pub fn cluster(startup_nodes: &[String]) -> ExtensionResult<Self> {
        let client = ClusterClient::new(startup_nodes.to_vec())?;
        Ok(Self::Cluster {
            client,
            startup_nodes: startup_nodes.to_vec(),
        })
    }

    /// Whether this is a cluster client.
    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster { .. })
    }

    /// Single-node mode, `None` for cluster clients.
    pub fn mode(&self) -> Option<SingleNodeMode> {
        match self {
            #[cfg(feature = "single-node")]
            Self::SingleNode { mode, .. } => Some(*mode),
            Self::Cluster { .. } => None,
        }
    }

    /// Effective connection URL, `None` for cluster clients.
    pub fn url(&self) -> Option<&str> {
        match self {
            #[cfg(feature = "single-node")]
            Self::SingleNode { url, .. } => Some(url),
            Self::Cluster { .. } => None,
        }
    }

    /// Database override, `None` for cluster clients or when unset.
    pub fn database(&self) -> Option<i64> {
        match self {
            #[cfg(feature = "single-node")]
            Self::SingleNode { database, .. } => *database,
            Self::Cluster { .. } => None,
        }
    }

    /// Startup nodes, `None` for single-node clients.
    pub fn startup_nodes(&self) -> Option<&[String]> {
        match self {
            #[cfg(feature = "single-node")]
            Self::SingleNode { .. } => None,
            Self::Cluster { startup_nodes, .. } => Some(startup_nodes),
        }
    }
}

impl fmt::Debug for BoundClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "single-node")]
            Self::SingleNode {
                mode, url, database, ..
            } => f
                .debug_struct("SingleNode")
                .field("mode", mode)
                .field("url", &mask_redis_url(url))
                .field("database", database)
                .finish(),
            Self::Cluster { startup_nodes, .. } => f
                .debug_struct("Cluster")
                .field(
                    "startup_nodes",
                    &startup_nodes
                        .iter()
                        .map(|node| mask_redis_url(node))
                        .collect::<Vec<_>>(),
                )
                .finish(),
        }
    }
}

/// Put the database index into the URL.
///
/// TCP URLs carry the index as the path (`redis://host:6379/3`), unix
/// socket URLs as the `db` query parameter.
fn apply_database(url: &str, database: Option<i64>) -> ExtensionResult<String> {
    let Some(db) = database else {
        return Ok(url.to_string());
    };
    if db < 0 {
        return Err(ExtensionError::InvalidDatabase(db.to_string()));
    }

    let mut parsed = url::Url::parse(url)?;
    if parsed.scheme().ends_with("unix") {
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| key != "db")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair("db", &db.to_string());
    } else {
        parsed.set_path(&format!("/{db}"));
    }
    Ok(parsed.to_string())
}

/// Mask password in Redis URL for safe logging.
///
/// The URL is parsed so the userinfo ends at the last `@`, which keeps a
/// password containing `@` from leaking. Unparseable input with userinfo is
/// masked up to that last `@`.
pub fn mask_redis_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_none() || parsed.set_password(Some("****")).is_err() {
                return url.to_string();
            }
            parsed.to_string()
        }
        Err(_) => match (url.find("://"), url.rfind('@')) {
            (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
                format!("{}****@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
            }
            _ => url.to_string(),
        },
    }
}

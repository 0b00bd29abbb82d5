//! Settings key construction.
//!
//! Per-instance keys are namespaced by the configuration prefix
//! (`REDIS_URL`, `CACHE_URL`, ...). The cluster node list is always read
//! from the unprefixed [`NODES_KEY`].

/// Cluster startup nodes. Not namespaced by the prefix.
pub const NODES_KEY: &str = "REDIS_NODES";

/// Keys one extension instance reads from the settings map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingKeys {
    /// `<PREFIX>_URL`.
    pub url: String,
    /// `<PREFIX>_DATABASE`.
    pub database: String,
}

impl SettingKeys {
    /// Build the key set for a configuration prefix.
    pub fn for_prefix(prefix: &str) -> Self {
        Self {
            url: format!("{prefix}_URL"),
            database: format!("{prefix}_DATABASE"),
        }
    }
}

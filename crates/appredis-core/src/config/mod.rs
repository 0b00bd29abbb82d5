//! Application settings.
//!
//! Extensions read their configuration from a flat key/value map in the
//! style of `REDIS_URL` or `CACHE_REDIS_DATABASE`. The map is loaded with the
//! `config` crate from an optional TOML file, an environment overlay, and
//! environment variables prefixed with `APP_`.

pub mod logging;

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use self::logging::LoggingConfig;

use crate::result::AppResult;

/// Environment variable prefix for settings overrides (`APP_REDIS_URL`).
pub const ENV_PREFIX: &str = "APP";

/// Keys whose environment values are split on commas into lists.
const LIST_KEYS: &[&str] = &["redis_nodes"];

/// Flat, case-insensitive application settings.
///
/// Keys are normalised to upper case on insertion and lookup, so
/// `redis_url` from an environment variable and `REDIS_URL` from a file
/// address the same entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: HashMap<String, Value>,
}

impl Settings {
    /// Create an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from `config/default`, the `config/{env}` overlay, and
    /// `APP_*` environment variables. Missing files are skipped.
    pub fn load(env: &str) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment_source())
            .build()?;

        Self::from_config(config)
    }

    /// Load settings from a single file (format inferred from the extension).
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: config::Config) -> AppResult<Self> {
        let raw: HashMap<String, Value> = config.try_deserialize()?;
        let settings: Self = raw.into_iter().collect();
        debug!(keys = settings.len(), "Settings loaded");
        Ok(settings)
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.values.insert(normalize(key), value.into());
        self
    }

    /// Builder-style [`Settings::set`].
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Raw value lookup. `null` values are reported as absent.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.values
            .get(&normalize(key))
            .filter(|value| !value.is_null())
    }

    /// Whether a non-null value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    /// String lookup. Numbers and booleans are rendered as text.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get_value(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// String lookup with a default for missing keys.
    pub fn get_str_or(&self, key: &str, default: &str) -> String {
        self.get_str(key).unwrap_or_else(|| default.to_string())
    }

    /// Boolean lookup. Accepts booleans, `"true"`/`"false"`, and `1`/`0`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get_value(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|v| v != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Logging settings (`LOG_LEVEL`, `LOG_FORMAT`).
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::from_settings(self)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(key, value)| (normalize(key.as_ref()), value))
            .collect();
        Self { values }
    }
}

fn environment_source() -> config::Environment {
    LIST_KEYS.iter().fold(
        config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(","),
        |env, key| env.with_list_parse_key(key),
    )
}

fn normalize(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}

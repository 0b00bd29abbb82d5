//! Deprecation notices.
//!
//! Deprecated usage is reported as a `WARN` event on a dedicated target and
//! never turns into an error.

use tracing::warn;

/// `tracing` target used for every deprecation event.
pub const DEPRECATION_TARGET: &str = "appredis::deprecation";

/// A deprecated usage pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deprecation {
    /// `<PREFIX>_DATABASE` was set instead of putting the index in the URL.
    DatabaseSetting,
    /// The extension was built through the legacy `Redis` wrapper.
    LegacyWrapper,
}

impl Deprecation {
    /// Human-readable notice.
    pub fn message(self) -> &'static str {
        match self {
            Self::DatabaseSetting => {
                "Setting the redis database in its own config variable is deprecated. \
                 Please include it in the URL variable instead."
            }
            Self::LegacyWrapper => {
                "Instantiating the extension via `legacy::Redis` is deprecated. \
                 Please use `RedisExtension` instead."
            }
        }
    }

    /// Emit the notice as a warning event.
    pub(crate) fn emit(self) {
        warn!(target: DEPRECATION_TARGET, deprecation = ?self, "{}", self.message());
    }
}

//! Deprecated entry point kept for callers of the old name.

#![allow(deprecated)]

use std::ops::Deref;
use std::sync::Arc;

use appredis_core::app::Application;

use crate::deprecation::Deprecation;
use crate::error::ExtensionResult;
use crate::extension::RedisExtension;

/// Old name of [`RedisExtension`].
///
/// Logs a deprecation warning on construction, then behaves exactly like
/// the extension it wraps. The application registers the wrapped
/// extension, so lookups under `"redis"` return the same instance this
/// wrapper dereferences to.
#[deprecated(since = "0.1.0", note = "use `RedisExtension` instead")]
#[derive(Debug, Clone)]
pub struct Redis {
    inner: Arc<RedisExtension>,
}

impl Redis {
    /// Same as [`RedisExtension::create`], plus a deprecation warning.
    pub fn new(
        app: Option<&mut Application>,
        strict: bool,
        config_prefix: &str,
    ) -> ExtensionResult<Self> {
        Deprecation::LegacyWrapper.emit();
        let inner = RedisExtension::create(app, strict, config_prefix)?;
        Ok(Self { inner })
    }

    /// The wrapped extension.
    pub fn into_inner(self) -> Arc<RedisExtension> {
        self.inner
    }
}

impl Deref for Redis {
    type Target = RedisExtension;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

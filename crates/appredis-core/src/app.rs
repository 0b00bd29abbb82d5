//! Host application object.

use std::any::Any;
use std::sync::Arc;

use crate::config::Settings;
use crate::extensions::Extensions;

/// The host application extensions attach themselves to.
///
/// Owns the settings map and, once the first extension registers, the
/// extension table. Extensions receive `&mut Application` during startup;
/// after that the application is typically shared read-only.
#[derive(Debug, Clone)]
pub struct Application {
    /// Application name, used in log output.
    name: String,
    /// Configuration values.
    settings: Settings,
    /// Extension table, created on first registration.
    extensions: Option<Extensions>,
}

impl Application {
    /// Create an application with the given settings and no extension table.
    pub fn new(name: impl Into<String>, settings: Settings) -> Self {
        Self {
            name: name.into(),
            settings,
            extensions: None,
        }
    }

    /// Application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration values.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The extension table, if any extension has registered yet.
    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    /// The extension table, created empty if missing.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        self.extensions.get_or_insert_with(Extensions::new)
    }

    /// Typed lookup of a registered extension.
    pub fn extension<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.extensions.as_ref()?.get(name)
    }
}

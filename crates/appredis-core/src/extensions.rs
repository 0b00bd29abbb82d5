//! Extension table — named instances attached to an [`Application`].
//!
//! [`Application`]: crate::app::Application

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

/// Shared, type-erased extension instance.
pub type ExtensionHandle = Arc<dyn Any + Send + Sync>;

/// Table of extension instances keyed by name.
///
/// Written once per extension during application startup, read many times
/// afterwards. Typed access goes through [`Extensions::get`], which
/// downcasts the stored handle.
#[derive(Default, Clone)]
pub struct Extensions {
    /// Extension name → instance.
    entries: HashMap<String, ExtensionHandle>,
}

impl Extensions {
    /// Creates a new empty extension table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extension under `name`, replacing any previous entry.
    ///
    /// Returns the replaced handle, if there was one.
    pub fn insert<T>(&mut self, name: &str, extension: Arc<T>) -> Option<ExtensionHandle>
    where
        T: Any + Send + Sync,
    {
        info!(extension = %name, "Registering extension");
        let previous = self.entries.insert(name.to_string(), extension);
        if previous.is_some() {
            warn!(extension = %name, "Replaced an existing extension entry");
        }
        previous
    }

    /// Gets an extension by name, downcast to `T`.
    ///
    /// Returns `None` when nothing is registered under `name` or the entry
    /// has a different type.
    pub fn get<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.entries
            .get(name)
            .cloned()
            .and_then(|handle| handle.downcast::<T>().ok())
    }

    /// Checks whether an extension is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered extension names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns extension count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("names", &self.names())
            .finish()
    }
}

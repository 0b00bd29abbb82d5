//! Client provider selection.
//!
//! The provider is chosen once per extension, before the client is built,
//! and never changes afterwards.

use std::fmt;
use std::sync::Arc;

use crate::client::BoundClient;
use crate::error::ExtensionResult;

/// Behaviour of a single-node client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingleNodeMode {
    /// One multiplexed connection; connection loss surfaces as command errors.
    Strict,
    /// Connection manager that reconnects on its own after connection loss.
    #[default]
    Lenient,
}

impl SingleNodeMode {
    /// Map the `strict` flag of `initialize` to a mode.
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

/// Builds a client from a cluster startup node list.
///
/// Implemented by callers who need a client configured differently from
/// the built-in cluster client.
pub trait ProviderFactory: Send + Sync + fmt::Debug {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Build the client for `startup_nodes`, honouring `max_connections`.
    fn build(&self, startup_nodes: &[String], max_connections: usize) -> ExtensionResult<BoundClient>;
}

/// Which client implementation the extension binds.
#[derive(Debug, Clone)]
pub enum ClientProvider {
    /// Single-server client.
    SingleNode(SingleNodeMode),
    /// Built-in Redis Cluster client.
    Cluster,
    /// Caller-supplied factory.
    Custom(Arc<dyn ProviderFactory>),
}

impl ClientProvider {
    /// Strict single-node provider.
    pub fn strict() -> Self {
        Self::SingleNode(SingleNodeMode::Strict)
    }

    /// Lenient single-node provider.
    pub fn lenient() -> Self {
        Self::SingleNode(SingleNodeMode::Lenient)
    }

    /// Wrap a custom factory.
    pub fn custom(factory: impl ProviderFactory + 'static) -> Self {
        Self::Custom(Arc::new(factory))
    }

    /// Mode of a provider that builds a single-node client directly from
    /// the URL, `None` for providers that read startup nodes.
    pub fn single_node_mode(&self) -> Option<SingleNodeMode> {
        match self {
            Self::SingleNode(mode) => Some(*mode),
            Self::Cluster | Self::Custom(_) => None,
        }
    }

    /// Short name used in log output.
    pub fn name(&self) -> &str {
        match self {
            Self::SingleNode(SingleNodeMode::Strict) => "single-node-strict",
            Self::SingleNode(SingleNodeMode::Lenient) => "single-node-lenient",
            Self::Cluster => "cluster",
            Self::Custom(factory) => factory.name(),
        }
    }
}

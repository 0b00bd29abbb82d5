//! Errors raised while resolving settings and binding the client.

use thiserror::Error;

use appredis_core::error::{AppError, ErrorKind};

/// Result alias for extension operations.
pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Errors produced by the Redis extension.
///
/// Failures of the underlying client are carried as [`ExtensionError::Redis`]
/// without translation.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// `from_custom_provider` was called without a provider.
    #[error("a client provider is required")]
    MissingProvider,

    /// Client construction was attempted before a provider was chosen.
    #[error("no client provider was resolved before client construction")]
    UnresolvedProvider,

    /// The extension already holds a bound client.
    #[error("redis extension is already initialized")]
    AlreadyInitialized,

    /// The extension was used before `initialize`.
    #[error("redis extension is not initialized")]
    NotInitialized,

    /// Support for a client kind was compiled out.
    #[error("{0} client support is not available; enable the `{0}` feature")]
    MissingDependency(&'static str),

    /// The connection URL could not be rewritten with the database override.
    #[error("invalid redis url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The database override is not a non-negative integer.
    #[error("invalid redis database index: {0}")]
    InvalidDatabase(String),

    /// `REDIS_NODES` has an unsupported shape.
    #[error("invalid startup nodes: {0}")]
    InvalidNodes(String),

    /// Error returned by the redis client.
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

impl From<ExtensionError> for AppError {
    fn from(err: ExtensionError) -> Self {
        let kind = match &err {
            ExtensionError::MissingProvider => ErrorKind::Validation,
            ExtensionError::AlreadyInitialized => ErrorKind::Conflict,
            ExtensionError::MissingDependency(_) => ErrorKind::NotImplemented,
            ExtensionError::Redis(_) => ErrorKind::Connection,
            ExtensionError::UnresolvedProvider
            | ExtensionError::NotInitialized
            | ExtensionError::InvalidUrl(_)
            | ExtensionError::InvalidDatabase(_)
            | ExtensionError::InvalidNodes(_) => ErrorKind::Configuration,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

//! # appredis-client
//!
//! Attaches a Redis client to an [`Application`](appredis_core::Application).
//!
//! [`RedisExtension`] reads `<PREFIX>_URL`, `<PREFIX>_DATABASE`, and
//! `REDIS_NODES` from the application settings, picks a provider, builds
//! the client, and registers itself in the application's extension table
//! under `"redis"`. Commands go through [`RedisConnection`], which
//! implements [`redis::aio::ConnectionLike`] and therefore the whole
//! [`redis::AsyncCommands`] surface.
//!
//! - **single-node** (default feature): strict or lenient single-server client
//! - **cluster**: Redis Cluster client bootstrapped from `REDIS_NODES`
//! - **custom**: any [`ProviderFactory`] supplied by the caller

pub mod client;
pub mod connection;
pub mod deprecation;
pub mod error;
pub mod extension;
pub mod keys;
pub mod legacy;
pub mod nodes;
pub mod provider;

pub use client::{BoundClient, POOL_CAPACITY};
pub use connection::RedisConnection;
pub use error::{ExtensionError, ExtensionResult};
pub use extension::{DEFAULT_CONFIG_PREFIX, DEFAULT_URL, EXTENSION_KEY, RedisExtension};
pub use provider::{ClientProvider, ProviderFactory, SingleNodeMode};

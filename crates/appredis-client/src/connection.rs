//! Delegating connection.
//!
//! [`RedisConnection`] wraps whichever async connection the bound client
//! produces and implements [`ConnectionLike`] by forwarding to it, so every
//! [`redis::AsyncCommands`] method works on it unchanged. Replies and
//! errors come straight from the wrapped connection.

use std::fmt;
use std::sync::Arc;

use redis::aio::ConnectionLike;
use redis::cluster_async::ClusterConnection;
use redis::{Cmd, Pipeline, RedisFuture, RedisResult, Value};
use tokio::sync::Semaphore;
use tracing::debug;

#[cfg(feature = "single-node")]
use redis::aio::{ConnectionManager, MultiplexedConnection};

#[cfg(feature = "single-node")]
use crate::provider::SingleNodeMode;

use crate::client::BoundClient;
use crate::error::ExtensionResult;

#[derive(Clone)]
enum Transport {
    #[cfg(feature = "single-node")]
    Multiplexed(MultiplexedConnection),
    #[cfg(feature = "single-node")]
    Managed(ConnectionManager),
    Cluster(ClusterConnection),
}

/// Async connection handed out by [`RedisExtension`](crate::RedisExtension).
///
/// Clones share the underlying connection and the in-flight gate, which
/// admits at most [`POOL_CAPACITY`](crate::POOL_CAPACITY) commands at a time.
#[derive(Clone)]
pub struct RedisConnection {
    transport: Transport,
    gate: Arc<Semaphore>,
}

impl RedisConnection {
    /// Open a connection for `client`.
    pub(crate) async fn open(client: &BoundClient, gate: Arc<Semaphore>) -> ExtensionResult<Self> {
        let transport = match client {
            #[cfg(feature = "single-node")]
            BoundClient::SingleNode {
                client,
                mode: SingleNodeMode::Strict,
                ..
            } => Transport::Multiplexed(client.get_multiplexed_async_connection().await?),
            #[cfg(feature = "single-node")]
            BoundClient::SingleNode {
                client,
                mode: SingleNodeMode::Lenient,
                ..
            } => Transport::Managed(ConnectionManager::new(client.clone()).await?),
            BoundClient::Cluster { client, .. } => {
                Transport::Cluster(client.get_async_connection().await?)
            }
        };

        debug!(kind = transport.kind(), "Opened redis connection");
        Ok(Self { transport, gate })
    }

    /// Free slots in the in-flight gate.
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }

    /// Send `PING` and return the reply.
    pub async fn ping(&mut self) -> RedisResult<String> {
        redis::cmd("PING").query_async(self).await
    }
}

impl Transport {
    fn kind(&self) -> &'static str {
        match self {
            #[cfg(feature = "single-node")]
            Self::Multiplexed(_) => "multiplexed",
            #[cfg(feature = "single-node")]
            Self::Managed(_) => "managed",
            Self::Cluster(_) => "cluster",
        }
    }
}

impl ConnectionLike for RedisConnection {
    fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
        Box::pin(async move {
            // The gate is never closed, so a failed acquire cannot happen.
            let _permit = self.gate.acquire().await.ok();
            match &mut self.transport {
                #[cfg(feature = "single-node")]
                Transport::Multiplexed(conn) => conn.req_packed_command(cmd).await,
                #[cfg(feature = "single-node")]
                Transport::Managed(conn) => conn.req_packed_command(cmd).await,
                Transport::Cluster(conn) => conn.req_packed_command(cmd).await,
            }
        })
    }

    fn req_packed_commands<'a>(
        &'a mut self,
        cmd: &'a Pipeline,
        offset: usize,
        count: usize,
    ) -> RedisFuture<'a, Vec<Value>> {
        Box::pin(async move {
            let _permit = self.gate.acquire().await.ok();
            match &mut self.transport {
                #[cfg(feature = "single-node")]
                Transport::Multiplexed(conn) => conn.req_packed_commands(cmd, offset, count).await,
                #[cfg(feature = "single-node")]
                Transport::Managed(conn) => conn.req_packed_commands(cmd, offset, count).await,
                Transport::Cluster(conn) => conn.req_packed_commands(cmd, offset, count).await,
            }
        })
    }

    fn get_db(&self) -> i64 {
        match &self.transport {
            #[cfg(feature = "single-node")]
            Transport::Multiplexed(conn) => conn.get_db(),
            #[cfg(feature = "single-node")]
            Transport::Managed(conn) => conn.get_db(),
            Transport::Cluster(conn) => conn.get_db(),
        }
    }
}

impl fmt::Debug for RedisConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConnection")
            .field("kind", &self.transport.kind())
            .field("available_permits", &self.gate.available_permits())
            .finish()
    }
}

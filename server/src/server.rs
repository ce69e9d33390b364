//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Telnet daemon
//!
//! The [`TelnetServer`] owns the TCP listener, accepts connections, spawns one
//! connection task per client and keeps a registry of their handles.

use crate::connection::TelnetConnection;
use crate::{
    ConnectionHandle, ConnectionId, ConnectionInfo, Result, ServerConfig, ServerError,
    ServerMetrics, ServerSnapshot, SessionHandler,
};
use bytes::Bytes;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type Registry = Arc<DashMap<ConnectionId, ConnectionHandle>>;

/// Telnet daemon
///
/// # Example
///
/// ```no_run
/// use telnetd_server::{ServerConfig, SessionHandler, TelnetServer};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct Quiet;
///
/// #[async_trait]
/// impl SessionHandler for Quiet {}
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = TelnetServer::bind(ServerConfig::default()).await?;
///     server.start(Arc::new(Quiet))?;
///
///     tokio::signal::ctrl_c().await?;
///     server.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct TelnetServer {
    config: Arc<ServerConfig>,
    metrics: Arc<ServerMetrics>,
    connections: Registry,
    next_id: Arc<AtomicU64>,
    /// Taken by `start`.
    listener: Mutex<Option<TcpListener>>,
    bind_address: SocketAddr,
    started_at: Instant,
    shutdown: CancellationToken,
    accept_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TelnetServer {
    /// Validate `config` and bind the listener.
    ///
    /// Connections are not accepted until [`start`](Self::start) is called.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate().map_err(ServerError::Config)?;

        let listener = TcpListener::bind(config.bind_address).await?;
        let bind_address = listener.local_addr()?;
        info!(%bind_address, "telnet daemon bound");

        Ok(Self {
            config: Arc::new(config),
            metrics: Arc::new(ServerMetrics::new()),
            connections: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            listener: Mutex::new(Some(listener)),
            bind_address,
            started_at: Instant::now(),
            shutdown: CancellationToken::new(),
            accept_handle: Mutex::new(None),
        })
    }

    /// Start accepting connections, serving each with `handler`.
    pub fn start(&self, handler: Arc<dyn SessionHandler>) -> Result<()> {
        let listener = self
            .listener
            .lock()
            .ok()
            .and_then(|mut listener| listener.take())
            .ok_or(ServerError::AlreadyRunning)?;

        info!(bind_address = %self.bind_address, "accepting connections");
        let handle = tokio::spawn(accept_loop(
            listener,
            handler,
            self.config.clone(),
            self.metrics.clone(),
            self.connections.clone(),
            self.next_id.clone(),
            self.shutdown.clone(),
        ));
        if let Ok(mut slot) = self.accept_handle.lock() {
            *slot = Some(handle);
        }
        Ok(())
    }

    /// Stop accepting, close every connection and wait for their tasks.
    ///
    /// Waits at most the configured shutdown timeout for connection tasks to finish.
    pub async fn shutdown(&self) -> Result<()> {
        let accept = self
            .accept_handle
            .lock()
            .ok()
            .and_then(|mut handle| handle.take())
            .ok_or(ServerError::ServerNotRunning)?;

        info!("shutting down telnet daemon");
        self.shutdown.cancel();
        if let Err(error) = accept.await {
            error!(%error, "accept loop failed");
        }

        let connections = self.connections.clone();
        let drained = tokio::time::timeout(self.config.shutdown_timeout, async move {
            while !connections.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                remaining = self.connections.len(),
                "connections still open after shutdown timeout"
            );
        }

        info!("telnet daemon shutdown complete");
        Ok(())
    }

    /// Whether the accept loop is running
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
            && self
                .accept_handle
                .lock()
                .map(|handle| handle.is_some())
                .unwrap_or(false)
    }

    /// Address the listener is bound to
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Connections in the registry
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Handle for one connection
    pub fn connection(&self, id: ConnectionId) -> Option<ConnectionHandle> {
        self.connections.get(&id).map(|entry| entry.value().clone())
    }

    /// Info for every registered connection, ordered by ID.
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        let mut infos: Vec<ConnectionInfo> = self
            .connections
            .iter()
            .map(|entry| entry.value().info())
            .collect();
        infos.sort_by_key(|info| info.id);
        infos
    }

    /// Queue data for one client.
    pub fn send(&self, id: ConnectionId, data: impl Into<Bytes>) -> Result<()> {
        self.connection(id)
            .ok_or(ServerError::ConnectionNotFound(id))?
            .send(data)
    }

    /// Queue data for every client. Returns how many connections accepted it.
    pub fn broadcast(&self, data: impl Into<Bytes>) -> usize {
        let data = data.into();
        self.connections
            .iter()
            .filter(|entry| entry.value().send(data.clone()).is_ok())
            .count()
    }

    /// Close one connection.
    pub fn close(&self, id: ConnectionId) -> Result<()> {
        self.connection(id)
            .ok_or(ServerError::ConnectionNotFound(id))?
            .close();
        Ok(())
    }

    /// Registry size, totals and uptime
    pub fn snapshot(&self) -> ServerSnapshot {
        ServerSnapshot {
            active_connections: self.connections.len(),
            total_connections: self.metrics.total_connections(),
            bind_address: self.bind_address,
            uptime: self.started_at.elapsed(),
        }
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<ServerMetrics> {
        self.metrics.clone()
    }

    /// Settings the daemon was bound with
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for TelnetServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetServer")
            .field("bind_address", &self.bind_address)
            .field("running", &self.is_running())
            .field("connection_count", &self.connection_count())
            .field("uptime", &self.started_at.elapsed())
            .finish()
    }
}

impl Drop for TelnetServer {
    fn drop(&mut self) {
        if !self.shutdown.is_cancelled() {
            debug!("telnet daemon dropped, cancelling connections");
            self.shutdown.cancel();
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    handler: Arc<dyn SessionHandler>,
    config: Arc<ServerConfig>,
    metrics: Arc<ServerMetrics>,
    connections: Registry,
    next_id: Arc<AtomicU64>,
    shutdown: CancellationToken,
) {
    loop {
        let accepted = tokio::select! {
            () = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((socket, peer_addr)) => {
                if connections.len() >= config.max_connections {
                    warn!(
                        %peer_addr,
                        max_connections = config.max_connections,
                        "connection limit reached, rejecting"
                    );
                    metrics.connection_rejected();
                    drop(socket);
                    continue;
                }

                let id = ConnectionId::new(next_id.fetch_add(1, Ordering::Relaxed));
                debug!(connection_id = %id, %peer_addr, "accepted connection");
                spawn_connection(
                    id,
                    socket,
                    peer_addr,
                    handler.clone(),
                    config.clone(),
                    metrics.clone(),
                    connections.clone(),
                    shutdown.child_token(),
                );
            }
            Err(error) => {
                error!(%error, "failed to accept connection");
                metrics.connection_error();
                // Back off so a persistent failure does not spin.
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }

    info!("accept loop terminated");
}

#[allow(clippy::too_many_arguments)]
fn spawn_connection(
    id: ConnectionId,
    socket: TcpStream,
    peer_addr: SocketAddr,
    handler: Arc<dyn SessionHandler>,
    config: Arc<ServerConfig>,
    metrics: Arc<ServerMetrics>,
    connections: Registry,
    cancel: CancellationToken,
) {
    let connection = TelnetConnection::new(id, socket, peer_addr, config, handler, metrics, cancel);
    connections.insert(id, connection.handle());
    tokio::spawn(async move {
        connection.run().await;
        connections.remove(&id);
    });
}

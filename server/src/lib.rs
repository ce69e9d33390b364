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

//! # Telnet Daemon
//!
//! A tokio TCP server that hosts one [`telnetd_protocol::TelnetEngine`] per client.
//!
//! ## Architecture
//!
//! - **[`TelnetServer`]**: binds the listener, accepts connections, enforces the
//!   connection limit and keeps a registry of [`ConnectionHandle`]s
//! - **Connection task**: owns the engine and its [`DaemonSession`], reads the
//!   socket, runs the engine, writes what it queued and calls the handler
//! - **[`SessionHandler`]**: the application, told about input, signals, window
//!   changes and disconnects
//! - **[`ServerMetrics`]**: lock-free counters, mirrored to the `metrics` facade
//!
//! ## Usage
//!
//! ```no_run
//! use telnetd_server::{ConnectionHandle, ServerConfig, SessionHandler, TelnetServer};
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl SessionHandler for Greeter {
//!     async fn on_connect(&self, conn: &ConnectionHandle) {
//!         let _ = conn.send("Welcome!\r\n");
//!     }
//!
//!     async fn on_input(&self, conn: &ConnectionHandle, data: Bytes) {
//!         tracing::info!(connection_id = %conn.id(), bytes = data.len(), "input");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new("127.0.0.1:2323".parse()?);
//!     let server = TelnetServer::bind(config).await?;
//!     server.start(Arc::new(Greeter))?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     server.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]

mod config;
mod connection;
mod error;
mod handler;
mod metrics;
mod server;
mod session;
mod types;

pub use self::config::{OptionRequest, ServerConfig, default_initial_requests};
pub use self::connection::{ConnectionHandle, SessionView};
pub use self::error::{Result, ServerError};
pub use self::handler::SessionHandler;
pub use self::metrics::{MetricsSnapshot, ServerMetrics};
pub use self::server::TelnetServer;
pub use self::session::{
    DaemonSession, LineDiscipline, ModeFlags, NetworkBuffer, SessionSignal, TerminalModes,
    TimerLog,
};
pub use self::types::{ConnectionId, ConnectionInfo, ConnectionState, ServerSnapshot};

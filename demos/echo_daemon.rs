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

//! Line Echo Daemon
//!
//! A small telnet daemon that:
//! - Negotiates echo, terminal type, window size and linemode with each client
//! - Collects input into lines and echoes each completed line back
//! - Reports Interrupt and EOF signals to the client
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example echo_daemon -- 127.0.0.1:2323
//! telnet localhost 2323
//! ```
//!
//! Set `RUST_LOG=telnetd_server=debug` to watch negotiation.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use telnetd_protocol::naws::WindowSize;
use telnetd_server::{
    ConnectionHandle, ConnectionId, ServerConfig, SessionHandler, SessionSignal, TelnetServer,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let address = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TELNETD_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1:2323".to_string());

    let config = ServerConfig::new(address.parse()?)
        .with_max_connections(64)
        .with_idle_timeout(Duration::from_secs(600));

    let server = TelnetServer::bind(config).await?;
    server.start(Arc::new(LineEcho::default()))?;
    info!(bind_address = %server.bind_address(), "echo daemon ready");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await?;

    let metrics = server.metrics().snapshot();
    info!(
        total = metrics.total_connections,
        sent = metrics.bytes_sent,
        received = metrics.bytes_received,
        "echo daemon stopped"
    );
    Ok(())
}

/// Partial line per connection
#[derive(Default)]
struct LineEcho {
    lines: DashMap<ConnectionId, String>,
}

impl LineEcho {
    fn prompt(conn: &ConnectionHandle) {
        let _ = conn.send("> ");
    }
}

#[async_trait]
impl SessionHandler for LineEcho {
    async fn on_connect(&self, conn: &ConnectionHandle) {
        self.lines.insert(conn.id(), String::new());
        let _ = conn.send(format!("Connected as {}.\r\n", conn.id()));
        Self::prompt(conn);
    }

    async fn on_input(&self, conn: &ConnectionHandle, data: Bytes) {
        let mut completed = Vec::new();
        {
            let mut line = self.lines.entry(conn.id()).or_default();
            for &byte in data.iter() {
                match byte {
                    b'\r' | b'\n' => {
                        if !line.is_empty() {
                            completed.push(std::mem::take(&mut *line));
                        }
                    }
                    0x08 | 0x7F => {
                        line.pop();
                    }
                    0 => {}
                    byte => line.push(char::from(byte)),
                }
            }
        }

        for line in completed {
            let terminal = conn.terminal_type().unwrap_or_else(|| "unknown".to_string());
            info!(connection_id = %conn.id(), %terminal, %line, "line received");
            let _ = conn.send(format!("echo: {line}\r\n"));
            Self::prompt(conn);
        }
    }

    async fn on_signal(&self, conn: &ConnectionHandle, signal: SessionSignal) {
        info!(connection_id = %conn.id(), %signal, "signal");
        match signal {
            SessionSignal::Interrupt => {
                if let Some(mut line) = self.lines.get_mut(&conn.id()) {
                    line.clear();
                }
                let _ = conn.send("^C\r\n");
                Self::prompt(conn);
            }
            SessionSignal::EndOfFile => {
                let _ = conn.send("Goodbye.\r\n");
                conn.close();
            }
            SessionSignal::Break | SessionSignal::Suspend => {}
        }
    }

    async fn on_window_size(&self, conn: &ConnectionHandle, size: WindowSize) {
        info!(connection_id = %conn.id(), cols = size.cols, rows = size.rows, "window resized");
    }

    async fn on_disconnect(&self, conn: &ConnectionHandle) {
        self.lines.remove(&conn.id());
        info!(connection_id = %conn.id(), "disconnected");
    }
}

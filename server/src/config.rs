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

//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;
use telnetd_protocol::{EngineConfig, TelnetOption};

/// An option negotiation the daemon starts on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionRequest {
    /// Offer to perform an option (`IAC WILL`)
    Will(TelnetOption),
    /// Stop performing an option (`IAC WONT`)
    Wont(TelnetOption),
    /// Ask the peer to perform an option (`IAC DO`)
    Do(TelnetOption),
    /// Ask the peer to stop performing an option (`IAC DONT`)
    Dont(TelnetOption),
}

impl OptionRequest {
    /// The option being negotiated
    pub fn option(&self) -> TelnetOption {
        match *self {
            Self::Will(option) | Self::Wont(option) | Self::Do(option) | Self::Dont(option) => {
                option
            }
        }
    }
}

impl std::fmt::Display for OptionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Will(option) => write!(f, "WILL {option}"),
            Self::Wont(option) => write!(f, "WONT {option}"),
            Self::Do(option) => write!(f, "DO {option}"),
            Self::Dont(option) => write!(f, "DONT {option}"),
        }
    }
}

/// Requests sent to every client right after accept.
///
/// Terminal identification first, then window size and line editing, then the
/// TIMING-MARK probe for pre-LINEMODE clients, and finally character-at-a-time
/// echo.
pub fn default_initial_requests() -> Vec<OptionRequest> {
    vec![
        OptionRequest::Do(TelnetOption::TTYPE),
        OptionRequest::Do(TelnetOption::TSPEED),
        OptionRequest::Do(TelnetOption::NAWS),
        OptionRequest::Do(TelnetOption::Linemode),
        OptionRequest::Will(TelnetOption::Status),
        OptionRequest::Do(TelnetOption::TimingMark),
        OptionRequest::Will(TelnetOption::Echo),
        OptionRequest::Will(TelnetOption::SuppressGoAhead),
    ]
}

/// Daemon settings
///
/// Start from [`ServerConfig::new`] or `Default` and adjust with the `with_*` methods.
/// [`TelnetServer::bind`](crate::TelnetServer::bind) rejects anything [`validate`](Self::validate)
/// refuses.
///
/// # Example
///
/// ```
/// use telnetd_server::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::new("0.0.0.0:2323".parse().unwrap())
///     .with_max_connections(64)
///     .with_idle_timeout(Duration::from_secs(900))
///     .with_terminal_echo(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listening address; port 0 picks a free port
    pub bind_address: SocketAddr,

    /// Clients beyond this many are accepted and closed at once
    pub max_connections: usize,

    /// Connections that send nothing for this long are closed.
    pub idle_timeout: Duration,

    /// How long one socket write may block before the session is dropped
    pub write_timeout: Duration,

    /// How long `shutdown` waits for connection tasks to finish
    pub shutdown_timeout: Duration,

    /// Bytes requested from the socket per read
    pub read_buffer_size: usize,

    /// Capacity of the per-connection network output buffer
    pub network_capacity: usize,

    /// Start each session with terminal echo on, as a pty in cooked mode would.
    pub terminal_echo: bool,

    /// Protocol engine configuration applied to every connection
    pub engine: EngineConfig,

    /// Negotiations started right after accept, in order
    pub initial_requests: Vec<OptionRequest>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 23)),
            max_connections: 1000,
            idle_timeout: Duration::from_secs(300),
            write_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(30),
            read_buffer_size: 4096,
            network_capacity: 8192,
            terminal_echo: true,
            engine: EngineConfig::default(),
            initial_requests: default_initial_requests(),
        }
    }
}

impl ServerConfig {
    /// Defaults, listening on `bind_address`.
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    /// Connection limit
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Input inactivity limit
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Per-write deadline
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Grace period for `shutdown`
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Set the socket read size
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the network output capacity
    pub fn with_network_capacity(mut self, capacity: usize) -> Self {
        self.network_capacity = capacity;
        self
    }

    /// Start sessions with terminal echo on or off
    pub fn with_terminal_echo(mut self, enabled: bool) -> Self {
        self.terminal_echo = enabled;
        self
    }

    /// Replace the protocol engine configuration
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Replace the initial negotiation list
    pub fn with_initial_requests(mut self, requests: Vec<OptionRequest>) -> Self {
        self.initial_requests = requests;
        self
    }

    /// Check the settings, describing the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let unset = [
            ("max_connections", self.max_connections == 0),
            ("idle_timeout", self.idle_timeout.is_zero()),
            ("write_timeout", self.write_timeout.is_zero()),
            ("read_buffer_size", self.read_buffer_size == 0),
        ];
        if let Some((name, _)) = unset.iter().find(|(_, zero)| *zero) {
            return Err(format!("{name} must be greater than 0"));
        }

        // Room for one negotiation triple.
        if self.network_capacity < 3 {
            return Err(format!(
                "network_capacity must be at least 3, got {}",
                self.network_capacity
            ));
        }

        self.engine.validate()
    }
}

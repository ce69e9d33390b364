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

//! Core identifiers and state types

use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Unique connection identifier
///
/// Assigned by the server from a monotonically increasing counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create a new connection ID
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

impl From<u64> for ConnectionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Connection lifecycle state
///
/// Stored as an `AtomicU8` so the registry can read it without locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// Accepted, task not yet running
    Connecting = 0,
    /// Initial option requests sent
    Negotiating = 1,
    /// Exchanging data
    Active = 2,
    /// Tearing down
    Closing = 3,
    /// Task finished
    Closed = 4,
}

impl ConnectionState {
    /// Convert from u8 representation
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Negotiating,
            2 => Self::Active,
            3 => Self::Closing,
            _ => Self::Closed,
        }
    }

    /// Convert to u8 representation
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether the connection can no longer carry data
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closing | Self::Closed)
    }

    /// Whether the connection task is running
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Negotiating | Self::Active)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Negotiating => write!(f, "negotiating"),
            Self::Active => write!(f, "active"),
            Self::Closing => write!(f, "closing"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Point-in-time view of one connection
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// Lifecycle state
    pub state: ConnectionState,
    /// Remote address
    pub peer_addr: SocketAddr,
    /// When the connection was accepted
    pub created_at: Instant,
    /// Bytes written to the peer
    pub bytes_sent: u64,
    /// Bytes read from the peer
    pub bytes_received: u64,
}

impl ConnectionInfo {
    /// Time since the connection was accepted
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Point-in-time view of the server
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    /// Connections currently registered
    pub active_connections: usize,
    /// Connections accepted since start
    pub total_connections: u64,
    /// Listening address
    pub bind_address: SocketAddr,
    /// Time since the listener was bound
    pub uptime: Duration,
}

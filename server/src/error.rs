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

//! Error types for the Telnet daemon

use crate::types::ConnectionId;
use std::time::Duration;
use thiserror::Error;

/// Result type for daemon operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Daemon error types
#[derive(Debug, Error)]
pub enum ServerError {
    /// I/O error from the listener or a TCP stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Connection with the given ID was not found
    #[error("Connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    /// Connection task has already exited
    #[error("Connection {0} closed")]
    ConnectionClosed(ConnectionId),

    /// No input arrived within the idle timeout
    #[error("Connection idle for {0:?}")]
    IdleTimeout(Duration),

    /// The peer did not drain output within the write timeout
    #[error("Write timed out after {0:?}")]
    WriteTimeout(Duration),

    /// Server was already started
    #[error("Server already running")]
    AlreadyRunning,

    /// Server is not running
    #[error("Server not running")]
    ServerNotRunning,

    /// Maximum number of connections reached
    #[error("Maximum connections ({0}) reached")]
    MaxConnectionsReached(usize),
}

impl ServerError {
    /// Check if the error is recoverable
    ///
    /// Recoverable errors affect a single operation; the server and the other
    /// connections keep running.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ServerError::ConnectionNotFound(_)
                | ServerError::ConnectionClosed(_)
                | ServerError::IdleTimeout(_)
                | ServerError::WriteTimeout(_)
                | ServerError::MaxConnectionsReached(_)
        )
    }

    /// Check if the error ends a connection
    pub fn is_connection_error(&self) -> bool {
        match self {
            ServerError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ),
            ServerError::ConnectionClosed(_)
            | ServerError::IdleTimeout(_)
            | ServerError::WriteTimeout(_) => true,
            _ => false,
        }
    }

    /// Check if the error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ServerError::IdleTimeout(_) | ServerError::WriteTimeout(_)
        )
    }
}

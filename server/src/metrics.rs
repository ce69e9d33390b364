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

//! Daemon counters
//!
//! [`ServerMetrics`] is shared by the accept loop and every connection task. Each
//! event bumps an atomic here and is mirrored to the `metrics` facade under the
//! `telnetd.` prefix, so an installed recorder sees the same numbers that
//! [`TelnetServer::metrics`](crate::TelnetServer::metrics) reports.

use metrics::{counter, gauge};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Shared daemon counters
#[derive(Debug)]
pub struct ServerMetrics {
    started: Instant,
    accepted: AtomicU64,
    open: AtomicU64,
    refused: AtomicU64,
    /// Summed lifetime of closed sessions, in nanoseconds
    session_nanos: AtomicU64,
    sent: AtomicU64,
    received: AtomicU64,
    signals: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerMetrics {
    /// Counters starting at zero, with uptime measured from now.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            accepted: AtomicU64::new(0),
            open: AtomicU64::new(0),
            refused: AtomicU64::new(0),
            session_nanos: AtomicU64::new(0),
            sent: AtomicU64::new(0),
            received: AtomicU64::new(0),
            signals: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
        }
    }

    /// A connection task started.
    pub fn connection_opened(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.open.fetch_add(1, Ordering::Relaxed);
        counter!("telnetd.connections.total").increment(1);
        gauge!("telnetd.connections.active").increment(1.0);
    }

    /// A connection task finished after `lifetime`.
    pub fn connection_closed(&self, lifetime: Duration) {
        self.open.fetch_sub(1, Ordering::Relaxed);
        let nanos = u64::try_from(lifetime.as_nanos()).unwrap_or(u64::MAX);
        self.session_nanos.fetch_add(nanos, Ordering::Relaxed);
        gauge!("telnetd.connections.active").decrement(1.0);
    }

    /// A client was turned away at the connection limit.
    pub fn connection_rejected(&self) {
        self.refused.fetch_add(1, Ordering::Relaxed);
        counter!("telnetd.connections.rejected").increment(1);
    }

    /// Bytes written to a client socket.
    pub fn bytes_sent(&self, count: u64) {
        self.sent.fetch_add(count, Ordering::Relaxed);
        counter!("telnetd.bytes.sent").increment(count);
    }

    /// Bytes read from a client socket.
    pub fn bytes_received(&self, count: u64) {
        self.received.fetch_add(count, Ordering::Relaxed);
        counter!("telnetd.bytes.received").increment(count);
    }

    /// A telnet signal command reached the session handler.
    pub fn signal_delivered(&self) {
        self.signals.fetch_add(1, Ordering::Relaxed);
        counter!("telnetd.signals.delivered").increment(1);
    }

    /// A session or the accept loop failed.
    pub fn connection_error(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        counter!("telnetd.errors", "kind" => "connection").increment(1);
    }

    /// A session ended on its idle or write deadline.
    pub fn timeout_error(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
        counter!("telnetd.errors", "kind" => "timeout").increment(1);
    }

    /// Sessions currently running
    pub fn active_connections(&self) -> u64 {
        self.open.load(Ordering::Relaxed)
    }

    /// Sessions started since the daemon was created
    pub fn total_connections(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Copy every counter out.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_connections = self.total_connections();
        let active_connections = self.active_connections();
        let closed = total_connections.saturating_sub(active_connections);
        let avg_connection_duration = match closed {
            0 => Duration::ZERO,
            closed => Duration::from_nanos(self.session_nanos.load(Ordering::Relaxed) / closed),
        };

        MetricsSnapshot {
            total_connections,
            active_connections,
            rejected_connections: self.refused.load(Ordering::Relaxed),
            bytes_sent: self.sent.load(Ordering::Relaxed),
            bytes_received: self.received.load(Ordering::Relaxed),
            signals_delivered: self.signals.load(Ordering::Relaxed),
            connection_errors: self.failures.load(Ordering::Relaxed),
            timeout_errors: self.timeouts.load(Ordering::Relaxed),
            uptime: self.started.elapsed(),
            avg_connection_duration,
        }
    }
}

/// Counter values read at one instant
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Sessions started
    pub total_connections: u64,
    /// Sessions running
    pub active_connections: u64,
    /// Clients refused at the connection limit
    pub rejected_connections: u64,
    /// Bytes written to clients
    pub bytes_sent: u64,
    /// Bytes read from clients
    pub bytes_received: u64,
    /// Signals handed to the session handler
    pub signals_delivered: u64,
    /// Failed sessions and accept errors
    pub connection_errors: u64,
    /// Sessions ended by a deadline
    pub timeout_errors: u64,
    /// Time since the daemon was created
    pub uptime: Duration,
    /// Mean lifetime of closed sessions
    pub avg_connection_duration: Duration,
}

impl MetricsSnapshot {
    /// Outbound bytes per second of uptime
    pub fn bytes_sent_per_sec(&self) -> f64 {
        per_second(self.bytes_sent, self.uptime)
    }

    /// Inbound bytes per second of uptime
    pub fn bytes_received_per_sec(&self) -> f64 {
        per_second(self.bytes_received, self.uptime)
    }

    /// Failures of any kind
    pub fn total_errors(&self) -> u64 {
        self.connection_errors + self.timeout_errors
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} active / {} total sessions, {} refused, {} bytes out, {} bytes in, {} errors",
            self.active_connections,
            self.total_connections,
            self.rejected_connections,
            self.bytes_sent,
            self.bytes_received,
            self.total_errors()
        )
    }
}

fn per_second(count: u64, over: Duration) -> f64 {
    if over.is_zero() {
        0.0
    } else {
        count as f64 / over.as_secs_f64()
    }
}

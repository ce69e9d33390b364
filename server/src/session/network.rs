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

//! Network-bound output staging

use bytes::{Bytes, BytesMut};
use telnetd_protocol::Transport;
use tracing::trace;

/// Two-stage network output buffer.
///
/// The engine writes into a bounded pending area. [`flush`](Transport::flush) moves
/// pending bytes to the ready area, which the connection task drains to the socket.
#[derive(Debug)]
pub struct NetworkBuffer {
    pending: BytesMut,
    ready: BytesMut,
    capacity: usize,
    /// Offset of the last urgent byte, counted from the start of `ready`.
    urgent: Option<usize>,
}

impl NetworkBuffer {
    /// Create a buffer holding at most `capacity` unflushed bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: BytesMut::with_capacity(capacity),
            ready: BytesMut::with_capacity(capacity),
            capacity,
            urgent: None,
        }
    }

    /// Maximum number of unflushed bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes written but not yet flushed
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Bytes flushed and waiting for the socket
    pub fn ready(&self) -> &[u8] {
        &self.ready
    }

    /// Remove flushed bytes, along with the urgent mark if it falls inside them.
    pub fn take_ready(&mut self) -> (Bytes, Option<usize>) {
        let data = self.ready.split().freeze();
        let urgent = match self.urgent {
            Some(mark) if mark < data.len() => {
                self.urgent = None;
                Some(mark)
            }
            Some(mark) => {
                self.urgent = Some(mark - data.len());
                None
            }
            None => None,
        };
        (data, urgent)
    }
}

impl Transport for NetworkBuffer {
    fn write(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            trace!(bytes = self.pending.len(), "network flush");
            self.ready.extend_from_slice(&self.pending);
            self.pending.clear();
        }
    }

    fn clear_pending(&mut self) {
        trace!(bytes = self.pending.len(), "discarding unflushed output");
        self.pending.clear();
        if self.urgent.is_some_and(|mark| mark >= self.ready.len()) {
            self.urgent = None;
        }
    }

    fn has_capacity(&self, additional: usize) -> bool {
        self.pending.len() + additional <= self.capacity
    }

    fn mark_urgent(&mut self) {
        let total = self.ready.len() + self.pending.len();
        self.urgent = total.checked_sub(1);
    }
}

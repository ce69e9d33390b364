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

//! Application seam of the daemon

use crate::{ConnectionHandle, ServerError, SessionSignal};
use async_trait::async_trait;
use bytes::Bytes;
use telnetd_protocol::naws::WindowSize;

/// Session event handler
///
/// Implement this trait to act on what clients type. Every method has an empty
/// default. Methods run on the connection's own task, so a slow handler only
/// delays its own connection.
///
/// # Example
///
/// ```no_run
/// use telnetd_server::{ConnectionHandle, SessionHandler};
/// use async_trait::async_trait;
/// use bytes::Bytes;
///
/// struct Shout;
///
/// #[async_trait]
/// impl SessionHandler for Shout {
///     async fn on_input(&self, conn: &ConnectionHandle, data: Bytes) {
///         let _ = conn.send(data.to_ascii_uppercase());
///     }
/// }
/// ```
#[async_trait]
pub trait SessionHandler: Send + Sync + 'static {
    /// Called once the initial negotiations are on the wire.
    async fn on_connect(&self, _conn: &ConnectionHandle) {}

    /// Called with data demultiplexed from the client.
    ///
    /// Commands, negotiations and sub-negotiations have already been removed, and
    /// the daemon has already echoed the data if echo is on.
    async fn on_input(&self, _conn: &ConnectionHandle, _data: Bytes) {}

    /// Called when the client sends Interrupt, Break, Suspend or EOF.
    async fn on_signal(&self, _conn: &ConnectionHandle, _signal: SessionSignal) {}

    /// Called when the client reports a new window size.
    async fn on_window_size(&self, _conn: &ConnectionHandle, _size: WindowSize) {}

    /// Called when the connection fails. The connection closes after this returns.
    async fn on_error(&self, _conn: &ConnectionHandle, _error: &ServerError) {}

    /// Called when the connection closes for any reason.
    async fn on_disconnect(&self, _conn: &ConnectionHandle) {}
}

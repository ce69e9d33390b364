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

//! Per-connection task
//!
//! Each accepted socket gets one [`TelnetConnection`] running on its own tokio task.
//! The task owns the protocol engine and its [`DaemonSession`]; nothing else can
//! reach them. Applications talk to the task through a cloneable
//! [`ConnectionHandle`], which queues output and option requests on a channel and
//! observes session facts through a watch channel.

use crate::session::{DaemonSession, ModeFlags};
use crate::{
    ConnectionId, ConnectionInfo, ConnectionState, OptionRequest, Result, ServerConfig,
    ServerError, ServerMetrics, SessionHandler,
};
use bytes::{Buf, Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Instant;
use telnetd_protocol::naws::WindowSize;
use telnetd_protocol::{LinemodeKind, TelnetEngine, Transport, consts};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

/// Work queued for a connection task by its handles.
#[derive(Debug)]
pub(crate) enum ControlMessage {
    /// Application data for the client
    Send(Bytes),
    /// Start an option negotiation
    Request(OptionRequest),
    /// Send an unsolicited `STATUS IS` report
    Status,
}

/// Session facts published by the connection task.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionView {
    /// Terminal type reported by the client, lower-cased
    pub terminal_type: Option<String>,
    /// Last window size reported by the client
    pub window_size: Option<WindowSize>,
    /// Line editing negotiated with the client
    pub linemode: LinemodeKind,
    /// Whether the daemon echoes client input
    pub echo: bool,
}

#[derive(Debug)]
struct ConnectionStats {
    state: AtomicU8,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

/// Cloneable reference to a running connection.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    peer_addr: SocketAddr,
    created_at: Instant,
    stats: Arc<ConnectionStats>,
    control: mpsc::UnboundedSender<ControlMessage>,
    view: watch::Receiver<SessionView>,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    /// Connection ID
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Remote address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Lifecycle state
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.stats.state.load(Ordering::Acquire))
    }

    /// Point-in-time view of the connection
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            state: self.state(),
            peer_addr: self.peer_addr,
            created_at: self.created_at,
            bytes_sent: self.stats.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.stats.bytes_received.load(Ordering::Relaxed),
        }
    }

    /// Latest session facts
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Terminal type reported by the client
    pub fn terminal_type(&self) -> Option<String> {
        self.view.borrow().terminal_type.clone()
    }

    /// Queue data for the client. IAC bytes are escaped on the way out.
    pub fn send(&self, data: impl Into<Bytes>) -> Result<()> {
        self.post(ControlMessage::Send(data.into()))
    }

    /// Start an option negotiation.
    pub fn request(&self, request: OptionRequest) -> Result<()> {
        self.post(ControlMessage::Request(request))
    }

    /// Send the client a `STATUS IS` report of the negotiated options.
    pub fn send_status(&self) -> Result<()> {
        self.post(ControlMessage::Status)
    }

    /// Close the connection. Data, requests and status reports queued before
    /// this call are still sent.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether the connection has been asked to close
    pub fn is_closing(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn post(&self, message: ControlMessage) -> Result<()> {
        self.control
            .send(message)
            .map_err(|_| ServerError::ConnectionClosed(self.id))
    }
}

/// A client connection and the engine serving it.
pub(crate) struct TelnetConnection {
    socket: TcpStream,
    engine: TelnetEngine,
    session: DaemonSession,
    handle: ConnectionHandle,
    control_rx: mpsc::UnboundedReceiver<ControlMessage>,
    view_tx: watch::Sender<SessionView>,
    config: Arc<ServerConfig>,
    handler: Arc<dyn SessionHandler>,
    metrics: Arc<ServerMetrics>,
    /// Options whose `SB SEND` has gone out.
    solicited: Vec<u8>,
}

impl TelnetConnection {
    pub(crate) fn new(
        id: ConnectionId,
        socket: TcpStream,
        peer_addr: SocketAddr,
        config: Arc<ServerConfig>,
        handler: Arc<dyn SessionHandler>,
        metrics: Arc<ServerMetrics>,
        cancel: CancellationToken,
    ) -> Self {
        let (control, control_rx) = mpsc::unbounded_channel();
        let modes = ModeFlags {
            echo: config.terminal_echo,
            ..ModeFlags::default()
        };
        let (view_tx, view) = watch::channel(SessionView {
            echo: modes.echo,
            ..SessionView::default()
        });
        let handle = ConnectionHandle {
            id,
            peer_addr,
            created_at: Instant::now(),
            stats: Arc::new(ConnectionStats {
                state: AtomicU8::new(ConnectionState::Connecting.as_u8()),
                bytes_sent: AtomicU64::new(0),
                bytes_received: AtomicU64::new(0),
            }),
            control,
            view,
            cancel,
        };
        Self {
            socket,
            engine: TelnetEngine::new(config.engine.clone()),
            session: DaemonSession::new(config.network_capacity, modes),
            handle,
            control_rx,
            view_tx,
            config,
            handler,
            metrics,
            solicited: Vec::new(),
        }
    }

    pub(crate) fn handle(&self) -> ConnectionHandle {
        self.handle.clone()
    }

    /// Serve the client until it leaves, times out, fails or is closed.
    #[instrument(
        name = "connection",
        skip(self),
        fields(connection_id = %self.handle.id, peer = %self.handle.peer_addr)
    )]
    pub(crate) async fn run(mut self) {
        self.metrics.connection_opened();
        info!("session started");

        if let Err(error) = self.serve().await {
            if error.is_timeout() {
                self.metrics.timeout_error();
            } else {
                self.metrics.connection_error();
            }
            warn!(%error, "session failed");
            self.handler.on_error(&self.handle, &error).await;
        }

        self.set_state(ConnectionState::Closing);
        self.handler.on_disconnect(&self.handle).await;
        if let Err(error) = self.socket.shutdown().await {
            trace!(%error, "socket shutdown");
        }
        self.set_state(ConnectionState::Closed);

        self.metrics
            .connection_closed(self.handle.created_at.elapsed());
        info!("session ended");
    }

    async fn serve(&mut self) -> Result<()> {
        self.socket.set_nodelay(true)?;
        self.set_state(ConnectionState::Negotiating);
        for request in self.config.initial_requests.clone() {
            self.issue(request);
        }
        self.drain().await?;

        self.handler.on_connect(&self.handle).await;
        self.set_state(ConnectionState::Active);

        let cancel = self.handle.cancel.clone();
        let idle = self.config.idle_timeout;
        let mut deadline = tokio::time::Instant::now() + idle;
        let mut input = BytesMut::with_capacity(self.config.read_buffer_size);
        loop {
            input.reserve(self.config.read_buffer_size);
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("closing on request");
                    while let Ok(message) = self.control_rx.try_recv() {
                        self.control(message).await?;
                    }
                    return Ok(());
                }
                message = self.control_rx.recv() => match message {
                    Some(message) => self.control(message).await?,
                    None => return Ok(()),
                },
                read = self.socket.read_buf(&mut input) => match read? {
                    0 => {
                        debug!("peer closed the connection");
                        return Ok(());
                    }
                    count => {
                        deadline = tokio::time::Instant::now() + idle;
                        self.received(count);
                        self.process(&mut input).await?;
                    }
                },
                () = sleep_until(deadline) => return Err(ServerError::IdleTimeout(idle)),
            }
        }
    }

    /// Run the engine over everything read so far.
    async fn process(&mut self, input: &mut BytesMut) -> Result<()> {
        while input.has_remaining() {
            let consumed = self.engine.consume(&mut self.session, &input[..]);
            input.advance(consumed);
            self.engine.flush_output(&mut self.session);
            self.dispatch().await?;
        }
        self.solicit();
        self.drain().await?;
        self.publish();
        Ok(())
    }

    /// Ask for the terminal type and speed once the client agrees to report them.
    fn solicit(&mut self) {
        for option in [consts::option::TTYPE, consts::option::TSPEED] {
            if self.engine.table().remote_enabled(option) && !self.solicited.contains(&option) {
                debug!(option, "soliciting sub-negotiation");
                self.solicited.push(option);
                self.session.write(&[
                    consts::IAC,
                    consts::SB,
                    option,
                    consts::SEND,
                    consts::IAC,
                    consts::SE,
                ]);
            }
        }
    }

    /// Hand terminal data, signals and window changes to the handler.
    async fn dispatch(&mut self) -> Result<()> {
        let data = self.session.terminal_mut().take_input();
        if !data.is_empty() {
            if self.session.should_echo() {
                let echo = echo_bytes(&data);
                self.engine.send_data(&mut self.session, &echo);
            }
            self.drain().await?;
            self.handler.on_input(&self.handle, data).await;
        }

        for signal in self.session.take_signals() {
            self.metrics.signal_delivered();
            self.handler.on_signal(&self.handle, signal).await;
        }

        if let Some(size) = self.session.editor_mut().take_window_change() {
            self.publish();
            self.handler.on_window_size(&self.handle, size).await;
        }

        self.drain().await
    }

    async fn control(&mut self, message: ControlMessage) -> Result<()> {
        match message {
            ControlMessage::Send(data) => self.engine.send_data(&mut self.session, &data),
            ControlMessage::Request(request) => self.issue(request),
            ControlMessage::Status => self.engine.send_status(&mut self.session),
        }
        self.drain().await
    }

    fn issue(&mut self, request: OptionRequest) {
        debug!(%request, "requesting option");
        match request {
            OptionRequest::Will(option) => {
                self.engine
                    .request_local_enable(&mut self.session, option, true);
            }
            OptionRequest::Wont(option) => {
                self.engine
                    .request_local_disable(&mut self.session, option, true);
            }
            OptionRequest::Do(option) => {
                self.engine
                    .request_remote_enable(&mut self.session, option, true);
            }
            OptionRequest::Dont(option) => {
                self.engine
                    .request_remote_disable(&mut self.session, option, true);
            }
        }
    }

    /// Write everything the engine queued to the socket.
    async fn drain(&mut self) -> Result<()> {
        self.session.flush();
        let (data, urgent) = self.session.network_mut().take_ready();
        if data.is_empty() {
            return Ok(());
        }
        if let Some(offset) = urgent {
            // Out-of-band data is not exposed by tokio; the Data Mark travels inline.
            trace!(offset, "urgent data mark");
        }

        let limit = self.config.write_timeout;
        timeout(limit, self.socket.write_all(&data))
            .await
            .map_err(|_| ServerError::WriteTimeout(limit))??;

        let count = data.len() as u64;
        self.handle
            .stats
            .bytes_sent
            .fetch_add(count, Ordering::Relaxed);
        self.metrics.bytes_sent(count);
        trace!(bytes = data.len(), "sent");
        Ok(())
    }

    fn received(&self, count: usize) {
        let count = count as u64;
        self.handle
            .stats
            .bytes_received
            .fetch_add(count, Ordering::Relaxed);
        self.metrics.bytes_received(count);
        trace!(bytes = count, "received");
    }

    fn publish(&self) {
        let view = SessionView {
            terminal_type: self.engine.terminal_type().map(str::to_owned),
            window_size: self.session.editor().window_size(),
            linemode: self.engine.linemode_kind(),
            echo: self.session.should_echo(),
        };
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    fn set_state(&self, state: ConnectionState) {
        self.handle
            .stats
            .state
            .store(state.as_u8(), Ordering::Release);
    }
}

/// Bytes to echo for `data`. A carriage return echoes as a line break.
fn echo_bytes(data: &[u8]) -> Vec<u8> {
    let mut echo = Vec::with_capacity(data.len() + 1);
    for &byte in data {
        if byte == b'\r' {
            echo.extend_from_slice(b"\r\n");
        } else {
            echo.push(byte);
        }
    }
    echo
}

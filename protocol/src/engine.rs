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

//! Per-connection engine context
//!
//! [`TelnetEngine`] owns everything the daemon tracks about one connection: the
//! negotiation table, the receive automaton, the sub-negotiation accumulator and the
//! bounded terminal-bound output buffer. The receive path lives in `demux`, option
//! negotiation in `negotiator` and sub-negotiation handling in `subneg`.

use crate::{
    EngineConfig, NegotiationTable, OutputBuffer, ReceiverState, TelnetOption, TerminalDriver,
    Transport, consts,
};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace, warn};

/// Which flavor of line editing the client negotiated.
///
/// Ordered so that `Kludge < Real`: a client that has sent `WILL LINEMODE` is never
/// downgraded by the TIMING-MARK probe.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum LinemodeKind {
    /// No line editing negotiated
    #[default]
    None,
    /// Pre-standard client: `WILL TM` in answer to the probe, SGA toggles line editing
    Kludge,
    /// The client enabled the LINEMODE option
    Real,
}

impl std::fmt::Display for LinemodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinemodeKind::None => write!(f, "none"),
            LinemodeKind::Kludge => write!(f, "kludge"),
            LinemodeKind::Real => write!(f, "real"),
        }
    }
}

/// Point-in-time copy of an engine's observable state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// Negotiation table
    pub table: NegotiationTable,
    /// Receive automaton state
    pub receiver: ReceiverState,
    /// Line editing flavor
    pub linemode: LinemodeKind,
    /// Lower-cased terminal type, once reported
    pub terminal_type: Option<String>,
    /// Last editing mode requested by the client
    pub requested_edit_mode: Option<u8>,
    /// `false` once the client offered to echo (4.2BSD behavior)
    pub modern_client: bool,
    /// Whether a Synch is being processed
    pub synching: bool,
    /// Bytes waiting in the terminal-bound buffer
    pub pending_output: usize,
}

/// Option negotiation and command framing state for one connection.
///
/// # Example
///
/// ```
/// use telnetd_protocol::{EngineConfig, TelnetEngine};
///
/// let engine = TelnetEngine::new(EngineConfig::default());
/// assert!(engine.pending_output().is_empty());
/// assert!(!engine.table().has_pending());
/// ```
#[derive(Debug)]
pub struct TelnetEngine {
    pub(crate) config: EngineConfig,
    pub(crate) table: NegotiationTable,
    pub(crate) receiver: ReceiverState,
    pub(crate) subnegotiation: BytesMut,
    pub(crate) output: OutputBuffer,
    pub(crate) linemode: LinemodeKind,
    pub(crate) modern_client: bool,
    pub(crate) synching: bool,
    pub(crate) requested_edit_mode: Option<u8>,
    pub(crate) terminal_type: Option<String>,
}

impl TelnetEngine {
    /// Creates an engine with every option off.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            table: NegotiationTable::new(),
            receiver: ReceiverState::Data,
            subnegotiation: BytesMut::with_capacity(config.subnegotiation_capacity),
            output: OutputBuffer::with_capacity(config.output_capacity),
            linemode: LinemodeKind::None,
            modern_client: true,
            synching: false,
            requested_edit_mode: None,
            terminal_type: None,
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Negotiation table.
    pub fn table(&self) -> &NegotiationTable {
        &self.table
    }

    /// Current receive automaton state.
    pub fn receiver_state(&self) -> ReceiverState {
        self.receiver
    }

    /// Negotiated line editing flavor.
    pub fn linemode_kind(&self) -> LinemodeKind {
        self.linemode
    }

    /// Terminal type reported by the client.
    pub fn terminal_type(&self) -> Option<&str> {
        self.terminal_type.as_deref()
    }

    /// Editing mode last requested through LINEMODE MODE.
    pub fn requested_edit_mode(&self) -> Option<u8> {
        self.requested_edit_mode
    }

    /// `false` once the client has offered `WILL ECHO`, until it sends `WONT ECHO`.
    pub fn is_modern_client(&self) -> bool {
        self.modern_client
    }

    /// Whether the last Data Mark arrived while urgent data was still outstanding.
    pub fn is_synching(&self) -> bool {
        self.synching
    }

    /// Terminal-bound bytes not yet flushed.
    pub fn pending_output(&self) -> &[u8] {
        self.output.as_slice()
    }

    /// Copy of the engine's observable state.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            table: self.table.clone(),
            receiver: self.receiver,
            linemode: self.linemode,
            terminal_type: self.terminal_type.clone(),
            requested_edit_mode: self.requested_edit_mode,
            modern_client: self.modern_client,
            synching: self.synching,
            pending_output: self.output.len(),
        }
    }

    /// Hand buffered terminal-bound bytes to the driver.
    pub fn flush_output<S: TerminalDriver + ?Sized>(&mut self, session: &mut S) {
        if !self.output.is_empty() {
            trace!(bytes = self.output.len(), "flushing terminal output");
            session.write_input(self.output.as_slice());
            self.output.clear();
        }
    }

    /// Remove buffered terminal-bound bytes without going through the driver.
    pub fn take_output(&mut self) -> Bytes {
        self.output.take()
    }

    /// Queue application data for the peer, doubling IAC.
    pub fn send_data<S: Transport + ?Sized>(&self, session: &mut S, data: &[u8]) {
        let mut escaped = BytesMut::with_capacity(data.len() + data.len() / 8);
        for &byte in data {
            escaped.put_u8(byte);
            if byte == consts::IAC {
                escaped.put_u8(consts::IAC);
            }
        }
        write_network(session, &escaped);
    }

    /// Append one byte to the terminal-bound buffer.
    pub(crate) fn emit(&mut self, byte: u8) {
        if let Err(error) = self.output.put(byte) {
            warn!(%error, byte, "dropping terminal-bound byte");
        }
    }

    /// Transmit `IAC <command> <option>`.
    pub(crate) fn send_command<S: Transport + ?Sized>(
        &self,
        session: &mut S,
        command: u8,
        option: u8,
    ) {
        debug!(
            command = command_name(command),
            option = %TelnetOption::from(option),
            "sending negotiation"
        );
        write_network(session, &[consts::IAC, command, option]);
    }
}

/// Queue bytes on the transport, flushing first when it is short on room.
pub(crate) fn write_network<S: Transport + ?Sized>(session: &mut S, bytes: &[u8]) {
    if !session.has_capacity(bytes.len()) {
        session.flush();
    }
    session.write(bytes);
}

pub(crate) fn command_name(command: u8) -> &'static str {
    match command {
        consts::WILL => "WILL",
        consts::WONT => "WONT",
        consts::DO => "DO",
        consts::DONT => "DONT",
        _ => "?",
    }
}

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

//! In-memory collaborators for one connection's engine
//!
//! [`DaemonSession`] implements every collaborator trait the protocol engine
//! needs. Network output is staged in a [`NetworkBuffer`], terminal attributes
//! and terminal-bound data in [`TerminalModes`], line editing state in a
//! [`LineDiscipline`], process signals are queued as [`SessionSignal`]s and timer
//! events are stamped in a [`TimerLog`]. The connection task drains all of them
//! after each engine call.

mod editor;
mod modes;
mod network;

pub use self::editor::LineDiscipline;
pub use self::modes::{ModeFlags, TerminalModes};
pub use self::network::NetworkBuffer;

use std::collections::HashMap;
use std::time::Instant;
use telnetd_protocol::linemode::SlcFunction;
use telnetd_protocol::{
    ClientStatus, LineEditor, ProcessControl, TerminalDriver, TimerKind, Timers, Transport,
};
use tracing::debug;

/// A signal for the process attached to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionSignal {
    /// Interrupt Process
    Interrupt,
    /// Break or Abort
    Break,
    /// Suspend
    Suspend,
    /// End of file
    EndOfFile,
}

impl std::fmt::Display for SessionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interrupt => write!(f, "interrupt"),
            Self::Break => write!(f, "break"),
            Self::Suspend => write!(f, "suspend"),
            Self::EndOfFile => write!(f, "eof"),
        }
    }
}

/// When each housekeeping event last happened.
#[derive(Debug, Default)]
pub struct TimerLog {
    stamps: HashMap<TimerKind, Instant>,
}

impl TimerLog {
    /// Last time `kind` was armed
    pub fn last(&self, kind: TimerKind) -> Option<Instant> {
        self.stamps.get(&kind).copied()
    }
}

impl Timers for TimerLog {
    fn arm(&mut self, kind: TimerKind) {
        self.stamps.insert(kind, Instant::now());
    }
}

/// Every collaborator for one connection.
#[derive(Debug)]
pub struct DaemonSession {
    network: NetworkBuffer,
    terminal: TerminalModes,
    editor: LineDiscipline,
    signals: Vec<SessionSignal>,
    timers: TimerLog,
}

impl DaemonSession {
    /// Session with a network buffer of `network_capacity` bytes and the given
    /// initial terminal attributes.
    pub fn new(network_capacity: usize, modes: ModeFlags) -> Self {
        Self {
            network: NetworkBuffer::with_capacity(network_capacity),
            terminal: TerminalModes::new(modes),
            editor: LineDiscipline::default(),
            signals: Vec::new(),
            timers: TimerLog::default(),
        }
    }

    /// Network output staging
    pub fn network(&self) -> &NetworkBuffer {
        &self.network
    }

    /// Mutable network output staging
    pub fn network_mut(&mut self) -> &mut NetworkBuffer {
        &mut self.network
    }

    /// Terminal attributes and input
    pub fn terminal(&self) -> &TerminalModes {
        &self.terminal
    }

    /// Mutable terminal attributes and input
    pub fn terminal_mut(&mut self) -> &mut TerminalModes {
        &mut self.terminal
    }

    /// Line discipline state
    pub fn editor(&self) -> &LineDiscipline {
        &self.editor
    }

    /// Mutable line discipline state
    pub fn editor_mut(&mut self) -> &mut LineDiscipline {
        &mut self.editor
    }

    /// Timer stamps
    pub fn timers(&self) -> &TimerLog {
        &self.timers
    }

    /// Signals raised since the last call, oldest first.
    pub fn take_signals(&mut self) -> Vec<SessionSignal> {
        std::mem::take(&mut self.signals)
    }

    /// Whether input should be echoed back by the daemon.
    ///
    /// Echo is off while the client edits lines itself.
    pub fn should_echo(&self) -> bool {
        self.terminal.echo() && !self.editor.is_line_mode()
    }

    fn raise(&mut self, signal: SessionSignal) {
        debug!(%signal, "signal raised");
        self.signals.push(signal);
    }
}

impl Transport for DaemonSession {
    fn write(&mut self, bytes: &[u8]) {
        self.network.write(bytes);
    }

    fn flush(&mut self) {
        self.network.flush();
    }

    fn clear_pending(&mut self) {
        self.network.clear_pending();
    }

    fn has_capacity(&self, additional: usize) -> bool {
        self.network.has_capacity(additional)
    }

    fn mark_urgent(&mut self) {
        self.network.mark_urgent();
    }
}

impl TerminalDriver for DaemonSession {
    fn begin(&mut self) {
        self.terminal.begin();
    }

    fn set_echo(&mut self, enabled: bool) {
        self.terminal.set_echo(enabled);
    }

    fn set_binary_in(&mut self, enabled: bool) {
        self.terminal.set_binary_in(enabled);
    }

    fn set_binary_out(&mut self, enabled: bool) {
        self.terminal.set_binary_out(enabled);
    }

    fn commit(&mut self) {
        self.terminal.commit();
    }

    fn write_input(&mut self, bytes: &[u8]) {
        self.terminal.write_input(bytes);
    }
}

impl ProcessControl for DaemonSession {
    fn deliver_interrupt(&mut self) {
        self.raise(SessionSignal::Interrupt);
    }

    fn deliver_break(&mut self) {
        self.raise(SessionSignal::Break);
    }

    fn deliver_suspend(&mut self) {
        self.raise(SessionSignal::Suspend);
    }

    fn deliver_end_of_file(&mut self) {
        self.raise(SessionSignal::EndOfFile);
    }
}

impl LineEditor for DaemonSession {
    fn notify(&mut self, status: ClientStatus) {
        self.editor.notify(status);
    }

    fn load_special_chars(&mut self, data: &[u8]) {
        self.editor.load_special_chars(data);
    }

    fn dump_special_chars(&self) -> Vec<u8> {
        self.editor.dump_special_chars()
    }

    fn special_char(&self, function: SlcFunction) -> Option<u8> {
        self.editor.special_char(function)
    }

    fn is_line_mode(&self) -> bool {
        self.editor.is_line_mode()
    }

    fn edit_mode(&self) -> u8 {
        self.editor.edit_mode()
    }
}

impl Timers for DaemonSession {
    fn arm(&mut self, kind: TimerKind) {
        self.timers.arm(kind);
    }
}

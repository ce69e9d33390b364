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

//! Collaborators driven by the engine.
//!
//! The engine never touches sockets, terminals or processes itself. Everything it
//! needs from the outside world goes through these traits, bundled as [`Session`] and
//! passed by `&mut` into each engine call.

use crate::linemode::SlcFunction;
use crate::naws::WindowSize;
use crate::tspeed::TerminalSpeed;

/// Outbound network stream.
pub trait Transport {
    /// Queue bytes for the peer.
    fn write(&mut self, bytes: &[u8]);

    /// Push queued bytes toward the peer.
    fn flush(&mut self);

    /// Drop queued bytes that have not been flushed.
    fn clear_pending(&mut self);

    /// Whether `additional` more bytes can be queued without exceeding the buffer.
    fn has_capacity(&self, additional: usize) -> bool;

    /// Mark the most recently queued byte as the end of urgent data.
    fn mark_urgent(&mut self);

    /// Whether urgent data from the peer is still being received.
    fn has_urgent_data(&self) -> bool {
        false
    }
}

/// Terminal attribute control and terminal-bound input.
///
/// Attribute changes are bracketed by [`begin`](TerminalDriver::begin) and
/// [`commit`](TerminalDriver::commit).
pub trait TerminalDriver {
    /// Start staging an attribute change.
    fn begin(&mut self);

    /// Local echo on or off.
    fn set_echo(&mut self, enabled: bool);

    /// Binary input (peer sends binary) on or off.
    fn set_binary_in(&mut self, enabled: bool);

    /// Binary output (daemon sends binary) on or off.
    fn set_binary_out(&mut self, enabled: bool);

    /// Apply the staged change.
    fn commit(&mut self);

    /// Deliver demultiplexed data to the terminal.
    fn write_input(&mut self, bytes: &[u8]);
}

/// Signals for the process attached to the terminal.
pub trait ProcessControl {
    /// Interrupt Process
    fn deliver_interrupt(&mut self);
    /// Break or Abort
    fn deliver_break(&mut self);
    /// Suspend
    fn deliver_suspend(&mut self);
    /// End of file
    fn deliver_end_of_file(&mut self);
}

/// Client state changes reported to the line editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientStatus {
    /// The client asked for line editing on or off
    Linemode(bool),
    /// Remote flow control negotiated on or off
    RemoteFlowControl(bool),
    /// Terminal speed report
    TerminalSpeed(TerminalSpeed),
    /// Window size report
    WindowSize(WindowSize),
    /// Editing mode requested through LINEMODE MODE
    EditMode(u8),
}

/// Line editing subsystem, owner of the special character table.
pub trait LineEditor {
    /// Apply a client state change.
    fn notify(&mut self, status: ClientStatus);

    /// Load special character triplets sent by the client.
    fn load_special_chars(&mut self, data: &[u8]);

    /// Current special character table as triplets.
    fn dump_special_chars(&self) -> Vec<u8>;

    /// Character bound to `function`, if any.
    fn special_char(&self, function: SlcFunction) -> Option<u8>;

    /// Whether line editing is active.
    fn is_line_mode(&self) -> bool;

    /// Current editing mode byte.
    fn edit_mode(&self) -> u8;
}

/// Housekeeping timers the engine arms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// A Data Mark arrived
    DataMark,
    /// A terminal speed sub-negotiation arrived
    TerminalSpeed,
    /// A terminal type sub-negotiation arrived
    TerminalType,
}

/// Timer facility.
pub trait Timers {
    /// Record that `kind` happened now.
    fn arm(&mut self, kind: TimerKind);
}

/// Every collaborator the engine talks to.
pub trait Session: Transport + TerminalDriver + ProcessControl + LineEditor + Timers {}

impl<T> Session for T where T: Transport + TerminalDriver + ProcessControl + LineEditor + Timers {}

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

//! Recording session used by the unit tests.

use crate::linemode::SlcFunction;
use crate::{
    ClientStatus, LineEditor, ProcessControl, TelnetEngine, TelnetOption, TerminalDriver,
    TimerKind, Timers, Transport, consts,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Begin,
    Echo(bool),
    BinaryIn(bool),
    BinaryOut(bool),
    Commit,
    Interrupt,
    Break,
    Suspend,
    EndOfFile,
    Notify(ClientStatus),
    LoadSpecialChars(Vec<u8>),
    Arm(TimerKind),
    Flush,
    ClearPending,
    MarkUrgent,
}

#[derive(Debug, Default)]
pub(crate) struct MockSession {
    pub network: Vec<u8>,
    pub terminal: Vec<u8>,
    pub calls: Vec<Call>,
    pub line_mode: bool,
    pub edit_mode: u8,
    pub special_chars: Vec<(SlcFunction, u8)>,
    pub urgent: bool,
    /// Transport buffer size, `None` for unbounded
    pub network_capacity: Option<usize>,
    pub unflushed: usize,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_call(&self, call: &Call) -> bool {
        self.calls.contains(call)
    }

    pub fn notifications(&self) -> Vec<ClientStatus> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Notify(status) => Some(*status),
                _ => None,
            })
            .collect()
    }
}

impl Transport for MockSession {
    fn write(&mut self, bytes: &[u8]) {
        self.network.extend_from_slice(bytes);
        self.unflushed += bytes.len();
    }

    fn flush(&mut self) {
        self.calls.push(Call::Flush);
        self.unflushed = 0;
    }

    fn clear_pending(&mut self) {
        self.calls.push(Call::ClearPending);
    }

    fn has_capacity(&self, additional: usize) -> bool {
        self.network_capacity
            .is_none_or(|capacity| self.unflushed + additional <= capacity)
    }

    fn mark_urgent(&mut self) {
        self.calls.push(Call::MarkUrgent);
    }

    fn has_urgent_data(&self) -> bool {
        self.urgent
    }
}

impl TerminalDriver for MockSession {
    fn begin(&mut self) {
        self.calls.push(Call::Begin);
    }

    fn set_echo(&mut self, enabled: bool) {
        self.calls.push(Call::Echo(enabled));
    }

    fn set_binary_in(&mut self, enabled: bool) {
        self.calls.push(Call::BinaryIn(enabled));
    }

    fn set_binary_out(&mut self, enabled: bool) {
        self.calls.push(Call::BinaryOut(enabled));
    }

    fn commit(&mut self) {
        self.calls.push(Call::Commit);
    }

    fn write_input(&mut self, bytes: &[u8]) {
        self.terminal.extend_from_slice(bytes);
    }
}

impl ProcessControl for MockSession {
    fn deliver_interrupt(&mut self) {
        self.calls.push(Call::Interrupt);
    }

    fn deliver_break(&mut self) {
        self.calls.push(Call::Break);
    }

    fn deliver_suspend(&mut self) {
        self.calls.push(Call::Suspend);
    }

    fn deliver_end_of_file(&mut self) {
        self.calls.push(Call::EndOfFile);
    }
}

impl LineEditor for MockSession {
    fn notify(&mut self, status: ClientStatus) {
        self.calls.push(Call::Notify(status));
    }

    fn load_special_chars(&mut self, data: &[u8]) {
        self.calls.push(Call::LoadSpecialChars(data.to_vec()));
    }

    fn dump_special_chars(&self) -> Vec<u8> {
        self.special_chars
            .iter()
            .flat_map(|(function, value)| [function.to_byte(), 0x02, *value])
            .collect()
    }

    fn special_char(&self, function: SlcFunction) -> Option<u8> {
        self.special_chars
            .iter()
            .find(|(candidate, _)| *candidate == function)
            .map(|(_, value)| *value)
    }

    fn is_line_mode(&self) -> bool {
        self.line_mode
    }

    fn edit_mode(&self) -> u8 {
        self.edit_mode
    }
}

impl Timers for MockSession {
    fn arm(&mut self, kind: TimerKind) {
        self.calls.push(Call::Arm(kind));
    }
}

/// Complete a daemon-initiated `DO option` / `WILL option` exchange and forget it.
pub(crate) fn enable_remote(engine: &mut TelnetEngine, session: &mut MockSession, option: TelnetOption) {
    engine.request_remote_enable(session, option, true);
    engine.consume(session, &[consts::IAC, consts::WILL, option.to_u8()]);
    session.network.clear();
    session.calls.clear();
}

/// Complete a daemon-initiated `WILL option` / `DO option` exchange and forget it.
pub(crate) fn enable_local(engine: &mut TelnetEngine, session: &mut MockSession, option: TelnetOption) {
    engine.request_local_enable(session, option, true);
    engine.consume(session, &[consts::IAC, consts::DO, option.to_u8()]);
    session.network.clear();
    session.calls.clear();
}

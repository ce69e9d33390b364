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

//! Shared helpers for the engine tests

#![allow(dead_code)]

use telnetd_protocol::linemode::SlcFunction;
use telnetd_protocol::{
    ClientStatus, EngineConfig, LineEditor, ProcessControl, TelnetEngine, TerminalDriver,
    TimerKind, Timers, Transport,
};

/// Everything the engine asked of its session, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Echo(bool),
    BinaryIn(bool),
    BinaryOut(bool),
    Interrupt,
    Break,
    Suspend,
    EndOfFile,
    Notify(ClientStatus),
    SpecialChars(Vec<u8>),
    Timer(TimerKind),
    ClearPending,
    Urgent,
}

#[derive(Debug, Default)]
pub struct RecordingSession {
    pub network: Vec<u8>,
    pub terminal: Vec<u8>,
    pub events: Vec<Event>,
    pub flushes: usize,
    pub line_mode: bool,
    pub edit_mode: u8,
    pub special_chars: Vec<u8>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_network(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.network)
    }

    pub fn notifications(&self) -> Vec<ClientStatus> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Notify(status) => Some(*status),
                _ => None,
            })
            .collect()
    }
}

impl Transport for RecordingSession {
    fn write(&mut self, bytes: &[u8]) {
        self.network.extend_from_slice(bytes);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn clear_pending(&mut self) {
        self.events.push(Event::ClearPending);
    }

    fn has_capacity(&self, _additional: usize) -> bool {
        true
    }

    fn mark_urgent(&mut self) {
        self.events.push(Event::Urgent);
    }
}

impl TerminalDriver for RecordingSession {
    fn begin(&mut self) {}

    fn set_echo(&mut self, enabled: bool) {
        self.events.push(Event::Echo(enabled));
    }

    fn set_binary_in(&mut self, enabled: bool) {
        self.events.push(Event::BinaryIn(enabled));
    }

    fn set_binary_out(&mut self, enabled: bool) {
        self.events.push(Event::BinaryOut(enabled));
    }

    fn commit(&mut self) {}

    fn write_input(&mut self, bytes: &[u8]) {
        self.terminal.extend_from_slice(bytes);
    }
}

impl ProcessControl for RecordingSession {
    fn deliver_interrupt(&mut self) {
        self.events.push(Event::Interrupt);
    }

    fn deliver_break(&mut self) {
        self.events.push(Event::Break);
    }

    fn deliver_suspend(&mut self) {
        self.events.push(Event::Suspend);
    }

    fn deliver_end_of_file(&mut self) {
        self.events.push(Event::EndOfFile);
    }
}

impl LineEditor for RecordingSession {
    fn notify(&mut self, status: ClientStatus) {
        if let ClientStatus::Linemode(enabled) = status {
            self.line_mode = enabled;
        }
        self.events.push(Event::Notify(status));
    }

    fn load_special_chars(&mut self, data: &[u8]) {
        self.special_chars = data.to_vec();
        self.events.push(Event::SpecialChars(data.to_vec()));
    }

    fn dump_special_chars(&self) -> Vec<u8> {
        self.special_chars.clone()
    }

    fn special_char(&self, function: SlcFunction) -> Option<u8> {
        self.special_chars
            .chunks_exact(3)
            .find(|triplet| triplet[0] == function.to_byte() && triplet[2] != 0)
            .map(|triplet| triplet[2])
    }

    fn is_line_mode(&self) -> bool {
        self.line_mode
    }

    fn edit_mode(&self) -> u8 {
        self.edit_mode
    }
}

impl Timers for RecordingSession {
    fn arm(&mut self, kind: TimerKind) {
        self.events.push(Event::Timer(kind));
    }
}

/// An engine paired with the session it drives.
pub struct Endpoint {
    pub engine: TelnetEngine,
    pub session: RecordingSession,
}

impl Endpoint {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            engine: TelnetEngine::new(config),
            session: RecordingSession::new(),
        }
    }

    /// Feed all of `input`, flushing terminal output whenever the engine pauses.
    pub fn receive(&mut self, input: &[u8]) {
        let mut rest = input;
        while !rest.is_empty() {
            let consumed = self.engine.consume(&mut self.session, rest);
            self.engine.flush_output(&mut self.session);
            rest = &rest[consumed..];
        }
        self.engine.flush_output(&mut self.session);
    }
}

/// Shuttle bytes between two endpoints until neither has anything to send.
///
/// Returns the number of rounds taken, or `None` if still talking after `limit`.
pub fn exchange(a: &mut Endpoint, b: &mut Endpoint, limit: usize) -> Option<usize> {
    for round in 0..limit {
        let a_out = a.session.take_network();
        let b_out = b.session.take_network();
        if a_out.is_empty() && b_out.is_empty() {
            return Some(round);
        }
        b.receive(&a_out);
        a.receive(&b_out);
    }
    None
}

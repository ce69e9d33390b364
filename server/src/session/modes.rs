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

//! Terminal attributes and terminal-bound input

use bytes::{Bytes, BytesMut};
use telnetd_protocol::TerminalDriver;
use tracing::debug;

/// Terminal attributes the engine can change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeFlags {
    /// The daemon echoes input back to the peer
    pub echo: bool,
    /// The peer sends 8-bit data
    pub binary_in: bool,
    /// The daemon sends 8-bit data
    pub binary_out: bool,
}

/// In-memory terminal with staged attribute changes.
#[derive(Debug, Default)]
pub struct TerminalModes {
    current: ModeFlags,
    staged: Option<ModeFlags>,
    input: BytesMut,
}

impl TerminalModes {
    /// Terminal with the given initial attributes.
    pub fn new(initial: ModeFlags) -> Self {
        Self {
            current: initial,
            ..Self::default()
        }
    }

    /// Attributes currently in effect
    pub fn current(&self) -> ModeFlags {
        self.current
    }

    /// Whether echo is in effect
    pub fn echo(&self) -> bool {
        self.current.echo
    }

    /// Data delivered since the last call.
    pub fn take_input(&mut self) -> Bytes {
        self.input.split().freeze()
    }

    fn target(&mut self) -> &mut ModeFlags {
        match &mut self.staged {
            Some(staged) => staged,
            None => &mut self.current,
        }
    }
}

impl TerminalDriver for TerminalModes {
    fn begin(&mut self) {
        self.staged = Some(self.current);
    }

    fn set_echo(&mut self, enabled: bool) {
        self.target().echo = enabled;
    }

    fn set_binary_in(&mut self, enabled: bool) {
        self.target().binary_in = enabled;
    }

    fn set_binary_out(&mut self, enabled: bool) {
        self.target().binary_out = enabled;
    }

    fn commit(&mut self) {
        if let Some(staged) = self.staged.take()
            && staged != self.current
        {
            debug!(from = ?self.current, to = ?staged, "terminal modes changed");
            self.current = staged;
        }
    }

    fn write_input(&mut self, bytes: &[u8]) {
        self.input.extend_from_slice(bytes);
    }
}

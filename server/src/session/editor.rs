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

//! Line discipline state: special characters, editing mode and client reports

use std::collections::BTreeMap;
use telnetd_protocol::linemode::{LineModeFlags, SlcDefinition, SlcFlags, SlcFunction, SlcLevel};
use telnetd_protocol::naws::WindowSize;
use telnetd_protocol::tspeed::TerminalSpeed;
use telnetd_protocol::{ClientStatus, LineEditor};
use tracing::{debug, trace};

/// Special characters of a pty in cooked mode.
const DEFAULT_SPECIAL_CHARS: &[(SlcFunction, u8)] = &[
    (SlcFunction::Ip, 0x03),
    (SlcFunction::Ao, 0x0F),
    (SlcFunction::Ayt, 0x14),
    (SlcFunction::Abort, 0x1C),
    (SlcFunction::Eof, 0x04),
    (SlcFunction::Susp, 0x1A),
    (SlcFunction::Ec, 0x7F),
    (SlcFunction::El, 0x15),
    (SlcFunction::Ew, 0x17),
    (SlcFunction::Rp, 0x12),
    (SlcFunction::Lnext, 0x16),
    (SlcFunction::Xon, 0x11),
    (SlcFunction::Xoff, 0x13),
];

fn default_definition(function: SlcFunction) -> SlcDefinition {
    let value = DEFAULT_SPECIAL_CHARS
        .iter()
        .find(|(candidate, _)| *candidate == function)
        .map(|(_, value)| *value);
    match value {
        Some(value) => {
            let mut flags = SlcFlags::level(SlcLevel::Value);
            if matches!(function, SlcFunction::Ip | SlcFunction::Abort) {
                flags.flushin = true;
                flags.flushout = true;
            }
            SlcDefinition {
                function,
                flags,
                value,
            }
        }
        None => SlcDefinition {
            function,
            flags: SlcFlags::level(SlcLevel::NoSupport),
            value: 0,
        },
    }
}

/// Reference [`LineEditor`] holding the state a pty line discipline would.
#[derive(Debug)]
pub struct LineDiscipline {
    special_chars: BTreeMap<u8, SlcDefinition>,
    line_mode: bool,
    edit_mode: u8,
    flow_control: bool,
    speed: Option<TerminalSpeed>,
    window_size: Option<WindowSize>,
    window_changed: bool,
}

impl Default for LineDiscipline {
    fn default() -> Self {
        let special_chars = DEFAULT_SPECIAL_CHARS
            .iter()
            .map(|(function, _)| (function.to_byte(), default_definition(*function)))
            .collect();
        Self {
            special_chars,
            line_mode: false,
            edit_mode: 0,
            flow_control: false,
            speed: None,
            window_size: None,
            window_changed: false,
        }
    }
}

impl LineDiscipline {
    /// Whether the client agreed to remote flow control
    pub fn flow_control(&self) -> bool {
        self.flow_control
    }

    /// Last reported terminal speed
    pub fn speed(&self) -> Option<TerminalSpeed> {
        self.speed
    }

    /// Last reported window size
    pub fn window_size(&self) -> Option<WindowSize> {
        self.window_size
    }

    /// The window size, if it changed since the last call.
    pub fn take_window_change(&mut self) -> Option<WindowSize> {
        if std::mem::take(&mut self.window_changed) {
            self.window_size
        } else {
            None
        }
    }

    /// Current definition for `function`
    pub fn definition(&self, function: SlcFunction) -> Option<&SlcDefinition> {
        self.special_chars.get(&function.to_byte())
    }
}

impl LineEditor for LineDiscipline {
    fn notify(&mut self, status: ClientStatus) {
        debug!(?status, "client status");
        match status {
            ClientStatus::Linemode(enabled) => {
                self.line_mode = enabled;
                if enabled && self.edit_mode == 0 {
                    self.edit_mode = LineModeFlags::EDIT | LineModeFlags::TRAPSIG;
                }
            }
            ClientStatus::RemoteFlowControl(enabled) => self.flow_control = enabled,
            ClientStatus::TerminalSpeed(speed) => self.speed = Some(speed),
            ClientStatus::WindowSize(size) => {
                self.window_changed |= self.window_size != Some(size);
                self.window_size = Some(size);
            }
            ClientStatus::EditMode(mode) => {
                self.edit_mode = mode;
                self.line_mode = LineModeFlags::from_byte(mode).edit();
            }
        }
    }

    fn load_special_chars(&mut self, data: &[u8]) {
        for definition in SlcDefinition::parse_all(data) {
            let code = definition.function.to_byte();
            if code == 0 {
                continue;
            }
            let stored = match definition.flags.level {
                SlcLevel::Default => default_definition(definition.function),
                SlcLevel::NoSupport => SlcDefinition {
                    flags: SlcFlags::level(SlcLevel::NoSupport),
                    value: 0,
                    ..definition
                },
                SlcLevel::Value | SlcLevel::CantChange => SlcDefinition {
                    flags: SlcFlags {
                        ack: false,
                        ..definition.flags
                    },
                    ..definition
                },
            };
            trace!(function = %definition.function, value = stored.value, "special character");
            self.special_chars.insert(code, stored);
        }
    }

    fn dump_special_chars(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.special_chars.len() * 3);
        for definition in self.special_chars.values() {
            definition.serialize(&mut data);
        }
        data
    }

    fn special_char(&self, function: SlcFunction) -> Option<u8> {
        self.definition(function)
            .filter(|definition| definition.flags.level != SlcLevel::NoSupport)
            .map(|definition| definition.value)
            .filter(|&value| value != 0)
    }

    fn is_line_mode(&self) -> bool {
        self.line_mode
    }

    fn edit_mode(&self) -> u8 {
        self.edit_mode
    }
}

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

//! Engine configuration
//!
//! ```
//! use telnetd_protocol::{EngineConfig, SupportTable, TelnetOption};
//!
//! let config = EngineConfig::default()
//!     .with_subnegotiation_capacity(256)
//!     .with_kludge_linemode(false)
//!     .with_support(SupportTable::default().with_remote(TelnetOption::EOR, false));
//! assert!(config.validate().is_ok());
//! ```

use crate::{TelnetOption, TelnetSide};

/// Which options the daemon is willing to enable, per direction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct SupportState {
    /// Whether we support this option from us -> them.
    local: bool,
    /// Whether we support this option from them -> us.
    remote: bool,
}

/// Acceptance policy consulted when the peer asks for an option to be enabled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportTable {
    entries: Box<[SupportState; 256]>,
}

impl SupportTable {
    /// A table that refuses every option.
    pub fn none() -> Self {
        Self {
            entries: Box::new([SupportState::default(); 256]),
        }
    }

    /// Allow or refuse the daemon performing `option`.
    pub fn with_local(mut self, option: TelnetOption, supported: bool) -> Self {
        self.entries[usize::from(option.to_u8())].local = supported;
        self
    }

    /// Allow or refuse the peer performing `option`.
    pub fn with_remote(mut self, option: TelnetOption, supported: bool) -> Self {
        self.entries[usize::from(option.to_u8())].remote = supported;
        self
    }

    /// Whether the daemon agrees to perform `option`.
    pub fn supports_local(&self, option: TelnetOption) -> bool {
        self.entries[usize::from(option.to_u8())].local
    }

    /// Whether the daemon agrees to let the peer perform `option`.
    pub fn supports_remote(&self, option: TelnetOption) -> bool {
        self.entries[usize::from(option.to_u8())].remote
    }

    /// Support for `option` on the given side.
    pub fn supports(&self, side: TelnetSide, option: TelnetOption) -> bool {
        match side {
            TelnetSide::Local => self.supports_local(option),
            TelnetSide::Remote => self.supports_remote(option),
        }
    }
}

impl Default for SupportTable {
    fn default() -> Self {
        use TelnetOption::{
            EOR, Echo, LFLOW, Linemode, NAWS, Status, SuppressGoAhead, TSPEED, TTYPE, TimingMark,
            TransmitBinary,
        };
        let table = [
            TransmitBinary,
            Echo,
            SuppressGoAhead,
            Status,
            TimingMark,
            TTYPE,
            NAWS,
            TSPEED,
            LFLOW,
            Linemode,
        ]
        .into_iter()
        .fold(Self::none(), |table, option| table.with_local(option, true));
        [
            TransmitBinary,
            Echo,
            SuppressGoAhead,
            Status,
            TimingMark,
            TTYPE,
            EOR,
            NAWS,
            TSPEED,
            LFLOW,
            Linemode,
        ]
        .into_iter()
        .fold(table, |table, option| table.with_remote(option, true))
    }
}

/// Per-connection engine configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Capacity of the sub-negotiation accumulator. Excess payload bytes are dropped.
    pub subnegotiation_capacity: usize,

    /// Maximum number of terminal type characters retained.
    pub terminal_type_capacity: usize,

    /// Capacity of the buffer holding data bound for the terminal driver.
    ///
    /// Processing pauses when fewer than two bytes remain.
    pub output_capacity: usize,

    /// Detect pre-standard clients that signal line editing through TIMING-MARK and SGA.
    pub kludge_linemode: bool,

    /// Options the daemon agrees to enable.
    pub support: SupportTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            subnegotiation_capacity: 100,
            terminal_type_capacity: 40,
            output_capacity: 4096,
            kludge_linemode: true,
            support: SupportTable::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sub-negotiation accumulator capacity
    pub fn with_subnegotiation_capacity(mut self, capacity: usize) -> Self {
        self.subnegotiation_capacity = capacity;
        self
    }

    /// Set the terminal type capacity
    pub fn with_terminal_type_capacity(mut self, capacity: usize) -> Self {
        self.terminal_type_capacity = capacity;
        self
    }

    /// Set the terminal-bound output capacity
    pub fn with_output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity;
        self
    }

    /// Enable or disable kludge line-mode detection
    pub fn with_kludge_linemode(mut self, enabled: bool) -> Self {
        self.kludge_linemode = enabled;
        self
    }

    /// Replace the acceptance policy
    pub fn with_support(mut self, support: SupportTable) -> Self {
        self.support = support;
        self
    }

    /// Validate the configuration
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.subnegotiation_capacity == 0 {
            return Err("subnegotiation_capacity must be greater than 0".to_string());
        }

        if self.terminal_type_capacity == 0 {
            return Err("terminal_type_capacity must be greater than 0".to_string());
        }

        if self.output_capacity < 2 {
            return Err("output_capacity must be at least 2".to_string());
        }

        Ok(())
    }
}

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

//! Negotiation Table
//!
//! One [`OptionState`] per option code. Each side of an option carries three values:
//!
//! - `enabled`: the last announced state, which also reflects what the peer believes
//! - `wanted`: the state this end is steering toward
//! - `pending`: how many of our requests are still awaiting an answer
//!
//! Fields are only mutated by the negotiator's transition rules; callers get read access.

use crate::TelnetSide;

/// Binary negotiation value.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum YesNo {
    /// Option off
    #[default]
    No,
    /// Option on
    Yes,
}

impl YesNo {
    /// Returns `true` for [`YesNo::Yes`].
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value { YesNo::Yes } else { YesNo::No }
    }
}

impl std::fmt::Display for YesNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YesNo::No => write!(f, "No"),
            YesNo::Yes => write!(f, "Yes"),
        }
    }
}

/// Negotiation state of one direction of an option.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SideState {
    enabled: YesNo,
    wanted: YesNo,
    pending: u32,
}

impl SideState {
    /// Last announced state.
    pub fn enabled(&self) -> YesNo {
        self.enabled
    }

    /// State this end is steering toward.
    pub fn wanted(&self) -> YesNo {
        self.wanted
    }

    /// Number of requests sent that have not been answered yet.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Apply the initiation rule. Returns `true` when a request must be transmitted.
    pub(crate) fn initiate(&mut self, desired: YesNo) -> bool {
        if (self.pending == 0 && self.enabled == desired) || self.wanted == desired {
            return false;
        }
        self.wanted = desired;
        self.pending += 1;
        true
    }

    /// Account for an incoming announcement against the outstanding requests.
    ///
    /// When more than one request is outstanding and the announcement matches the
    /// recorded state, the peer is answering a request that was already superseded,
    /// so two responses are consumed.
    pub(crate) fn acknowledge(&mut self, announced: YesNo) {
        if self.pending > 0 {
            self.pending -= 1;
            if self.pending > 0 && announced == self.enabled {
                self.pending -= 1;
            }
        }
    }

    /// Whether the announcement is unsolicited and needs an accept/refuse decision.
    pub(crate) fn needs_decision(&self, announced: YesNo) -> bool {
        self.pending == 0 && self.wanted != announced
    }

    pub(crate) fn want(&mut self, wanted: YesNo) {
        self.wanted = wanted;
    }

    /// Refusal sends a counter-request, which the peer will answer.
    pub(crate) fn refuse(&mut self) {
        self.pending = self.pending.saturating_add(1);
    }

    pub(crate) fn record(&mut self, announced: YesNo) {
        self.enabled = announced;
    }
}

/// Per-option negotiation record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OptionState {
    local: SideState,
    remote: SideState,
}

impl OptionState {
    /// State of the given direction.
    pub fn side(&self, side: TelnetSide) -> &SideState {
        match side {
            TelnetSide::Local => &self.local,
            TelnetSide::Remote => &self.remote,
        }
    }

    pub(crate) fn side_mut(&mut self, side: TelnetSide) -> &mut SideState {
        match side {
            TelnetSide::Local => &mut self.local,
            TelnetSide::Remote => &mut self.remote,
        }
    }

    /// Whether the daemon performs the option.
    pub fn local_enabled(&self) -> YesNo {
        self.local.enabled
    }

    /// Whether the peer performs the option.
    pub fn remote_enabled(&self) -> YesNo {
        self.remote.enabled
    }

    /// State the daemon is steering its own side toward.
    pub fn local_wanted(&self) -> YesNo {
        self.local.wanted
    }

    /// State the daemon wants the peer to be in.
    pub fn remote_wanted(&self) -> YesNo {
        self.remote.wanted
    }

    /// Outstanding WILL/WONT requests.
    pub fn pending_local_resp(&self) -> u32 {
        self.local.pending
    }

    /// Outstanding DO/DONT requests.
    pub fn pending_remote_resp(&self) -> u32 {
        self.remote.pending
    }
}

/// Negotiation state for every option code, owned by one connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegotiationTable {
    entries: Box<[OptionState; 256]>,
}

impl NegotiationTable {
    /// Creates a table with every option off and nothing pending.
    pub fn new() -> Self {
        Self {
            entries: Box::new([OptionState::default(); 256]),
        }
    }

    /// Record for an option code.
    pub fn get(&self, option: u8) -> &OptionState {
        &self.entries[usize::from(option)]
    }

    pub(crate) fn get_mut(&mut self, option: u8) -> &mut OptionState {
        &mut self.entries[usize::from(option)]
    }

    /// Whether the daemon currently performs `option`.
    pub fn local_enabled(&self, option: u8) -> bool {
        self.get(option).local_enabled().is_yes()
    }

    /// Whether the peer currently performs `option`.
    pub fn remote_enabled(&self, option: u8) -> bool {
        self.get(option).remote_enabled().is_yes()
    }

    /// Iterates all records in ascending option order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &OptionState)> {
        (0..=u8::MAX).zip(self.entries.iter())
    }

    /// Whether any request in either direction is still awaiting an answer.
    pub fn has_pending(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.local.pending > 0 || entry.remote.pending > 0)
    }
}

impl Default for NegotiationTable {
    fn default() -> Self {
        Self::new()
    }
}

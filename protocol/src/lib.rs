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

//! # Telnet Daemon Protocol Engine
//!
//! The server half of the Telnet protocol (RFC 854) as a telnet daemon speaks it: the
//! inbound byte stream is split into terminal data, commands, option negotiations and
//! sub-negotiations, and options are negotiated without loops using the Q-method
//! bookkeeping of RFC 1143.
//!
//! ## Core Components
//!
//! ### [`TelnetEngine`]
//!
//! Per-connection context. [`TelnetEngine::consume`] runs the receive automaton over
//! inbound bytes; the `request_*` methods start negotiations; the `on_peer_*` methods
//! handle announcements from the peer.
//!
//! ### [`NegotiationTable`]
//!
//! For each of the 256 option codes, the enabled state, the wanted state and the
//! number of unanswered requests, independently for each direction.
//!
//! ### [`Session`]
//!
//! The engine performs no I/O. Network output, terminal attributes, process signals,
//! line editing and timers are reached through the traits bundled in [`Session`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use telnetd_protocol::{EngineConfig, Session, TelnetEngine, TelnetOption};
//!
//! fn greet<S: Session>(session: &mut S, inbound: &[u8]) {
//!     let mut engine = TelnetEngine::new(EngineConfig::default());
//!     engine.request_remote_enable(session, TelnetOption::TTYPE, true);
//!     engine.request_local_enable(session, TelnetOption::Echo, true);
//!
//!     let mut rest = inbound;
//!     while !rest.is_empty() {
//!         let consumed = engine.consume(session, rest);
//!         engine.flush_output(session);
//!         rest = &rest[consumed..];
//!     }
//! }
//! ```
//!
//! ## Supported Options
//!
//! BINARY, ECHO, SUPPRESS-GO-AHEAD, STATUS, TIMING-MARK, TERMINAL-TYPE, END-OF-RECORD,
//! NAWS, TERMINAL-SPEED, REMOTE-FLOW-CONTROL and LINEMODE. Which ones the daemon
//! agrees to is controlled by [`SupportTable`]; every other option is refused.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod args;
mod config;
pub mod consts;
mod demux;
mod engine;
mod negotiator;
mod options;
mod output;
mod result;
mod session;
mod subneg;
mod table;

#[cfg(test)]
mod testing;

pub use self::args::{linemode, naws, status, tspeed, ttype};
pub use self::config::{EngineConfig, SupportTable};
pub use self::demux::ReceiverState;
pub use self::engine::{EngineSnapshot, LinemodeKind, TelnetEngine};
pub use self::options::{TelnetOption, TelnetSide};
pub use self::output::OutputBuffer;
pub use self::result::{CodecError, CodecResult, SubnegotiationErrorKind};
pub use self::session::{
    ClientStatus, LineEditor, ProcessControl, Session, TerminalDriver, TimerKind, Timers,
    Transport,
};
pub use self::table::{NegotiationTable, OptionState, SideState, YesNo};

#[cfg(test)]
mod tests {
    use super::testing::MockSession;
    use super::{EngineConfig, LinemodeKind, ReceiverState, TelnetEngine, TelnetOption, consts};

    #[test]
    fn engine_starts_idle() {
        let engine = TelnetEngine::new(EngineConfig::default());
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.receiver, ReceiverState::Data);
        assert_eq!(snapshot.linemode, LinemodeKind::None);
        assert!(snapshot.modern_client);
        assert!(!snapshot.synching);
        assert_eq!(snapshot.terminal_type, None);
        assert!(!snapshot.table.has_pending());
    }

    #[test]
    fn greeting_round_trip() {
        let mut engine = TelnetEngine::new(EngineConfig::default());
        let mut session = MockSession::new();

        engine.request_remote_enable(&mut session, TelnetOption::TTYPE, true);
        assert_eq!(session.network, [consts::IAC, consts::DO, consts::option::TTYPE]);

        let reply = [
            consts::IAC,
            consts::WILL,
            consts::option::TTYPE,
            b'h',
            b'i',
        ];
        assert_eq!(engine.consume(&mut session, &reply), reply.len());
        engine.flush_output(&mut session);

        assert_eq!(session.terminal, b"hi");
        assert!(engine.table().remote_enabled(consts::option::TTYPE));
        assert!(!engine.table().has_pending());
        // Solicited announcement, no reply.
        assert_eq!(session.network.len(), 3);
    }
}

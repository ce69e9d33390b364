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

//! Sub-negotiation interpretation and status reporting.

use crate::engine::write_network;
use crate::linemode::LinemodeRequest;
use crate::naws::WindowSize;
use crate::status::{LinemodeStatus, StatusCommand, StatusReport};
use crate::tspeed::TerminalSpeed;
use crate::{ClientStatus, CodecResult, Session, TelnetEngine, TelnetOption, TimerKind, consts};
use bytes::BytesMut;
use tracing::{debug, trace};

impl TelnetEngine {
    /// Interpret the accumulated sub-negotiation and reset the accumulator.
    ///
    /// Malformed payloads are discarded.
    pub(crate) fn interpret_subnegotiation<S: Session + ?Sized>(&mut self, session: &mut S) {
        let buffer = std::mem::take(&mut self.subnegotiation);
        if let Err(error) = self.interpret(session, &buffer) {
            trace!(%error, "discarding sub-negotiation");
        }
        self.subnegotiation = buffer;
        self.subnegotiation.clear();
    }

    fn interpret<S: Session + ?Sized>(&mut self, session: &mut S, buffer: &[u8]) -> CodecResult<()> {
        let Some((&option, payload)) = buffer.split_first() else {
            return Ok(());
        };
        match option {
            consts::option::TSPEED => {
                if !self.table.remote_enabled(option) {
                    return Ok(());
                }
                session.arm(TimerKind::TerminalSpeed);
                let speed = TerminalSpeed::decode(payload)?;
                debug!(%speed, "terminal speed");
                session.notify(ClientStatus::TerminalSpeed(speed));
            }
            consts::option::TTYPE => {
                if !self.table.remote_enabled(option) {
                    return Ok(());
                }
                session.arm(TimerKind::TerminalType);
                let name = crate::ttype::decode(payload, self.config.terminal_type_capacity)?;
                debug!(terminal_type = %name, "terminal type");
                self.terminal_type = Some(name);
            }
            consts::option::NAWS => {
                if !self.table.remote_enabled(option) {
                    return Ok(());
                }
                let size = WindowSize::decode(payload)?;
                debug!(%size, "window size");
                session.notify(ClientStatus::WindowSize(size));
            }
            consts::option::LINEMODE => {
                if !self.table.remote_enabled(option) {
                    return Ok(());
                }
                match LinemodeRequest::parse(payload)? {
                    LinemodeRequest::Slc(data) => session.load_special_chars(data),
                    LinemodeRequest::Mode(flags) => {
                        debug!(mode = %flags, "edit mode requested");
                        self.requested_edit_mode = Some(flags.to_byte());
                        session.notify(ClientStatus::EditMode(flags.to_byte()));
                    }
                    request => trace!(%request, "ignoring linemode request"),
                }
            }
            consts::option::STATUS => {
                let Some(&command) = payload.first() else {
                    return Ok(());
                };
                match StatusCommand::from_byte(command)? {
                    StatusCommand::Send => {
                        if self.table.local_enabled(option) {
                            self.send_status(session);
                        }
                    }
                    StatusCommand::Is => trace!("ignoring status report from peer"),
                }
            }
            _ => trace!(option = %TelnetOption::from(option), "ignoring sub-negotiation"),
        }
        Ok(())
    }

    /// Transmit a full `STATUS IS` report of the negotiation table.
    ///
    /// The transport is flushed before and after so the report goes out on its own.
    pub fn send_status<S: Session + ?Sized>(&self, session: &mut S) {
        session.flush();
        let linemode = LinemodeStatus {
            edit_mode: session.edit_mode(),
            special_chars: session.dump_special_chars(),
        };
        let report = StatusReport::from_table(&self.table, Some(linemode));
        let mut frame = BytesMut::new();
        report.encode(&mut frame);
        debug!(entries = report.entries.len(), bytes = frame.len(), "sending status");
        write_network(session, &frame);
        session.flush();
    }
}

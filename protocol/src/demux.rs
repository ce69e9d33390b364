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

//! Byte-stream demultiplexer
//!
//! Splits the inbound byte stream into terminal data, telnet commands, option
//! negotiations and sub-negotiations. The automaton state survives across calls so
//! a sequence may be split at any byte boundary.

use crate::engine::write_network;
use crate::linemode::SlcFunction;
use crate::{CodecError, Session, TelnetEngine, TimerKind, consts};
use bytes::BufMut;
use tracing::{trace, warn};

/// State of the receive automaton.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ReceiverState {
    /// Plain data
    #[default]
    Data,
    /// A CR was delivered; a following NUL or LF is swallowed
    CarriageReturnSeen,
    /// IAC seen, the next byte is a command
    CommandEscape,
    /// `IAC WILL` seen, the next byte is the option
    AwaitWill,
    /// `IAC WONT` seen
    AwaitWont,
    /// `IAC DO` seen
    AwaitDo,
    /// `IAC DONT` seen
    AwaitDont,
    /// Inside `IAC SB`, accumulating the payload
    SubAccumulate,
    /// IAC seen inside a sub-negotiation
    SubEscape,
}

impl std::fmt::Display for ReceiverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReceiverState::Data => "data",
            ReceiverState::CarriageReturnSeen => "cr",
            ReceiverState::CommandEscape => "iac",
            ReceiverState::AwaitWill => "will",
            ReceiverState::AwaitWont => "wont",
            ReceiverState::AwaitDo => "do",
            ReceiverState::AwaitDont => "dont",
            ReceiverState::SubAccumulate => "sb",
            ReceiverState::SubEscape => "se",
        };
        write!(f, "{name}")
    }
}

impl TelnetEngine {
    /// Process inbound bytes and return how many were consumed.
    ///
    /// Processing stops early when fewer than two bytes of terminal-bound output
    /// capacity remain. Flush with [`flush_output`](TelnetEngine::flush_output) and
    /// call again with the unconsumed remainder.
    pub fn consume<S: Session + ?Sized>(&mut self, session: &mut S, input: &[u8]) -> usize {
        let mut consumed = 0;
        while consumed < input.len() {
            if self.output.remaining() < 2 {
                trace!(consumed, remaining = input.len() - consumed, "terminal output full");
                break;
            }
            let byte = input[consumed];
            consumed += 1;
            match self.receiver {
                ReceiverState::CarriageReturnSeen => {
                    self.receiver = ReceiverState::Data;
                    if byte != consts::NUL && byte != consts::LF {
                        consumed += self.data(session, byte, &input[consumed..]);
                    }
                }
                ReceiverState::Data => {
                    consumed += self.data(session, byte, &input[consumed..]);
                }
                ReceiverState::CommandEscape => self.command(session, byte),
                ReceiverState::AwaitWill => {
                    self.receiver = ReceiverState::Data;
                    self.on_peer_will(session, byte);
                }
                ReceiverState::AwaitWont => {
                    self.receiver = ReceiverState::Data;
                    self.on_peer_wont(session, byte);
                }
                ReceiverState::AwaitDo => {
                    self.receiver = ReceiverState::Data;
                    self.on_peer_do(session, byte);
                }
                ReceiverState::AwaitDont => {
                    self.receiver = ReceiverState::Data;
                    self.on_peer_dont(session, byte);
                }
                ReceiverState::SubAccumulate => {
                    if byte == consts::IAC {
                        self.receiver = ReceiverState::SubEscape;
                    } else {
                        self.accumulate(byte);
                    }
                }
                ReceiverState::SubEscape => match byte {
                    consts::SE => self.end_subnegotiation(session, None),
                    consts::IAC => {
                        self.accumulate(consts::IAC);
                        self.receiver = ReceiverState::SubAccumulate;
                    }
                    // The peer forgot IAC SE. Take what we have and treat the
                    // byte as the command it was meant to be.
                    other => self.end_subnegotiation(session, Some(other)),
                },
            }
        }
        consumed
    }

    /// Handle one data byte. Returns the number of lookahead bytes also consumed.
    fn data<S: Session + ?Sized>(&mut self, session: &mut S, byte: u8, lookahead: &[u8]) -> usize {
        if byte == consts::IAC {
            self.receiver = ReceiverState::CommandEscape;
            return 0;
        }
        if byte == consts::CR && !self.table.remote_enabled(consts::option::BINARY) {
            if session.is_line_mode() && lookahead.first() == Some(&consts::LF) {
                self.emit(consts::LF);
                return 1;
            }
            self.receiver = ReceiverState::CarriageReturnSeen;
        }
        self.emit(byte);
        0
    }

    fn accumulate(&mut self, byte: u8) {
        if self.subnegotiation.len() < self.config.subnegotiation_capacity {
            self.subnegotiation.put_u8(byte);
        }
    }

    fn end_subnegotiation<S: Session + ?Sized>(&mut self, session: &mut S, trailing: Option<u8>) {
        self.receiver = ReceiverState::Data;
        self.interpret_subnegotiation(session);
        if let Some(byte) = trailing {
            self.command(session, byte);
        }
    }

    /// Dispatch the byte following IAC.
    fn command<S: Session + ?Sized>(&mut self, session: &mut S, byte: u8) {
        self.receiver = ReceiverState::Data;
        match byte {
            consts::IP => session.deliver_interrupt(),
            consts::BRK | consts::ABORT => session.deliver_break(),
            consts::SUSP => session.deliver_suspend(),
            consts::XEOF => session.deliver_end_of_file(),
            consts::EOR => {
                if self.table.remote_enabled(consts::option::EOR) {
                    session.deliver_end_of_file();
                }
            }
            consts::AYT => write_network(session, consts::AYT_REPLY),
            consts::AO => {
                self.flush_output(session);
                if let Some(ch) = session.special_char(SlcFunction::Ao) {
                    self.emit(ch);
                }
                session.clear_pending();
                write_network(session, &[consts::IAC, consts::DM]);
                session.mark_urgent();
            }
            consts::EC | consts::EL => {
                self.flush_output(session);
                let function = if byte == consts::EC {
                    SlcFunction::Ec
                } else {
                    SlcFunction::El
                };
                if let Some(ch) = session.special_char(function) {
                    self.emit(ch);
                }
            }
            consts::DM => {
                self.synching = session.has_urgent_data();
                session.arm(TimerKind::DataMark);
            }
            consts::SB => {
                self.subnegotiation.clear();
                self.receiver = ReceiverState::SubAccumulate;
            }
            consts::WILL => self.receiver = ReceiverState::AwaitWill,
            consts::WONT => self.receiver = ReceiverState::AwaitWont,
            consts::DO => self.receiver = ReceiverState::AwaitDo,
            consts::DONT => self.receiver = ReceiverState::AwaitDont,
            consts::IAC => self.emit(consts::IAC),
            consts::NOP | consts::GA | consts::SE => {}
            other => warn!(error = %CodecError::UnknownCommand(other), "ignoring command"),
        }
    }
}

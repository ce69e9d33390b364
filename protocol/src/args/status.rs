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

//! Telnet Option Status
//!
//! https://tools.ietf.org/html/rfc859
//!
//! A client sends `IAC SB STATUS SEND IAC SE`; the daemon answers with one
//! `IAC SB STATUS IS ... IAC SE` frame listing every option it performs (`WILL opt`)
//! and every option the peer performs (`DO opt`). When the peer has LINEMODE enabled
//! the current editing mode and special character table are appended as nested
//! `SB LINEMODE ... SE` blocks.
//!
//! Inside the frame a data byte equal to SE or IAC is doubled.

use crate::{CodecError, CodecResult, NegotiationTable, SubnegotiationErrorKind, consts};
use bytes::{Buf, BufMut};

/// Status subnegotiation command types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCommand {
    /// SEND - Request status information
    Send,
    /// IS - Provide status information
    Is,
}

impl StatusCommand {
    /// Status Command From Byte
    pub fn from_byte(byte: u8) -> CodecResult<Self> {
        match byte {
            consts::option::status::IS => Ok(StatusCommand::Is),
            consts::option::status::SEND => Ok(StatusCommand::Send),
            _ => Err(CodecError::SubnegotiationError {
                option: consts::option::STATUS,
                reason: SubnegotiationErrorKind::InvalidCommand {
                    command: byte,
                    expected: Some(vec![
                        consts::option::status::IS,
                        consts::option::status::SEND,
                    ]),
                },
            }),
        }
    }
    /// Status Command To Byte
    pub fn to_byte(&self) -> u8 {
        match self {
            StatusCommand::Send => consts::option::status::SEND,
            StatusCommand::Is => consts::option::status::IS,
        }
    }
}

/// One announcement in a status report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusEntry {
    /// The daemon performs the option
    Will(u8),
    /// The peer performs the option
    Do(u8),
}

/// Line-mode state appended to a report when the peer has LINEMODE enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinemodeStatus {
    /// Current editing mode byte
    pub edit_mode: u8,
    /// Special line character table, as triplets
    pub special_chars: Vec<u8>,
}

/// A full `IS` status report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Announcements in ascending option order, WILL before DO for the same option
    pub entries: Vec<StatusEntry>,
    /// Nested line-mode blocks, if any
    pub linemode: Option<LinemodeStatus>,
}

impl StatusReport {
    /// Build a report from the enabled flags of a negotiation table.
    ///
    /// `linemode` is only kept when the peer has LINEMODE enabled.
    pub fn from_table(table: &NegotiationTable, linemode: Option<LinemodeStatus>) -> Self {
        let mut entries = Vec::new();
        for (option, state) in table.iter() {
            if state.local_enabled().is_yes() {
                entries.push(StatusEntry::Will(option));
            }
            if state.remote_enabled().is_yes() {
                entries.push(StatusEntry::Do(option));
            }
        }
        let linemode = linemode.filter(|_| table.remote_enabled(consts::option::LINEMODE));
        Self { entries, linemode }
    }

    /// Encode the complete frame, from the leading `IAC SB` to the trailing `IAC SE`.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> usize {
        let start = dst.remaining_mut();
        dst.put_slice(&[
            consts::IAC,
            consts::SB,
            consts::option::STATUS,
            consts::option::status::IS,
        ]);
        for entry in &self.entries {
            let (verb, option) = match *entry {
                StatusEntry::Will(option) => (consts::WILL, option),
                StatusEntry::Do(option) => (consts::DO, option),
            };
            dst.put_u8(verb);
            put_data(dst, option);
        }
        if let Some(linemode) = &self.linemode {
            dst.put_slice(&[
                consts::SB,
                consts::option::LINEMODE,
                consts::option::linemode::MODE,
            ]);
            put_data(dst, linemode.edit_mode);
            dst.put_u8(consts::SE);

            dst.put_slice(&[
                consts::SB,
                consts::option::LINEMODE,
                consts::option::linemode::SLC,
            ]);
            for &byte in &linemode.special_chars {
                put_data(dst, byte);
            }
            dst.put_u8(consts::SE);
        }
        dst.put_slice(&[consts::IAC, consts::SE]);
        start - dst.remaining_mut()
    }

    /// Decode a complete `IAC SB STATUS IS ... IAC SE` frame.
    ///
    /// # Use
    ///
    /// The daemon never parses `STATUS IS`; incoming reports are ignored. This is
    /// the client half of [`StatusReport::encode`], for peers and test harnesses
    /// that need to read what the daemon sent.
    pub fn decode<T: Buf>(src: &mut T) -> CodecResult<StatusReport> {
        expect(
            src,
            &[
                consts::IAC,
                consts::SB,
                consts::option::STATUS,
                consts::option::status::IS,
            ],
        )?;

        let mut report = StatusReport::default();
        loop {
            match next(src)? {
                consts::WILL => report.entries.push(StatusEntry::Will(get_data(src)?)),
                consts::DO => report.entries.push(StatusEntry::Do(get_data(src)?)),
                consts::SB => {
                    expect(src, &[consts::option::LINEMODE])?;
                    let request = next(src)?;
                    let mut data = Vec::new();
                    while let Some(byte) = get_block_data(src)? {
                        data.push(byte);
                    }
                    let linemode = report.linemode.get_or_insert_with(LinemodeStatus::default);
                    match request {
                        consts::option::linemode::MODE => {
                            linemode.edit_mode = data.first().copied().unwrap_or_default();
                        }
                        consts::option::linemode::SLC => linemode.special_chars = data,
                        command => {
                            return Err(invalid(SubnegotiationErrorKind::InvalidCommand {
                                command,
                                expected: Some(vec![
                                    consts::option::linemode::MODE,
                                    consts::option::linemode::SLC,
                                ]),
                            }));
                        }
                    }
                }
                consts::IAC => {
                    expect(src, &[consts::SE])?;
                    return Ok(report);
                }
                verb => return Err(invalid(SubnegotiationErrorKind::InvalidVerb { verb })),
            }
        }
    }
}

fn put_data<T: BufMut>(dst: &mut T, byte: u8) {
    dst.put_u8(byte);
    if byte == consts::SE || byte == consts::IAC {
        dst.put_u8(byte);
    }
}

fn invalid(reason: SubnegotiationErrorKind) -> CodecError {
    CodecError::SubnegotiationError {
        option: consts::option::STATUS,
        reason,
    }
}

fn next<T: Buf>(src: &mut T) -> CodecResult<u8> {
    if src.has_remaining() {
        Ok(src.get_u8())
    } else {
        Err(invalid(SubnegotiationErrorKind::IncompleteData {
            description: "status report ended before IAC SE".into(),
        }))
    }
}

fn expect<T: Buf>(src: &mut T, bytes: &[u8]) -> CodecResult<()> {
    for &expected in bytes {
        let command = next(src)?;
        if command != expected {
            return Err(invalid(SubnegotiationErrorKind::InvalidCommand {
                command,
                expected: Some(vec![expected]),
            }));
        }
    }
    Ok(())
}

fn get_data<T: Buf>(src: &mut T) -> CodecResult<u8> {
    let byte = next(src)?;
    if byte == consts::SE || byte == consts::IAC {
        expect(src, &[byte])?;
    }
    Ok(byte)
}

/// Next data byte of a nested block, or `None` at its closing SE.
fn get_block_data<T: Buf>(src: &mut T) -> CodecResult<Option<u8>> {
    match next(src)? {
        consts::SE if src.chunk().first() == Some(&consts::SE) => {
            src.advance(1);
            Ok(Some(consts::SE))
        }
        consts::SE => Ok(None),
        consts::IAC => {
            expect(src, &[consts::IAC])?;
            Ok(Some(consts::IAC))
        }
        byte => Ok(Some(byte)),
    }
}

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

//! Line Mode Options
//!
//! https://tools.ietf.org/html/rfc1184

use crate::{CodecError, CodecResult, SubnegotiationErrorKind, consts};
use bytes::BufMut;

/// A client LINEMODE sub-negotiation, borrowed from the payload.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LinemodeRequest<'a> {
    /// MODE - the client proposes or acknowledges an editing mode
    Mode(LineModeFlags),
    /// FORWARDMASK - only the server may send a mask; the client reply is ignored
    ForwardMask,
    /// SLC - special line character triplets
    Slc(&'a [u8]),
    /// Any other request byte
    Other(u8),
}

impl<'a> LinemodeRequest<'a> {
    /// Parse the payload that follows the LINEMODE option code.
    ///
    /// Both an empty payload and a request byte with nothing after it are rejected.
    pub fn parse(payload: &'a [u8]) -> CodecResult<Self> {
        match payload {
            [] | [_] => Err(CodecError::SubnegotiationError {
                option: consts::option::LINEMODE,
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: 2,
                    available: payload.len(),
                },
            }),
            [consts::option::linemode::MODE, mode, ..] => {
                Ok(Self::Mode(LineModeFlags::from_byte(*mode)))
            }
            [consts::option::linemode::FORWARDMASK, ..] => Ok(Self::ForwardMask),
            [consts::option::linemode::SLC, rest @ ..] => Ok(Self::Slc(rest)),
            [other, ..] => Ok(Self::Other(*other)),
        }
    }
}

impl std::fmt::Display for LinemodeRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mode(mode) => write!(f, "MODE {mode}"),
            Self::ForwardMask => write!(f, "FORWARDMASK"),
            Self::Slc(data) => write!(f, "SLC ({} bytes)", data.len()),
            Self::Other(byte) => write!(f, "Unknown({byte})"),
        }
    }
}

/// Line Mode flags carried by the MODE request.
///
/// The raw byte is kept so bits without a named accessor survive a round trip.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct LineModeFlags(u8);

impl LineModeFlags {
    /// Client performs line editing
    pub const EDIT: u8 = 0x01;
    /// Client traps signals locally
    pub const TRAPSIG: u8 = 0x02;
    /// Mode acknowledgment
    pub const ACK: u8 = 0x04;
    /// Client converts tabs to spaces
    pub const SOFT_TAB: u8 = 0x08;
    /// Literal echo of non-printables
    pub const LIT_ECHO: u8 = 0x10;

    /// Wrap a received mode byte.
    pub fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Mode byte
    pub fn to_byte(self) -> u8 {
        self.0
    }

    /// EDIT: the client edits lines locally
    pub fn edit(self) -> bool {
        self.0 & Self::EDIT != 0
    }

    /// TRAPSIG: the client maps signal keys to telnet commands
    pub fn trapsig(self) -> bool {
        self.0 & Self::TRAPSIG != 0
    }

    /// MODE_ACK: the MODE is an acknowledgement
    pub fn ack(self) -> bool {
        self.0 & Self::ACK != 0
    }

    /// SOFT_TAB: the client expands tabs
    pub fn soft_tab(self) -> bool {
        self.0 & Self::SOFT_TAB != 0
    }

    /// LIT_ECHO: echo non-printables literally
    pub fn lit_echo(self) -> bool {
        self.0 & Self::LIT_ECHO != 0
    }
}

impl std::fmt::Display for LineModeFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// One SLC triplet: function, flags, value
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SlcDefinition {
    /// SLC function code
    pub function: SlcFunction,
    /// SLC flags
    pub flags: SlcFlags,
    /// Character value
    pub value: u8,
}

impl SlcDefinition {
    /// Parse complete triplets, ignoring a trailing partial one.
    pub fn parse_all(data: &[u8]) -> Vec<SlcDefinition> {
        data.chunks_exact(3)
            .map(|triplet| SlcDefinition {
                function: SlcFunction::from_byte(triplet[0]),
                flags: SlcFlags::from_byte(triplet[1]),
                value: triplet[2],
            })
            .collect()
    }

    /// Serialize as a triplet.
    pub fn serialize(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.function.to_byte());
        buf.put_u8(self.flags.to_byte());
        buf.put_u8(self.value);
    }
}

/// SLC function codes
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SlcFunction {
    /// Sync signal
    Synch,
    /// Break signal
    Brk,
    /// Interrupt Process
    Ip,
    /// Abort Output
    Ao,
    /// Are You There
    Ayt,
    /// Erase Character
    Ec,
    /// Erase Line
    El,
    /// End of File
    Eof,
    /// Suspend Process
    Susp,
    /// Abort Process
    Abort,
    /// End of Record
    Eor,
    /// Literal Next
    Lnext,
    /// Erase Word
    Ew,
    /// Reprint Line
    Rp,
    /// X-On character
    Xon,
    /// X-Off character
    Xoff,
    /// Forward Char
    ForwardChar,
    /// Unassigned function code
    Other(u8),
}

impl SlcFunction {
    /// Function for a code; unassigned codes are kept as `Other`.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Self::Synch,
            2 => Self::Brk,
            3 => Self::Ip,
            4 => Self::Ao,
            5 => Self::Ayt,
            6 => Self::Ec,
            7 => Self::El,
            8 => Self::Eof,
            9 => Self::Susp,
            10 => Self::Abort,
            11 => Self::Eor,
            12 => Self::Lnext,
            13 => Self::Ew,
            14 => Self::Rp,
            15 => Self::Xon,
            16 => Self::Xoff,
            17 => Self::ForwardChar,
            other => Self::Other(other),
        }
    }

    /// Function code
    pub fn to_byte(&self) -> u8 {
        match self {
            Self::Synch => 1,
            Self::Brk => 2,
            Self::Ip => 3,
            Self::Ao => 4,
            Self::Ayt => 5,
            Self::Ec => 6,
            Self::El => 7,
            Self::Eof => 8,
            Self::Susp => 9,
            Self::Abort => 10,
            Self::Eor => 11,
            Self::Lnext => 12,
            Self::Ew => 13,
            Self::Rp => 14,
            Self::Xon => 15,
            Self::Xoff => 16,
            Self::ForwardChar => 17,
            Self::Other(val) => *val,
        }
    }
}

impl std::fmt::Display for SlcFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// SLC flags
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SlcFlags {
    /// Support level
    pub level: SlcLevel,
    /// Acknowledgment flag
    pub ack: bool,
    /// Flushin flag
    pub flushin: bool,
    /// Flushout flag
    pub flushout: bool,
}

impl SlcFlags {
    /// Flags carrying only a support level.
    pub fn level(level: SlcLevel) -> Self {
        Self {
            level,
            ack: false,
            flushin: false,
            flushout: false,
        }
    }

    /// Split a flags byte into level and modifier bits.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            level: SlcLevel::from_byte(byte),
            ack: (byte & 0x80) != 0,
            flushin: (byte & 0x40) != 0,
            flushout: (byte & 0x20) != 0,
        }
    }

    /// Wire byte
    pub fn to_byte(&self) -> u8 {
        let mut byte = self.level.to_byte();
        if self.ack {
            byte |= 0x80;
        }
        if self.flushin {
            byte |= 0x40;
        }
        if self.flushout {
            byte |= 0x20;
        }
        byte
    }
}

/// SLC support level
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SlcLevel {
    /// SLC_NOSUPPORT: the function is not available
    NoSupport,
    /// SLC_DEFAULT: use the receiver's default
    Default,
    /// SLC_VALUE: use the value that follows
    Value,
    /// SLC_CANTCHANGE: fixed value, the sender will not accept another
    CantChange,
}

impl SlcLevel {
    /// Create SLC level from the low two bits of `byte`
    pub fn from_byte(byte: u8) -> Self {
        match byte & 0x03 {
            0 => Self::NoSupport,
            1 => Self::CantChange,
            2 => Self::Value,
            _ => Self::Default,
        }
    }

    /// Level bits
    pub fn to_byte(&self) -> u8 {
        match self {
            Self::NoSupport => 0,
            Self::CantChange => 1,
            Self::Value => 2,
            Self::Default => 3,
        }
    }
}

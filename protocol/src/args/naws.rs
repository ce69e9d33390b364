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

//! Negotiate About Window Size
//!
//! https://tools.ietf.org/html/rfc1073
//!
//! The client sends `IAC SB NAWS <cols:u16> <rows:u16> IAC SE`, both in network
//! byte order, whenever its window changes.

use crate::{CodecError, CodecResult, SubnegotiationErrorKind, consts};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::BufMut;

/// Terminal window size in character cells.
///
/// ```
/// use telnetd_protocol::naws::WindowSize;
///
/// let size = WindowSize::decode(&[0x00, 0x50, 0x00, 0x19]).unwrap();
/// assert_eq!(size, WindowSize::new(80, 25));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    /// Width
    pub cols: u16,
    /// Height
    pub rows: u16,
}

impl WindowSize {
    /// Payload length on the wire
    pub const ENCODED_LEN: usize = 4;

    /// `cols` by `rows`
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Parse the first four bytes of a NAWS payload. Extra bytes are ignored.
    pub fn decode(payload: &[u8]) -> CodecResult<Self> {
        if payload.len() < Self::ENCODED_LEN {
            return Err(CodecError::SubnegotiationError {
                option: consts::option::NAWS,
                reason: SubnegotiationErrorKind::InsufficientData {
                    required: Self::ENCODED_LEN,
                    available: payload.len(),
                },
            });
        }
        let mut reader = payload;
        let cols = reader.read_u16::<BigEndian>()?;
        let rows = reader.read_u16::<BigEndian>()?;
        Ok(Self { cols, rows })
    }

    /// Append the payload to `dst`, returning the number of bytes written.
    ///
    /// Neither field is IAC-escaped; callers framing the payload into a
    /// sub-negotiation must double any 255 bytes.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        let mut writer = dst.writer();
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(Self::ENCODED_LEN)
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

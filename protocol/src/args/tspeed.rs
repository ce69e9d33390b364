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

//! Terminal Speed
//!
//! https://tools.ietf.org/html/rfc1079
//!
//! The client answers `IS <transmit>,<receive>` with both speeds as ASCII decimal.

use crate::{CodecError, CodecResult, SubnegotiationErrorKind, consts};

/// Line speeds reported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminalSpeed {
    /// Transmit speed in bits per second
    pub transmit: u32,
    /// Receive speed in bits per second
    pub receive: u32,
}

impl TerminalSpeed {
    /// Creates a new `TerminalSpeed`.
    pub fn new(transmit: u32, receive: u32) -> Self {
        Self { transmit, receive }
    }

    /// Decodes the payload that follows the option code.
    ///
    /// Each speed is read like C `atoi`: leading whitespace is skipped and the run of
    /// digits that follows is the value, so `"38400abc"` reads as 38400 and an empty
    /// field reads as 0. At least one byte must follow the comma.
    pub fn decode(payload: &[u8]) -> CodecResult<TerminalSpeed> {
        let Some((&qualifier, rest)) = payload.split_first() else {
            return Err(error(SubnegotiationErrorKind::InsufficientData {
                required: 1,
                available: 0,
            }));
        };
        if qualifier != consts::IS {
            return Err(error(SubnegotiationErrorKind::InvalidCommand {
                command: qualifier,
                expected: Some(vec![consts::IS]),
            }));
        }

        let transmit = leading_number(rest);
        let receive = match rest.iter().position(|&byte| byte == b',') {
            Some(comma) if comma + 1 < rest.len() => leading_number(&rest[comma + 1..]),
            _ => {
                return Err(error(SubnegotiationErrorKind::IncompleteData {
                    description: "missing receive speed".into(),
                }));
            }
        };
        Ok(TerminalSpeed { transmit, receive })
    }
}

impl std::fmt::Display for TerminalSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.transmit, self.receive)
    }
}

fn error(reason: SubnegotiationErrorKind) -> CodecError {
    CodecError::SubnegotiationError {
        option: consts::option::TSPEED,
        reason,
    }
}

fn leading_number(field: &[u8]) -> u32 {
    field
        .iter()
        .skip_while(|byte| byte.is_ascii_whitespace())
        .take_while(|byte| byte.is_ascii_digit())
        .fold(0u32, |value, digit| {
            value
                .saturating_mul(10)
                .saturating_add(u32::from(digit - b'0'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_speeds() {
        assert_eq!(
            TerminalSpeed::decode(b"\x0038400,19200").unwrap(),
            TerminalSpeed::new(38400, 19200)
        );
    }

    #[test]
    fn test_decode_atoi_semantics() {
        assert_eq!(
            TerminalSpeed::decode(b"\x00 9600baud,x").unwrap(),
            TerminalSpeed::new(9600, 0)
        );
    }

    #[test]
    fn test_decode_requires_is() {
        assert!(matches!(
            TerminalSpeed::decode(b"\x019600,9600"),
            Err(CodecError::SubnegotiationError {
                reason: SubnegotiationErrorKind::InvalidCommand { command: 1, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_decode_missing_receive() {
        assert!(TerminalSpeed::decode(b"\x009600").is_err());
        assert!(TerminalSpeed::decode(b"\x009600,").is_err());
        assert!(TerminalSpeed::decode(b"").is_err());
    }

    #[test]
    fn test_decode_saturates() {
        assert_eq!(
            TerminalSpeed::decode(b"\x0099999999999,1").unwrap(),
            TerminalSpeed::new(u32::MAX, 1)
        );
    }
}

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

//! Terminal Type
//!
//! https://tools.ietf.org/html/rfc1091

use crate::{CodecError, CodecResult, SubnegotiationErrorKind, consts};

/// Decodes an `IS <name>` terminal type payload.
///
/// The name is lower-cased and truncated so its UTF-8 form fits in `capacity`
/// bytes. Bytes outside ASCII are kept as their Latin-1 code points.
///
/// ```
/// use telnetd_protocol::ttype;
///
/// assert_eq!(ttype::decode(b"\x00XTERM-256COLOR", 40).unwrap(), "xterm-256color");
/// ```
pub fn decode(payload: &[u8], capacity: usize) -> CodecResult<String> {
    match payload.split_first() {
        Some((&consts::IS, name)) => {
            let mut term = String::with_capacity(capacity);
            for ch in name.iter().map(|byte| char::from(byte.to_ascii_lowercase())) {
                if term.len() + ch.len_utf8() > capacity {
                    break;
                }
                term.push(ch);
            }
            Ok(term)
        }
        Some((&qualifier, _)) => Err(CodecError::SubnegotiationError {
            option: consts::option::TTYPE,
            reason: SubnegotiationErrorKind::InvalidCommand {
                command: qualifier,
                expected: Some(vec![consts::IS]),
            },
        }),
        None => Err(CodecError::SubnegotiationError {
            option: consts::option::TTYPE,
            reason: SubnegotiationErrorKind::InsufficientData {
                required: 1,
                available: 0,
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_name() {
        assert_eq!(decode(b"\x00VT100", 40).unwrap(), "vt100");
    }

    #[test]
    fn test_truncates_to_capacity() {
        let mut payload = vec![consts::IS];
        payload.extend(std::iter::repeat_n(b'A', 60));
        assert_eq!(decode(&payload, 40).unwrap(), "a".repeat(40));
    }

    #[test]
    fn test_high_bytes_respect_capacity() {
        let mut payload = vec![consts::IS];
        payload.extend(std::iter::repeat_n(0xE9, 60));
        let name = decode(&payload, 40).unwrap();
        assert_eq!(name.len(), 40);
        assert_eq!(name, "\u{e9}".repeat(20));

        let name = decode(b"\x00ab\xe9", 3).unwrap();
        assert_eq!(name, "ab");
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(decode(b"\x00", 40).unwrap(), "");
    }

    #[test]
    fn test_rejects_send() {
        assert!(decode(b"\x01", 40).is_err());
        assert!(decode(b"", 40).is_err());
    }
}

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

//! Option identities
//!
//! Codes come from the [IANA registry](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml).
//! Only the options the daemon acts on get a variant of their own.

use crate::consts::option;
use std::fmt;

macro_rules! telnet_options {
    ($($(#[$doc:meta])* $variant:ident = $code:path, $name:literal;)+) => {
        /// An option the daemon can negotiate.
        ///
        /// Codes without special handling are carried as [`TelnetOption::Unknown`] and
        /// negotiated like any unsupported option.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum TelnetOption {
            $($(#[$doc])* $variant,)+
            /// Any other option code
            Unknown(u8),
        }

        impl TelnetOption {
            /// Wire code
            pub fn to_u8(self) -> u8 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => code,
                }
            }

            /// Option for a wire code
            pub fn from_u8(code: u8) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    code => Self::Unknown(code),
                }
            }

            /// Mnemonic used in logs, `None` for unknown codes.
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some($name),)+
                    Self::Unknown(_) => None,
                }
            }
        }
    };
}

telnet_options! {
    /// Binary Transmission, [RFC 856](https://tools.ietf.org/html/rfc856)
    TransmitBinary = option::BINARY, "BINARY";
    /// Echo, [RFC 857](https://tools.ietf.org/html/rfc857)
    Echo = option::ECHO, "ECHO";
    /// Suppress Go Ahead, [RFC 858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead = option::SGA, "SGA";
    /// Status, [RFC 859](https://tools.ietf.org/html/rfc859)
    Status = option::STATUS, "STATUS";
    /// Timing Mark, [RFC 860](https://tools.ietf.org/html/rfc860)
    TimingMark = option::TM, "TIMING-MARK";
    /// Terminal Type, [RFC 1091](https://tools.ietf.org/html/rfc1091)
    TTYPE = option::TTYPE, "TTYPE";
    /// End of Record, [RFC 885](https://tools.ietf.org/html/rfc885)
    EOR = option::EOR, "EOR";
    /// Window Size, [RFC 1073](https://tools.ietf.org/html/rfc1073)
    NAWS = option::NAWS, "NAWS";
    /// Terminal Speed, [RFC 1079](https://tools.ietf.org/html/rfc1079)
    TSPEED = option::TSPEED, "TSPEED";
    /// Remote Flow Control, [RFC 1372](https://tools.ietf.org/html/rfc1372)
    LFLOW = option::LFLOW, "LFLOW";
    /// Linemode, [RFC 1184](https://tools.ietf.org/html/rfc1184)
    Linemode = option::LINEMODE, "LINEMODE";
}

impl fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown({})", self.to_u8()),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(code: u8) -> Self {
        Self::from_u8(code)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

/// Which end performs an option.
///
/// The daemon performs `Local` options: it announces them with WILL/WONT and the peer
/// asks with DO/DONT. `Remote` options run the other way round.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetSide {
    /// The daemon
    Local,
    /// The client
    Remote,
}

impl fmt::Display for TelnetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "Local",
            Self::Remote => "Remote",
        })
    }
}

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

use crate::TelnetOption;
use std::fmt;

/// Result of payload parsing and buffer operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Failure while framing or interpreting telnet data.
///
/// The receive path never returns these from
/// [`TelnetEngine::consume`](crate::TelnetEngine::consume); malformed input is logged
/// and dropped there. They come back from the payload parsers and encoders.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CodecError {
    /// Writing an encoded payload failed.
    IOError(std::io::ErrorKind),

    /// A sub-negotiation payload was malformed.
    SubnegotiationError {
        /// Option code the payload belongs to
        option: u8,
        /// What was wrong with it
        reason: SubnegotiationErrorKind,
    },

    /// The terminal-bound output buffer is at capacity.
    OutputFull {
        /// Capacity of the buffer
        capacity: usize,
    },

    /// A byte after IAC that is not a telnet command.
    UnknownCommand(u8),
}

impl CodecError {
    /// Option code of a sub-negotiation failure
    pub fn option(&self) -> Option<TelnetOption> {
        match self {
            Self::SubnegotiationError { option, .. } => Some(TelnetOption::from(*option)),
            _ => None,
        }
    }

    /// Whether processing can continue once the output buffer is drained.
    pub fn is_backpressure(&self) -> bool {
        matches!(self, Self::OutputFull { .. })
    }
}

/// Why a sub-negotiation payload was rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubnegotiationErrorKind {
    /// The payload ended early.
    InsufficientData {
        /// Bytes needed
        required: usize,
        /// Bytes present
        available: usize,
    },

    /// A qualifier or request byte that is not valid here.
    InvalidCommand {
        /// Byte received
        command: u8,
        /// Bytes that would have been accepted
        expected: Option<Vec<u8>>,
    },

    /// A status entry that is neither WILL nor DO.
    InvalidVerb {
        /// Byte received
        verb: u8,
    },

    /// A field is missing or unparsable.
    IncompleteData {
        /// Which field
        description: String,
    },
}

impl std::error::Error for CodecError {}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IOError(kind) => write!(f, "write failed: {kind}"),
            Self::SubnegotiationError { option, reason } => {
                write!(f, "bad {} sub-negotiation: {reason}", TelnetOption::from(*option))
            }
            Self::OutputFull { capacity } => write!(f, "output buffer full at {capacity} bytes"),
            Self::UnknownCommand(command) => write!(f, "unknown command {command:#04x}"),
        }
    }
}

impl fmt::Display for SubnegotiationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData {
                required,
                available,
            } => write!(f, "{available} of {required} bytes"),
            Self::InvalidCommand {
                command,
                expected: Some(expected),
            } => write!(f, "unexpected byte {command:#04x}, wanted one of {expected:?}"),
            Self::InvalidCommand {
                command,
                expected: None,
            } => write!(f, "unexpected byte {command:#04x}"),
            Self::InvalidVerb { verb } => write!(f, "status entry {verb:#04x} is not WILL or DO"),
            Self::IncompleteData { description } => write!(f, "missing {description}"),
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error.kind())
    }
}

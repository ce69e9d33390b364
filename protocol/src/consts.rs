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

//! Telnet wire constants
//!
//! Command bytes from RFC 854 and RFC 885, the line-mode additions from RFC 1184,
//! and the option codes recognized by the engine.

/// Carriage Return
pub const CR: u8 = b'\r';
/// Line Feed
pub const LF: u8 = b'\n';
/// Null
pub const NUL: u8 = 0;

/// End of File (RFC 1184)
pub const XEOF: u8 = 236;
/// Suspend Process (RFC 1184)
pub const SUSP: u8 = 237;
/// Abort Process (RFC 1184)
pub const ABORT: u8 = 238;
/// End of Record (RFC 885)
pub const EOR: u8 = 239;
/// End of Subnegotiation
pub const SE: u8 = 240;
/// No Operation
pub const NOP: u8 = 241;
/// Data Mark, the data stream portion of a Synch
pub const DM: u8 = 242;
/// Break
pub const BRK: u8 = 243;
/// Interrupt Process
pub const IP: u8 = 244;
/// Abort Output
pub const AO: u8 = 245;
/// Are You There
pub const AYT: u8 = 246;
/// Erase Character
pub const EC: u8 = 247;
/// Erase Line
pub const EL: u8 = 248;
/// Go Ahead
pub const GA: u8 = 249;
/// Begin Subnegotiation
pub const SB: u8 = 250;
/// WILL (sender wants to enable, or confirms enabling, an option locally)
pub const WILL: u8 = 251;
/// WONT (sender refuses, or confirms disabling, an option locally)
pub const WONT: u8 = 252;
/// DO (sender asks the receiver to enable an option)
pub const DO: u8 = 253;
/// DONT (sender asks the receiver to disable an option)
pub const DONT: u8 = 254;
/// Interpret As Command
pub const IAC: u8 = 255;

/// Subnegotiation qualifier: the payload carries a value
pub const IS: u8 = 0;
/// Subnegotiation qualifier: the payload requests a value
pub const SEND: u8 = 1;

/// Reply written in response to Are You There
pub const AYT_REPLY: &[u8] = b"\r\n[Yes]\r\n";

/// Option codes
pub mod option {
    /// Binary Transmission (RFC 856)
    pub const BINARY: u8 = 0;
    /// Echo (RFC 857)
    pub const ECHO: u8 = 1;
    /// Suppress Go Ahead (RFC 858)
    pub const SGA: u8 = 3;
    /// Status (RFC 859)
    pub const STATUS: u8 = 5;
    /// Timing Mark (RFC 860)
    pub const TM: u8 = 6;
    /// Terminal Type (RFC 1091)
    pub const TTYPE: u8 = 24;
    /// End of Record (RFC 885)
    pub const EOR: u8 = 25;
    /// Negotiate About Window Size (RFC 1073)
    pub const NAWS: u8 = 31;
    /// Terminal Speed (RFC 1079)
    pub const TSPEED: u8 = 32;
    /// Remote Flow Control (RFC 1372)
    pub const LFLOW: u8 = 33;
    /// Linemode (RFC 1184)
    pub const LINEMODE: u8 = 34;

    /// Status subnegotiation qualifiers
    pub mod status {
        /// IS - the payload is a status report
        pub const IS: u8 = super::super::IS;
        /// SEND - request a status report
        pub const SEND: u8 = super::super::SEND;
    }

    /// Linemode subnegotiation requests
    pub mod linemode {
        /// MODE - editing mode flags follow
        pub const MODE: u8 = 1;
        /// FORWARDMASK - forwarding mask follows
        pub const FORWARDMASK: u8 = 2;
        /// SLC - special line character triplets follow
        pub const SLC: u8 = 3;
    }
}

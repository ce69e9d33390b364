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

//! Integration tests for the engine
//!
//! These tests drive the engine with complete byte streams and check what reaches
//! the network, the terminal and the session.

mod common;

use common::{Endpoint, Event, exchange};
use proptest::prelude::*;
use telnetd_protocol::naws::WindowSize;
use telnetd_protocol::status::{StatusEntry, StatusReport};
use telnetd_protocol::{
    ClientStatus, EngineConfig, LinemodeKind, TelnetOption, TelnetSide, TimerKind, YesNo, consts,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// The negotiations a daemon opens every connection with.
fn greet(daemon: &mut Endpoint) {
    let session = &mut daemon.session;
    let engine = &mut daemon.engine;
    engine.request_remote_enable(session, TelnetOption::TTYPE, true);
    engine.request_remote_enable(session, TelnetOption::TSPEED, true);
    engine.request_remote_enable(session, TelnetOption::NAWS, true);
    engine.request_remote_enable(session, TelnetOption::Linemode, true);
    engine.request_local_enable(session, TelnetOption::Status, true);
    engine.request_remote_enable(session, TelnetOption::TimingMark, true);
    engine.request_local_enable(session, TelnetOption::Echo, true);
    engine.request_local_enable(session, TelnetOption::SuppressGoAhead, true);
}

fn negotiation(command: u8, option: u8) -> [u8; 3] {
    [consts::IAC, command, option]
}

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.iter().flat_map(|part| part.iter().copied()).collect()
}

// ============================================================================
// Connection Greeting Tests
// ============================================================================

#[test]
fn greeting_is_sent_in_order() {
    let mut daemon = Endpoint::new();
    greet(&mut daemon);

    let expected = concat(&[
        &negotiation(consts::DO, consts::option::TTYPE),
        &negotiation(consts::DO, consts::option::TSPEED),
        &negotiation(consts::DO, consts::option::NAWS),
        &negotiation(consts::DO, consts::option::LINEMODE),
        &negotiation(consts::WILL, consts::option::STATUS),
        &negotiation(consts::DO, consts::option::TM),
        &negotiation(consts::WILL, consts::option::ECHO),
        &negotiation(consts::WILL, consts::option::SGA),
    ]);
    assert_eq!(daemon.session.network, expected);
}

#[test]
fn character_mode_client_session() {
    let mut daemon = Endpoint::new();
    greet(&mut daemon);
    daemon.session.take_network();

    daemon.receive(&concat(&[
        &negotiation(consts::WILL, consts::option::TTYPE),
        &negotiation(consts::WONT, consts::option::TSPEED),
        &negotiation(consts::WILL, consts::option::NAWS),
        &negotiation(consts::WONT, consts::option::LINEMODE),
        &negotiation(consts::DO, consts::option::STATUS),
        &negotiation(consts::WONT, consts::option::TM),
        &negotiation(consts::DO, consts::option::ECHO),
        &negotiation(consts::DO, consts::option::SGA),
        &[consts::IAC, consts::SB, consts::option::NAWS, 0, 132, 0, 43],
        &[consts::IAC, consts::SE],
        &[consts::IAC, consts::SB, consts::option::TTYPE, consts::IS],
        b"VT220",
        &[consts::IAC, consts::SE],
        b"ls\r\0",
    ]));

    // Refused requests are confirmed; nothing else goes out.
    assert_eq!(
        daemon.session.network,
        concat(&[
            &negotiation(consts::DONT, consts::option::TSPEED),
            &negotiation(consts::DONT, consts::option::LINEMODE),
        ])
    );

    let engine = &daemon.engine;
    let table = engine.table();
    assert!(!table.has_pending());
    assert!(table.remote_enabled(consts::option::TTYPE));
    assert!(table.remote_enabled(consts::option::NAWS));
    assert!(!table.remote_enabled(consts::option::TSPEED));
    assert!(table.local_enabled(consts::option::ECHO));
    assert!(table.local_enabled(consts::option::SGA));
    assert!(table.local_enabled(consts::option::STATUS));
    assert!(!table.remote_enabled(consts::option::TM));
    assert_eq!(engine.linemode_kind(), LinemodeKind::None);
    assert_eq!(engine.terminal_type(), Some("vt220"));
    assert_eq!(daemon.session.terminal, b"ls\r");
    assert!(daemon
        .session
        .notifications()
        .contains(&ClientStatus::WindowSize(WindowSize::new(132, 43))));
}

#[test]
fn kludge_client_session() {
    let mut daemon = Endpoint::new();
    greet(&mut daemon);
    daemon.session.take_network();

    daemon.receive(&concat(&[
        &negotiation(consts::DO, consts::option::SGA),
        &negotiation(consts::DO, consts::option::ECHO),
        &negotiation(consts::WILL, consts::option::TM),
    ]));

    assert_eq!(daemon.engine.linemode_kind(), LinemodeKind::Kludge);
    assert!(daemon.session.line_mode);
    assert_eq!(
        daemon.session.network,
        negotiation(consts::WONT, consts::option::SGA)
    );
    assert!(!daemon.engine.table().remote_enabled(consts::option::TM));

    // The client switching SGA back on leaves line editing.
    daemon.session.take_network();
    daemon.receive(&negotiation(consts::DONT, consts::option::SGA));
    daemon.receive(&negotiation(consts::DO, consts::option::SGA));
    assert!(!daemon.session.line_mode);
    assert!(daemon.engine.table().local_enabled(consts::option::SGA));
}

#[test]
fn real_linemode_client_session() {
    let mut daemon = Endpoint::new();
    greet(&mut daemon);
    daemon.session.take_network();

    daemon.receive(&concat(&[
        &negotiation(consts::WILL, consts::option::LINEMODE),
        &negotiation(consts::WILL, consts::option::TM),
        &[
            consts::IAC,
            consts::SB,
            consts::option::LINEMODE,
            consts::option::linemode::MODE,
            0x01,
            consts::IAC,
            consts::SE,
        ],
    ]));

    assert_eq!(daemon.engine.linemode_kind(), LinemodeKind::Real);
    assert_eq!(daemon.engine.requested_edit_mode(), Some(0x01));
    assert!(daemon
        .session
        .events
        .contains(&Event::Notify(ClientStatus::EditMode(0x01))));
}

// ============================================================================
// Status Tests
// ============================================================================

#[test]
fn status_report_reflects_table() {
    let mut daemon = Endpoint::new();
    greet(&mut daemon);
    daemon.receive(&concat(&[
        &negotiation(consts::WILL, consts::option::TTYPE),
        &negotiation(consts::WILL, consts::option::NAWS),
        &negotiation(consts::DO, consts::option::STATUS),
        &negotiation(consts::DO, consts::option::ECHO),
    ]));
    daemon.session.take_network();
    let flushes = daemon.session.flushes;

    daemon.receive(&[
        consts::IAC,
        consts::SB,
        consts::option::STATUS,
        consts::option::status::SEND,
        consts::IAC,
        consts::SE,
    ]);

    let mut frame = daemon.session.network.as_slice();
    let report = StatusReport::decode(&mut frame).unwrap();
    assert!(frame.is_empty());
    assert_eq!(
        report.entries,
        [
            StatusEntry::Will(consts::option::ECHO),
            StatusEntry::Will(consts::option::STATUS),
            StatusEntry::Do(consts::option::TTYPE),
            StatusEntry::Do(consts::option::NAWS),
        ]
    );
    assert_eq!(report.linemode, None);
    assert_eq!(daemon.session.flushes, flushes + 2);
}

// ============================================================================
// Command Tests
// ============================================================================

#[test]
fn abort_output_sequence() {
    let mut daemon = Endpoint::new();
    daemon.session.special_chars = vec![0x04, 0x02, 0x0F];

    daemon.receive(&[b'x', consts::IAC, consts::AO]);

    assert_eq!(daemon.session.terminal, [b'x', 0x0F]);
    assert_eq!(daemon.session.network, [consts::IAC, consts::DM]);
    assert_eq!(daemon.session.events, [Event::ClearPending, Event::Urgent]);
}

#[test]
fn data_mark_arms_timer() {
    let mut daemon = Endpoint::new();

    daemon.receive(&[consts::IAC, consts::DM]);

    assert_eq!(daemon.session.events, [Event::Timer(TimerKind::DataMark)]);
    assert!(!daemon.engine.is_synching());
}

#[test]
fn output_backpressure_preserves_data() {
    let mut daemon = Endpoint::with_config(EngineConfig::default().with_output_capacity(8));
    let input: Vec<u8> = (0..200u8).map(|n| b'a' + n % 26).collect();

    let mut consumed_per_call = Vec::new();
    let mut rest = input.as_slice();
    while !rest.is_empty() {
        let consumed = daemon.engine.consume(&mut daemon.session, rest);
        consumed_per_call.push(consumed);
        daemon.engine.flush_output(&mut daemon.session);
        rest = &rest[consumed..];
    }

    assert!(consumed_per_call.iter().all(|&n| n <= 7));
    assert_eq!(daemon.session.terminal, input);
}

// ============================================================================
// Engine to Engine Tests
// ============================================================================

#[test]
fn two_daemons_refuse_peer_echo() {
    let mut a = Endpoint::new();
    let mut b = Endpoint::new();

    a.engine
        .request_local_enable(&mut a.session, TelnetOption::Echo, true);
    assert_eq!(exchange(&mut a, &mut b, 8), Some(3));

    assert!(!a.engine.table().local_enabled(consts::option::ECHO));
    assert!(!b.engine.table().remote_enabled(consts::option::ECHO));
    assert!(!a.engine.table().has_pending());
    assert!(!b.engine.table().has_pending());
    assert!(!b.engine.is_modern_client());
    assert_eq!(
        b.engine.table().get(consts::option::ECHO).remote_wanted(),
        YesNo::No
    );
}

#[test]
fn two_daemons_agree_on_binary() {
    let mut a = Endpoint::new();
    let mut b = Endpoint::new();

    a.engine
        .request_remote_enable(&mut a.session, TelnetOption::TransmitBinary, true);
    b.engine
        .request_remote_enable(&mut b.session, TelnetOption::TransmitBinary, true);
    assert!(exchange(&mut a, &mut b, 8).is_some());

    for endpoint in [&a, &b] {
        let table = endpoint.engine.table();
        assert!(table.local_enabled(consts::option::BINARY));
        assert!(table.remote_enabled(consts::option::BINARY));
        assert!(!table.has_pending());
    }
}

#[derive(Clone, Copy, Debug)]
enum Request {
    LocalEnable,
    LocalDisable,
    RemoteEnable,
    RemoteDisable,
}

const OPTIONS: [TelnetOption; 8] = [
    TelnetOption::TransmitBinary,
    TelnetOption::Echo,
    TelnetOption::SuppressGoAhead,
    TelnetOption::Status,
    TelnetOption::TTYPE,
    TelnetOption::NAWS,
    TelnetOption::Linemode,
    TelnetOption::Unknown(200),
];

fn request_strategy() -> impl Strategy<Value = (bool, Request, usize)> {
    (
        any::<bool>(),
        prop_oneof![
            Just(Request::LocalEnable),
            Just(Request::LocalDisable),
            Just(Request::RemoteEnable),
            Just(Request::RemoteDisable),
        ],
        0..OPTIONS.len(),
    )
}

impl Request {
    fn side(self) -> TelnetSide {
        match self {
            Request::LocalEnable | Request::LocalDisable => TelnetSide::Local,
            Request::RemoteEnable | Request::RemoteDisable => TelnetSide::Remote,
        }
    }
}

fn issue(endpoint: &mut Endpoint, request: Request, option: TelnetOption) {
    let session = &mut endpoint.session;
    match request {
        Request::LocalEnable => endpoint.engine.request_local_enable(session, option, true),
        Request::LocalDisable => endpoint.engine.request_local_disable(session, option, true),
        Request::RemoteEnable => endpoint.engine.request_remote_enable(session, option, true),
        Request::RemoteDisable => endpoint.engine.request_remote_disable(session, option, true),
    }
}

/// Number of WILL/WONT/DO/DONT commands in `bytes`.
fn negotiation_commands(bytes: &[u8]) -> usize {
    bytes
        .windows(3)
        .filter(|cmd| cmd[0] == consts::IAC && (consts::WILL..=consts::DONT).contains(&cmd[1]))
        .count()
}

proptest! {
    #[test]
    fn negotiation_converges(requests in prop::collection::vec(request_strategy(), 1..40)) {
        let mut a = Endpoint::new();
        let mut b = Endpoint::new();

        for (on_a, request, index) in requests {
            issue(if on_a { &mut a } else { &mut b }, request, OPTIONS[index]);
            prop_assert!(exchange(&mut a, &mut b, 8).is_some());
            prop_assert!(!a.engine.table().has_pending());
            prop_assert!(!b.engine.table().has_pending());
        }

        for option in OPTIONS {
            let code = option.to_u8();
            prop_assert_eq!(
                a.engine.table().local_enabled(code),
                b.engine.table().remote_enabled(code)
            );
            prop_assert_eq!(
                a.engine.table().remote_enabled(code),
                b.engine.table().local_enabled(code)
            );
        }
    }

    #[test]
    fn scripted_peer_keeps_requests_bounded(
        request in request_strategy(),
        answers in prop::collection::vec(any::<bool>(), 0..24),
    ) {
        let (_, request, index) = request;
        let option = OPTIONS[index];
        let code = option.to_u8();
        let side = request.side();
        let (yes, no) = match side {
            TelnetSide::Local => (consts::DO, consts::DONT),
            TelnetSide::Remote => (consts::WILL, consts::WONT),
        };

        let mut daemon = Endpoint::new();
        issue(&mut daemon, request, option);
        daemon.engine.flush_output(&mut daemon.session);
        let pending = |daemon: &Endpoint| daemon.engine.table().get(code).side(side).pending();
        prop_assert!(pending(&daemon) <= 1);

        for (sent, positive) in answers.iter().enumerate() {
            let before = pending(&daemon);
            daemon.receive(&[consts::IAC, if *positive { yes } else { no }, code]);
            let after = pending(&daemon);
            prop_assert!(before.saturating_sub(after) <= 2);
            prop_assert!(after <= 2);
            prop_assert!(negotiation_commands(&daemon.session.network) <= sent + 2);
        }
    }

    #[test]
    fn batched_requests_converge(requests in prop::collection::vec(request_strategy(), 1..12)) {
        let mut a = Endpoint::new();
        let mut b = Endpoint::new();

        for (_, request, index) in requests {
            issue(&mut a, request, OPTIONS[index]);
        }
        prop_assert!(exchange(&mut a, &mut b, 16).is_some());
        prop_assert!(!a.engine.table().has_pending());
        prop_assert!(!b.engine.table().has_pending());

        for option in OPTIONS {
            let code = option.to_u8();
            prop_assert_eq!(
                a.engine.table().local_enabled(code),
                b.engine.table().remote_enabled(code)
            );
            prop_assert_eq!(
                a.engine.table().remote_enabled(code),
                b.engine.table().local_enabled(code)
            );
        }
    }
}

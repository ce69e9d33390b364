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

//! Option negotiation
//!
//! Requests initiated by the daemon and the handling of `WILL`/`WONT`/`DO`/`DONT`
//! received from the peer. Every option direction follows the same loop-free rules
//! (see [`SideState`](crate::SideState)); the per-option differences are limited to
//! the accept/refuse decision and the side effects on the session.

use crate::engine::LinemodeKind;
use crate::{
    ClientStatus, Session, TelnetEngine, TelnetOption, TelnetSide, Transport, YesNo, consts,
};
use tracing::{debug, trace};

impl TelnetEngine {
    /// Ask to perform `option` ourselves (`WILL`).
    ///
    /// With `fresh` set the request is subject to loop avoidance and bookkeeping.
    /// Without it the command is transmitted unconditionally and the table is untouched.
    pub fn request_local_enable<S: Transport + ?Sized>(
        &mut self,
        session: &mut S,
        option: TelnetOption,
        fresh: bool,
    ) {
        self.initiate(session, TelnetSide::Local, option.to_u8(), YesNo::Yes, fresh);
    }

    /// Announce that we stop performing `option` (`WONT`).
    pub fn request_local_disable<S: Transport + ?Sized>(
        &mut self,
        session: &mut S,
        option: TelnetOption,
        fresh: bool,
    ) {
        self.initiate(session, TelnetSide::Local, option.to_u8(), YesNo::No, fresh);
    }

    /// Ask the peer to perform `option` (`DO`).
    pub fn request_remote_enable<S: Transport + ?Sized>(
        &mut self,
        session: &mut S,
        option: TelnetOption,
        fresh: bool,
    ) {
        self.initiate(session, TelnetSide::Remote, option.to_u8(), YesNo::Yes, fresh);
    }

    /// Ask the peer to stop performing `option` (`DONT`).
    pub fn request_remote_disable<S: Transport + ?Sized>(
        &mut self,
        session: &mut S,
        option: TelnetOption,
        fresh: bool,
    ) {
        self.initiate(session, TelnetSide::Remote, option.to_u8(), YesNo::No, fresh);
    }

    fn initiate<S: Transport + ?Sized>(
        &mut self,
        session: &mut S,
        side: TelnetSide,
        option: u8,
        desired: YesNo,
        fresh: bool,
    ) {
        if fresh {
            let state = self.table.get_mut(option).side_mut(side);
            if !state.initiate(desired) {
                trace!(%side, option = %TelnetOption::from(option), %desired, "request already satisfied");
                return;
            }
            // TIMING-MARK is a probe, never a state.
            if option == consts::option::TM && desired.is_yes() {
                state.want(YesNo::No);
            }
        }
        self.send_command(session, command_for(side, desired), option);
    }

    /// The peer sent `WILL option`.
    pub fn on_peer_will<S: Session + ?Sized>(&mut self, session: &mut S, option: u8) {
        let state = self.table.get_mut(option).side_mut(TelnetSide::Remote);
        state.acknowledge(YesNo::Yes);
        let confirmed = state.pending() == 0
            && state.wanted() == YesNo::Yes
            && state.enabled() == YesNo::No;
        if confirmed && option == consts::option::LINEMODE {
            // Our own DO LINEMODE was granted.
            self.linemode = LinemodeKind::Real;
            session.notify(ClientStatus::Linemode(true));
        } else if state.needs_decision(YesNo::Yes) {
            let accepted = match TelnetOption::from(option) {
                opt if !self.config.support.supports_remote(opt) => false,
                TelnetOption::TimingMark => {
                    self.timing_mark_offered(session);
                    return;
                }
                TelnetOption::TransmitBinary => {
                    session.begin();
                    session.set_binary_in(true);
                    session.commit();
                    true
                }
                TelnetOption::Echo => {
                    // Old 4.2BSD clients offer to echo; refuse and remember.
                    self.modern_client = false;
                    false
                }
                TelnetOption::LFLOW => {
                    session.notify(ClientStatus::RemoteFlowControl(true));
                    true
                }
                TelnetOption::Linemode => {
                    self.linemode = LinemodeKind::Real;
                    session.notify(ClientStatus::Linemode(true));
                    true
                }
                _ => true,
            };
            self.decide(session, TelnetSide::Remote, option, YesNo::Yes, accepted);
        }
        self.table
            .get_mut(option)
            .side_mut(TelnetSide::Remote)
            .record(YesNo::Yes);
    }

    /// The peer sent `WONT option`.
    pub fn on_peer_wont<S: Session + ?Sized>(&mut self, session: &mut S, option: u8) {
        let state = self.table.get_mut(option).side_mut(TelnetSide::Remote);
        state.acknowledge(YesNo::No);
        if state.pending() == 0 {
            if state.wanted() != YesNo::No {
                match TelnetOption::from(option) {
                    TelnetOption::TimingMark => {
                        state.want(YesNo::No);
                        return;
                    }
                    TelnetOption::Echo => self.modern_client = true,
                    TelnetOption::TransmitBinary => {
                        session.begin();
                        session.set_binary_in(false);
                        session.commit();
                    }
                    TelnetOption::Linemode => {
                        if !self.config.kludge_linemode || self.linemode == LinemodeKind::Real {
                            session.notify(ClientStatus::Linemode(false));
                        }
                    }
                    TelnetOption::LFLOW => {
                        session.notify(ClientStatus::RemoteFlowControl(false));
                    }
                    _ => {}
                }
                self.decide(session, TelnetSide::Remote, option, YesNo::No, true);
            } else if option == consts::option::TM {
                self.timing_mark_refused(session);
            }
        }
        self.table
            .get_mut(option)
            .side_mut(TelnetSide::Remote)
            .record(YesNo::No);
    }

    /// The peer sent `DO option`.
    pub fn on_peer_do<S: Session + ?Sized>(&mut self, session: &mut S, option: u8) {
        let state = self.table.get_mut(option).side_mut(TelnetSide::Local);
        state.acknowledge(YesNo::Yes);
        if state.needs_decision(YesNo::Yes) {
            let accepted = match TelnetOption::from(option) {
                opt if !self.config.support.supports_local(opt) => false,
                TelnetOption::TimingMark => {
                    // Answer the mark, then forget it was ever on.
                    self.send_command(session, consts::WILL, option);
                    let state = self.table.get_mut(option).side_mut(TelnetSide::Local);
                    state.want(YesNo::No);
                    state.record(YesNo::No);
                    return;
                }
                TelnetOption::Echo => {
                    if self.linemode == LinemodeKind::None {
                        session.begin();
                        session.set_echo(true);
                        session.commit();
                    }
                    true
                }
                TelnetOption::TransmitBinary => {
                    session.begin();
                    session.set_binary_out(true);
                    session.commit();
                    true
                }
                TelnetOption::SuppressGoAhead => {
                    if self.linemode == LinemodeKind::Kludge {
                        session.notify(ClientStatus::Linemode(false));
                        // The editor may still insist on line editing.
                        !session.is_line_mode()
                    } else {
                        true
                    }
                }
                _ => true,
            };
            self.decide(session, TelnetSide::Local, option, YesNo::Yes, accepted);
        }
        self.table
            .get_mut(option)
            .side_mut(TelnetSide::Local)
            .record(YesNo::Yes);
    }

    /// The peer sent `DONT option`.
    pub fn on_peer_dont<S: Session + ?Sized>(&mut self, session: &mut S, option: u8) {
        let state = self.table.get_mut(option).side_mut(TelnetSide::Local);
        state.acknowledge(YesNo::No);
        if state.needs_decision(YesNo::No) {
            match TelnetOption::from(option) {
                TelnetOption::TransmitBinary => {
                    session.begin();
                    session.set_binary_out(false);
                    session.commit();
                }
                TelnetOption::Echo => {
                    if self.linemode == LinemodeKind::None {
                        session.begin();
                        session.set_echo(false);
                        session.commit();
                    }
                }
                TelnetOption::SuppressGoAhead => {
                    if self.linemode == LinemodeKind::Kludge {
                        session.notify(ClientStatus::Linemode(true));
                    }
                }
                _ => {}
            }
            self.decide(session, TelnetSide::Local, option, YesNo::No, true);
        }
        self.table
            .get_mut(option)
            .side_mut(TelnetSide::Local)
            .record(YesNo::No);
    }

    /// Accept or refuse an unsolicited announcement and send the reply.
    fn decide<S: Transport + ?Sized>(
        &mut self,
        session: &mut S,
        side: TelnetSide,
        option: u8,
        announced: YesNo,
        accepted: bool,
    ) {
        let state = self.table.get_mut(option).side_mut(side);
        let reply = if accepted {
            state.want(announced);
            announced
        } else {
            state.refuse();
            YesNo::No
        };
        debug!(
            %side,
            option = %TelnetOption::from(option),
            %announced,
            accepted,
            "peer announcement"
        );
        self.send_command(session, command_for(side, reply), option);
    }

    /// `WILL TIMING-MARK` in answer to our probe: the client edits lines itself.
    fn timing_mark_offered<S: Session + ?Sized>(&mut self, session: &mut S) {
        if self.config.kludge_linemode && self.linemode < LinemodeKind::Kludge {
            debug!("client answered timing mark, using kludge line mode");
            self.linemode = LinemodeKind::Kludge;
            session.notify(ClientStatus::Linemode(true));
            self.request_local_disable(session, TelnetOption::SuppressGoAhead, true);
        }
    }

    /// `WONT TIMING-MARK` in answer to our probe: character-at-a-time client.
    fn timing_mark_refused<S: Session + ?Sized>(&mut self, session: &mut S) {
        if self.config.kludge_linemode && self.linemode < LinemodeKind::Real {
            self.linemode = LinemodeKind::None;
            session.notify(ClientStatus::Linemode(false));
            self.request_local_enable(session, TelnetOption::SuppressGoAhead, true);
            self.request_local_enable(session, TelnetOption::Echo, true);
        }
    }
}

fn command_for(side: TelnetSide, state: YesNo) -> u8 {
    match (side, state) {
        (TelnetSide::Local, YesNo::Yes) => consts::WILL,
        (TelnetSide::Local, YesNo::No) => consts::WONT,
        (TelnetSide::Remote, YesNo::Yes) => consts::DO,
        (TelnetSide::Remote, YesNo::No) => consts::DONT,
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::LinemodeKind;
    use crate::testing::{Call, MockSession, enable_local};
    use crate::{ClientStatus, EngineConfig, TelnetEngine, TelnetOption, YesNo, consts};

    fn engine() -> TelnetEngine {
        TelnetEngine::new(EngineConfig::default())
    }

    // ============================================================================
    // Initiation Tests
    // ============================================================================

    #[test]
    fn fresh_request_is_sent_once() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.request_local_enable(&mut session, TelnetOption::Echo, true);
        engine.request_local_enable(&mut session, TelnetOption::Echo, true);

        assert_eq!(session.network, [consts::IAC, consts::WILL, consts::option::ECHO]);
        let state = engine.table().get(consts::option::ECHO);
        assert_eq!(state.local_wanted(), YesNo::Yes);
        assert_eq!(state.pending_local_resp(), 1);
    }

    #[test]
    fn request_matching_enabled_state_is_suppressed() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.request_remote_disable(&mut session, TelnetOption::NAWS, true);
        assert!(session.network.is_empty());

        enable_local(&mut engine, &mut session, TelnetOption::SuppressGoAhead);
        engine.request_local_enable(&mut session, TelnetOption::SuppressGoAhead, true);
        assert!(session.network.is_empty());
    }

    #[test]
    fn unforced_request_skips_bookkeeping() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.request_remote_enable(&mut session, TelnetOption::TTYPE, false);
        engine.request_remote_enable(&mut session, TelnetOption::TTYPE, false);

        assert_eq!(session.network.len(), 6);
        assert!(!engine.table().has_pending());
    }

    #[test]
    fn timing_mark_request_is_never_wanted() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.request_remote_enable(&mut session, TelnetOption::TimingMark, true);
        engine.request_remote_enable(&mut session, TelnetOption::TimingMark, true);

        assert_eq!(session.network.len(), 6);
        let state = engine.table().get(consts::option::TM);
        assert_eq!(state.remote_wanted(), YesNo::No);
        assert_eq!(state.pending_remote_resp(), 2);
    }

    // ============================================================================
    // Peer Announcement Tests
    // ============================================================================

    #[test]
    fn unsolicited_do_echo_is_accepted() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.on_peer_do(&mut session, consts::option::ECHO);

        assert_eq!(session.network, [consts::IAC, consts::WILL, consts::option::ECHO]);
        let state = engine.table().get(consts::option::ECHO);
        assert_eq!(state.local_enabled(), YesNo::Yes);
        assert_eq!(state.local_wanted(), YesNo::Yes);
        assert_eq!(state.pending_local_resp(), 0);
        assert_eq!(session.calls, [Call::Begin, Call::Echo(true), Call::Commit]);
    }

    #[test]
    fn solicited_will_gets_no_reply() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.request_remote_enable(&mut session, TelnetOption::NAWS, true);
        session.network.clear();
        engine.on_peer_will(&mut session, consts::option::NAWS);

        assert!(session.network.is_empty());
        assert!(engine.table().remote_enabled(consts::option::NAWS));
        assert!(!engine.table().has_pending());
    }

    #[test]
    fn will_echo_is_refused_and_marks_old_client() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.on_peer_will(&mut session, consts::option::ECHO);
        assert_eq!(session.network, [consts::IAC, consts::DONT, consts::option::ECHO]);
        assert!(!engine.is_modern_client());
        assert_eq!(engine.table().get(consts::option::ECHO).pending_remote_resp(), 1);

        session.network.clear();
        engine.on_peer_wont(&mut session, consts::option::ECHO);
        assert!(session.network.is_empty());
        assert!(!engine.table().remote_enabled(consts::option::ECHO));
        assert!(!engine.table().has_pending());
    }

    #[test]
    fn unsupported_option_is_refused_both_ways() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.on_peer_will(&mut session, 200);
        engine.on_peer_do(&mut session, 200);

        assert_eq!(
            session.network,
            [consts::IAC, consts::DONT, 200, consts::IAC, consts::WONT, 200]
        );
        let state = engine.table().get(200);
        assert_eq!(state.pending_remote_resp(), 1);
        assert_eq!(state.pending_local_resp(), 1);
    }

    #[test]
    fn peer_disable_is_always_honored() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.on_peer_do(&mut session, consts::option::BINARY);
        session.network.clear();
        engine.on_peer_dont(&mut session, consts::option::BINARY);

        assert_eq!(session.network, [consts::IAC, consts::WONT, consts::option::BINARY]);
        assert!(session.has_call(&Call::BinaryOut(false)));
        assert!(!engine.table().local_enabled(consts::option::BINARY));
    }

    #[test]
    fn superseded_requests_collapse() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.request_local_enable(&mut session, TelnetOption::Echo, true);
        engine.request_local_disable(&mut session, TelnetOption::Echo, true);
        assert_eq!(engine.table().get(consts::option::ECHO).pending_local_resp(), 2);

        session.network.clear();
        engine.on_peer_do(&mut session, consts::option::ECHO);
        engine.on_peer_dont(&mut session, consts::option::ECHO);

        assert!(session.network.is_empty());
        let state = engine.table().get(consts::option::ECHO);
        assert_eq!(state.local_enabled(), YesNo::No);
        assert_eq!(state.pending_local_resp(), 0);
    }

    #[test]
    fn will_linemode_selects_real_line_mode() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.on_peer_will(&mut session, consts::option::LINEMODE);

        assert_eq!(session.network, [consts::IAC, consts::DO, consts::option::LINEMODE]);
        assert_eq!(engine.linemode_kind(), LinemodeKind::Real);
        assert_eq!(session.notifications(), [ClientStatus::Linemode(true)]);
    }

    #[test]
    fn lflow_reports_flow_control() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.on_peer_will(&mut session, consts::option::LFLOW);
        engine.request_remote_disable(&mut session, TelnetOption::LFLOW, true);
        engine.on_peer_wont(&mut session, consts::option::LFLOW);
        assert_eq!(
            session.notifications(),
            [ClientStatus::RemoteFlowControl(true)]
        );

        engine.on_peer_will(&mut session, consts::option::LFLOW);
        engine.on_peer_wont(&mut session, consts::option::LFLOW);
        assert_eq!(
            session.notifications(),
            [
                ClientStatus::RemoteFlowControl(true),
                ClientStatus::RemoteFlowControl(true),
                ClientStatus::RemoteFlowControl(false),
            ]
        );
    }

    // ============================================================================
    // Timing Mark Tests
    // ============================================================================

    #[test]
    fn do_timing_mark_is_answered_and_forgotten() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.on_peer_do(&mut session, consts::option::TM);

        assert_eq!(session.network, [consts::IAC, consts::WILL, consts::option::TM]);
        let state = engine.table().get(consts::option::TM);
        assert_eq!(state.local_enabled(), YesNo::No);
        assert_eq!(state.local_wanted(), YesNo::No);
    }

    #[test]
    fn will_timing_mark_selects_kludge_line_mode() {
        let mut engine = engine();
        let mut session = MockSession::new();
        enable_local(&mut engine, &mut session, TelnetOption::SuppressGoAhead);

        engine.request_remote_enable(&mut session, TelnetOption::TimingMark, true);
        session.network.clear();
        engine.on_peer_will(&mut session, consts::option::TM);

        assert_eq!(engine.linemode_kind(), LinemodeKind::Kludge);
        assert_eq!(session.notifications(), [ClientStatus::Linemode(true)]);
        assert_eq!(session.network, [consts::IAC, consts::WONT, consts::option::SGA]);
        assert!(!engine.table().remote_enabled(consts::option::TM));
    }

    #[test]
    fn wont_timing_mark_selects_character_mode() {
        let mut engine = engine();
        let mut session = MockSession::new();

        engine.request_remote_enable(&mut session, TelnetOption::TimingMark, true);
        session.network.clear();
        engine.on_peer_wont(&mut session, consts::option::TM);

        assert_eq!(engine.linemode_kind(), LinemodeKind::None);
        assert_eq!(session.notifications(), [ClientStatus::Linemode(false)]);
        assert_eq!(
            session.network,
            [
                consts::IAC,
                consts::WILL,
                consts::option::SGA,
                consts::IAC,
                consts::WILL,
                consts::option::ECHO,
            ]
        );
    }

    #[test]
    fn timing_mark_does_not_downgrade_real_line_mode() {
        let mut engine = engine();
        let mut session = MockSession::new();
        engine.on_peer_will(&mut session, consts::option::LINEMODE);

        engine.request_remote_enable(&mut session, TelnetOption::TimingMark, true);
        engine.on_peer_will(&mut session, consts::option::TM);

        assert_eq!(engine.linemode_kind(), LinemodeKind::Real);
    }

    #[test]
    fn kludge_disabled_ignores_timing_mark() {
        let mut engine = TelnetEngine::new(EngineConfig::default().with_kludge_linemode(false));
        let mut session = MockSession::new();

        engine.request_remote_enable(&mut session, TelnetOption::TimingMark, true);
        session.network.clear();
        engine.on_peer_will(&mut session, consts::option::TM);

        assert_eq!(engine.linemode_kind(), LinemodeKind::None);
        assert!(session.network.is_empty());
        assert!(session.notifications().is_empty());
    }

    #[test]
    fn do_sga_under_kludge_defers_to_line_editor() {
        let mut engine = engine();
        let mut session = MockSession::new();
        engine.linemode = LinemodeKind::Kludge;
        session.line_mode = true;

        engine.on_peer_do(&mut session, consts::option::SGA);

        assert_eq!(session.notifications(), [ClientStatus::Linemode(false)]);
        assert_eq!(session.network, [consts::IAC, consts::WONT, consts::option::SGA]);
        assert_eq!(engine.table().get(consts::option::SGA).pending_local_resp(), 1);
    }

    #[test]
    fn dont_sga_under_kludge_requests_line_mode() {
        let mut engine = engine();
        let mut session = MockSession::new();
        enable_local(&mut engine, &mut session, TelnetOption::SuppressGoAhead);
        engine.linemode = LinemodeKind::Kludge;

        engine.on_peer_dont(&mut session, consts::option::SGA);

        assert_eq!(session.notifications(), [ClientStatus::Linemode(true)]);
        assert_eq!(session.network, [consts::IAC, consts::WONT, consts::option::SGA]);
    }
}

//! The status monitor: one owned object per feed connection.
//!
//! `StatusMonitor` glues the pure domain pieces together. Transport events go
//! in through [`StatusMonitor::handle_transport_event`]; the monitor updates
//! the snapshot, writes to its [`RenderSink`], and answers with the
//! [`Directive`]s (timers, sockets) that only an async driver can carry out.

use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use lantern_shared::time::{Clock, local_offset};

use crate::domain::presentation::{
    players_in_group, project_group, project_summary, project_uptime,
};
use crate::domain::{
    Applied, ConnectionAction, ConnectionManager, ConnectionPhase, ConnectionState,
    ReconnectPolicy, RenderSink, ServerGroup, SessionId, Snapshot, StateReconciler,
    TransportEvent, UptimeKind, UptimeReading, UptimeTicker,
};

/// Work for the async driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Connect { session: SessionId },
    ArmConnectTimeout { session: SessionId, after: Duration },
    CancelConnectTimeout,
    CloseTransport { session: SessionId },
    ScheduleReconnect { after: Duration },
    /// Replace the 1 s interval; ticks must carry this generation
    RestartTicker { generation: u64 },
    StopTicker,
    /// Terminal: the connection will not be retried
    GiveUp { attempts: u32 },
}

pub struct StatusMonitor<S: RenderSink> {
    groups: Vec<ServerGroup>,
    connection: ConnectionManager,
    reconciler: StateReconciler,
    ticker: UptimeTicker,
    sink: S,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl<S: RenderSink> StatusMonitor<S> {
    pub fn new(
        groups: Vec<ServerGroup>,
        policy: ReconnectPolicy,
        sink: S,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            groups,
            connection: ConnectionManager::new(policy),
            reconciler: StateReconciler::new(),
            ticker: UptimeTicker::new(),
            sink,
            clock,
            offset: local_offset(),
        }
    }

    /// Use a fixed UTC offset for timestamps instead of the local one
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn start(&mut self) -> Vec<Directive> {
        let actions = self.connection.start();
        self.execute(actions)
    }

    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Vec<Directive> {
        let actions = self.connection.handle_transport_event(event);
        self.execute(actions)
    }

    /// One tick of the uptime interval started by `RestartTicker { generation }`.
    pub fn tick(&mut self, generation: u64) {
        if generation != self.ticker.generation() || !self.ticker.is_active() {
            tracing::trace!("Dropping tick for stale ticker generation {}", generation);
            return;
        }
        self.render_uptime(self.phase());
    }

    /// The phase as the surface shows it.
    ///
    /// A retry that is still connecting keeps the reconnecting overlay until
    /// the connection opens.
    pub fn phase(&self) -> ConnectionPhase {
        match self.connection.state() {
            ConnectionState::Idle => ConnectionPhase::Connecting,
            ConnectionState::Connecting if self.connection.attempts() > 0 => {
                ConnectionPhase::Reconnecting
            }
            ConnectionState::Connecting => ConnectionPhase::Connecting,
            ConnectionState::Open => ConnectionPhase::Open,
            ConnectionState::Reconnecting { .. } => ConnectionPhase::Reconnecting,
            ConnectionState::Failed => ConnectionPhase::Failed,
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.reconciler.snapshot()
    }

    pub fn groups(&self) -> &[ServerGroup] {
        &self.groups
    }

    /// Usernames on the group's servers; `None` for an unknown group key
    pub fn players_in_group(&self, group_key: &str) -> Option<Vec<String>> {
        self.groups
            .iter()
            .find(|group| group.key() == group_key)
            .map(|group| players_in_group(self.reconciler.snapshot(), group))
    }

    /// Extrapolated uptime right now, `None` while the ticker is stopped
    pub fn uptime_reading(&self) -> Option<UptimeReading> {
        self.ticker.reading(self.clock.now_millis())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn execute(&mut self, actions: Vec<ConnectionAction>) -> Vec<Directive> {
        let mut directives = Vec::new();
        for action in actions {
            match action {
                ConnectionAction::Connect { session } => {
                    directives.push(Directive::Connect { session })
                }
                ConnectionAction::ArmConnectTimeout { session, after } => {
                    directives.push(Directive::ArmConnectTimeout { session, after })
                }
                ConnectionAction::CancelConnectTimeout => {
                    directives.push(Directive::CancelConnectTimeout)
                }
                ConnectionAction::CloseTransport { session } => {
                    directives.push(Directive::CloseTransport { session })
                }
                ConnectionAction::ScheduleReconnect { after } => {
                    directives.push(Directive::ScheduleReconnect { after })
                }
                ConnectionAction::GiveUp { attempts } => {
                    directives.push(Directive::GiveUp { attempts })
                }
                ConnectionAction::Deliver(message) => {
                    if self.reconciler.apply(&message) == Applied::Updated {
                        self.refresh(true, &mut directives);
                    }
                }
                ConnectionAction::PhaseChanged(state) => {
                    match state {
                        ConnectionState::Failed => self.reconciler.reset_after_disconnect(),
                        ConnectionState::Reconnecting { .. } => {
                            self.reconciler.note_connection_lost()
                        }
                        _ => {}
                    }
                    self.refresh(false, &mut directives);
                }
            }
        }
        directives
    }

    /// Re-render everything. The ticker restarts only when the snapshot
    /// changed, and stops whenever an overlay or maintenance is showing.
    fn refresh(&mut self, snapshot_changed: bool, directives: &mut Vec<Directive>) {
        let phase = self.phase();
        let snapshot = self.reconciler.snapshot();

        for group in &self.groups {
            let presentation = project_group(snapshot, group, phase);
            self.sink.render(group.key(), &presentation);
        }
        self.sink
            .render_summary(&project_summary(snapshot, phase, &self.offset));
        for group in &self.groups {
            self.sink
                .render_players(group.key(), &players_in_group(snapshot, group));
        }

        let halted = snapshot.is_maintenance
            || matches!(
                phase,
                ConnectionPhase::Reconnecting | ConnectionPhase::Failed
            );
        if halted {
            if self.ticker.is_active() {
                self.ticker.stop();
                directives.push(Directive::StopTicker);
            }
        } else if snapshot_changed {
            self.ticker.restart(
                snapshot.running_time_seconds,
                snapshot.total_running_time_seconds,
                self.clock.now_millis(),
            );
            directives.push(Directive::RestartTicker {
                generation: self.ticker.generation(),
            });
        }

        self.render_uptime(phase);
    }

    fn render_uptime(&mut self, phase: ConnectionPhase) {
        let reading = self.ticker.reading(self.clock.now_millis());
        let snapshot = self.reconciler.snapshot();
        for kind in [UptimeKind::Current, UptimeKind::Cumulative] {
            let seconds = reading.and_then(|r| match kind {
                UptimeKind::Current => r.running_seconds,
                UptimeKind::Cumulative => r.total_running_seconds,
            });
            let text = project_uptime(snapshot, phase, kind, seconds);
            self.sink.render_uptime(kind, &text);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use lantern_shared::time::ManualClock;
    use mockall::predicate::eq;

    use super::*;
    use crate::domain::sink::MockRenderSink;
    use crate::domain::{ColorClass, Presentation, ServerId, Summary};

    /// Keeps the latest value per key, like a real surface would
    #[derive(Debug, Default)]
    struct LatestSink {
        groups: HashMap<String, Presentation>,
        uptime: HashMap<UptimeKind, String>,
        summary: Option<Summary>,
        players: HashMap<String, Vec<String>>,
    }

    impl RenderSink for LatestSink {
        fn render(&mut self, group_key: &str, presentation: &Presentation) {
            self.groups
                .insert(group_key.to_string(), presentation.clone());
        }

        fn render_uptime(&mut self, kind: UptimeKind, text: &str) {
            self.uptime.insert(kind, text.to_string());
        }

        fn render_summary(&mut self, summary: &Summary) {
            self.summary = Some(summary.clone());
        }

        fn render_players(&mut self, group_key: &str, usernames: &[String]) {
            self.players
                .insert(group_key.to_string(), usernames.to_vec());
        }
    }

    impl LatestSink {
        fn label(&self, group_key: &str) -> &str {
            &self.groups[group_key].label
        }
    }

    fn groups() -> Vec<ServerGroup> {
        vec![
            ServerGroup::aggregate(
                "all",
                "All",
                vec![ServerId::new("a"), ServerId::new("b"), ServerId::new("c")],
            )
            .unwrap(),
            ServerGroup::single("a", "A", ServerId::new("a")),
        ]
    }

    fn policy(max_attempts: u32) -> ReconnectPolicy {
        ReconnectPolicy {
            connect_timeout: Duration::from_millis(5000),
            max_attempts,
            delays: vec![Duration::from_millis(10_000)],
        }
    }

    fn open_monitor(clock: Arc<ManualClock>) -> StatusMonitor<LatestSink> {
        let mut monitor = StatusMonitor::new(groups(), policy(3), LatestSink::default(), clock)
            .with_offset(FixedOffset::east_opt(0).unwrap());
        monitor.start();
        monitor.handle_transport_event(TransportEvent::Opened { session: 1 });
        monitor
    }

    fn frame(monitor: &mut StatusMonitor<LatestSink>, text: &str) -> Vec<Directive> {
        let session = monitor.connection.session();
        monitor.handle_transport_event(TransportEvent::Frame {
            session,
            text: text.to_string(),
        })
    }

    fn close(monitor: &mut StatusMonitor<LatestSink>) -> Vec<Directive> {
        let session = monitor.connection.session();
        monitor.handle_transport_event(TransportEvent::Closed {
            session,
            reason: "gone".to_string(),
        })
    }

    const FULL_A: &str = r#"{"type":"full","servers":{"a":{"online":5,"isOnline":true}},"players":{"online":"5"},"runningTime":120,"totalRunningTime":86400}"#;

    #[test]
    fn test_start_renders_loading() {
        // テスト項目: 接続開始時は全グループが loading になる
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = StatusMonitor::new(groups(), policy(3), LatestSink::default(), clock);

        // when (操作):
        let directives = monitor.start();

        // then (期待する結果):
        assert_eq!(directives[0], Directive::Connect { session: 1 });
        assert_eq!(monitor.sink().label("all"), "loading");
        assert!(monitor.sink().groups["a"].pulsing);
        assert_eq!(monitor.sink().uptime[&UptimeKind::Current], "loading");
    }

    #[test]
    fn test_full_message_projects_group_and_starts_ticker() {
        // テスト項目: full 受信でグループが「5 online」になり、ティッカーが開始される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(1_000_000));
        let mut monitor = open_monitor(clock.clone());

        // when (操作):
        let directives = frame(&mut monitor, FULL_A);

        // then (期待する結果):
        let a = &monitor.sink().groups["a"];
        assert_eq!(a.label, "5 online");
        assert_eq!(a.color, ColorClass::Green);
        assert!(!a.pulsing);
        assert_eq!(monitor.sink().label("all"), "partially unknown");
        assert_eq!(
            directives,
            vec![Directive::RestartTicker { generation: 1 }]
        );
        assert_eq!(monitor.sink().uptime[&UptimeKind::Current], "2m");
        assert_eq!(monitor.sink().uptime[&UptimeKind::Cumulative], "1d 0h");
    }

    #[test]
    fn test_uptime_advances_between_messages() {
        // テスト項目: メッセージがなくても 3 秒後の稼働時間は 123 秒になる
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(1_000_000));
        let mut monitor = open_monitor(clock.clone());
        frame(&mut monitor, FULL_A);

        // when (操作):
        clock.advance(3_000);
        monitor.tick(1);

        // then (期待する結果):
        let reading = monitor.uptime_reading().unwrap();
        assert_eq!(reading.running_seconds, Some(123));
        assert_eq!(reading.total_running_seconds, Some(86_403));
    }

    #[test]
    fn test_incremental_update_restarts_ticker() {
        // テスト項目: 差分メッセージでもティッカーが再始動される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = open_monitor(clock.clone());
        frame(&mut monitor, FULL_A);

        // when (操作):
        let directives = frame(&mut monitor, r#"{"type":"server_update","servers":{"x":7}}"#);

        // then (期待する結果):
        assert_eq!(
            directives,
            vec![Directive::RestartTicker { generation: 2 }]
        );
        assert_eq!(
            monitor.snapshot().server(&ServerId::new("x")).map(|r| r.online_count),
            Some(7)
        );
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        // テスト項目: 古い世代のティックは描画しない
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = open_monitor(clock.clone());
        frame(&mut monitor, FULL_A);
        frame(&mut monitor, FULL_A);
        monitor.sink_mut().uptime.clear();

        // when (操作):
        monitor.tick(1);

        // then (期待する結果):
        assert!(monitor.sink().uptime.is_empty());
    }

    #[test]
    fn test_maintenance_override_survives_full_without_flag() {
        // テスト項目: メンテナンス通知後、フラグなしの full でもメンテナンスが維持される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = open_monitor(clock);
        frame(&mut monitor, FULL_A);

        // when (操作):
        let on_maintenance = frame(
            &mut monitor,
            r#"{"type":"maintenance_status_update","status":true}"#,
        );
        frame(&mut monitor, FULL_A);

        // then (期待する結果):
        assert_eq!(on_maintenance, vec![Directive::StopTicker]);
        assert!(monitor.snapshot().is_maintenance);
        assert_eq!(monitor.sink().label("a"), "maintenance");
        assert_eq!(monitor.sink().uptime[&UptimeKind::Current], "-");
        let summary = monitor.sink().summary.as_ref().unwrap();
        assert_eq!(summary.maintenance_since.as_deref(), Some("unknown time"));
    }

    #[test]
    fn test_maintenance_with_unparseable_start_time_still_applies() {
        // テスト項目: 開始時刻が解釈できなくてもメンテナンスに入り、時刻は無効と表示される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = open_monitor(clock);
        frame(&mut monitor, FULL_A);

        // when (操作):
        let directives = frame(
            &mut monitor,
            r#"{"type":"maintenance_status_update","status":true,"maintenanceStartTime":"2024-05-01T10:00:00Z"}"#,
        );

        // then (期待する結果):
        assert_eq!(directives, vec![Directive::StopTicker]);
        assert!(monitor.snapshot().is_maintenance);
        assert_eq!(monitor.sink().label("a"), "maintenance");
        let summary = monitor.sink().summary.as_ref().unwrap();
        assert_eq!(summary.maintenance_since.as_deref(), Some("invalid timestamp"));
    }

    #[test]
    fn test_non_true_maintenance_status_exits_maintenance() {
        // テスト項目: true 以外の status はメンテナンス終了として扱われる
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = open_monitor(clock);
        frame(&mut monitor, FULL_A);
        frame(
            &mut monitor,
            r#"{"type":"maintenance_status_update","status":"true"}"#,
        );

        // when (操作):
        frame(&mut monitor, r#"{"type":"maintenance_status_update","status":1}"#);

        // then (期待する結果):
        assert!(!monitor.snapshot().is_maintenance);
        assert_eq!(monitor.sink().label("a"), "5 online");
    }

    #[test]
    fn test_full_after_reconnect_drops_players_missed_while_away() {
        // テスト項目: 再接続後の full で、切断中に退出したかもしれないプレイヤーが一覧から消える
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = open_monitor(clock);
        frame(&mut monitor, FULL_A);
        frame(
            &mut monitor,
            r#"{"type":"server_update","servers":{"a":6},"player":{"uuid":"u-1","username":"steve","newServer":"a"}}"#,
        );
        close(&mut monitor);
        monitor.start();
        monitor.handle_transport_event(TransportEvent::Opened { session: 2 });
        let before_full = monitor.players_in_group("a");

        // when (操作):
        frame(&mut monitor, FULL_A);

        // then (期待する結果):
        assert_eq!(before_full, Some(vec!["steve".to_string()]));
        assert_eq!(monitor.players_in_group("a"), Some(Vec::new()));
        assert!(monitor.sink().players["a"].is_empty());
    }

    #[test]
    fn test_close_shows_reconnecting_and_keeps_snapshot() {
        // テスト項目: 一時的な切断では reconnecting が表示され、スナップショットは保持される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = open_monitor(clock);
        frame(&mut monitor, FULL_A);

        // when (操作):
        let directives = close(&mut monitor);

        // then (期待する結果):
        assert_eq!(
            directives,
            vec![
                Directive::StopTicker,
                Directive::ScheduleReconnect {
                    after: Duration::from_millis(10_000)
                },
            ]
        );
        assert_eq!(monitor.sink().label("a"), "reconnecting");
        assert_eq!(monitor.sink().uptime[&UptimeKind::Current], "reconnecting");
        assert!(monitor.snapshot().has_server_data());
    }

    #[test]
    fn test_reconnecting_overlay_persists_until_open() {
        // テスト項目: 再接続中の接続試行では reconnecting 表示が続き、接続後に解除される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = open_monitor(clock);
        frame(&mut monitor, FULL_A);
        close(&mut monitor);

        // when (操作):
        monitor.start();
        let while_connecting = monitor.sink().label("a").to_string();
        monitor.handle_transport_event(TransportEvent::Opened { session: 2 });

        // then (期待する結果):
        assert_eq!(while_connecting, "reconnecting");
        assert_eq!(monitor.sink().label("a"), "5 online");
        assert_eq!(monitor.phase(), ConnectionPhase::Open);
    }

    #[test]
    fn test_failed_resets_snapshot_and_renders_failure() {
        // テスト項目: 再試行を使い切ると connection failed になり、スナップショットが空になる
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor =
            StatusMonitor::new(groups(), policy(0), LatestSink::default(), clock);
        monitor.start();
        monitor.handle_transport_event(TransportEvent::Opened { session: 1 });
        frame(&mut monitor, FULL_A);

        // when (操作):
        let directives = close(&mut monitor);

        // then (期待する結果):
        assert!(directives.contains(&Directive::GiveUp { attempts: 0 }));
        assert!(!monitor.snapshot().has_server_data());
        let a = &monitor.sink().groups["a"];
        assert_eq!(a.label, "connection failed");
        assert_eq!(a.color, ColorClass::Red);
        assert_eq!(
            monitor.sink().uptime[&UptimeKind::Cumulative],
            "connection failed"
        );
        assert!(monitor.start().is_empty());
    }

    #[test]
    fn test_players_in_group() {
        // テスト項目: グループのサーバーにいるプレイヤー名が取得できる
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = open_monitor(clock);
        frame(&mut monitor, FULL_A);
        frame(
            &mut monitor,
            r#"{"type":"players_update_add","totalOnlinePlayers":6,"player":{"uuid":"u-1","username":"steve"}}"#,
        );
        frame(
            &mut monitor,
            r#"{"type":"server_update","servers":{"a":6},"player":{"uuid":"u-1","username":"steve","newServer":"a"}}"#,
        );

        // when (操作):
        let players = monitor.players_in_group("all");
        let unknown = monitor.players_in_group("nope");

        // then (期待する結果):
        assert_eq!(players, Some(vec!["steve".to_string()]));
        assert_eq!(unknown, None);
        assert_eq!(monitor.sink().players["a"], vec!["steve".to_string()]);
        assert_eq!(
            monitor.sink().summary.as_ref().unwrap().presentation.label,
            "6 online"
        );
    }

    #[test]
    fn test_unknown_type_does_not_refresh() {
        // テスト項目: 未知の type のメッセージでは描画が行われない
        // given (前提条件):
        // start と Opened の 2 回分の描画だけを許可する
        let mut sink = MockRenderSink::new();
        sink.expect_render().times(4).return_const(());
        sink.expect_render_summary().times(2).return_const(());
        sink.expect_render_players().times(4).return_const(());
        sink.expect_render_uptime()
            .with(eq(UptimeKind::Current), eq("loading"))
            .times(2)
            .return_const(());
        sink.expect_render_uptime()
            .with(eq(UptimeKind::Cumulative), eq("loading"))
            .times(2)
            .return_const(());
        let clock = Arc::new(ManualClock::new(0));
        let mut monitor = StatusMonitor::new(groups(), policy(3), sink, clock);
        monitor.start();
        monitor.handle_transport_event(TransportEvent::Opened { session: 1 });

        // when (操作):
        let directives = monitor.handle_transport_event(TransportEvent::Frame {
            session: 1,
            text: r#"{"type":"leaderboard","entries":[]}"#.to_string(),
        });

        // then (期待する結果):
        assert!(directives.is_empty());
        monitor.sink_mut().checkpoint();
    }
}

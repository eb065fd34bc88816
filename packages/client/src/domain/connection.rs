//! Connection state machine for the status feed.
//!
//! This module contains no I/O. The manager consumes [`TransportEvent`]s and
//! answers with [`ConnectionAction`]s that the driver executes (open a
//! socket, arm a timer, hand a message to the reconciler, ...). Every event
//! carries the session it belongs to, so a late event from an abandoned
//! session can never act on the current one.

use std::time::Duration;

use super::message::StatusMessage;

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);
/// Default number of retries after the first connection is lost
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;
/// Delay used when the configured sequence is empty
pub const FALLBACK_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Identifies one transport session; increases with every `start()`
pub type SessionId = u64;

/// Retry policy for the feed connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub connect_timeout: Duration,
    pub max_attempts: u32,
    pub delays: Vec<Duration>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            delays: vec![
                Duration::from_secs(10),
                Duration::from_secs(30),
                Duration::from_secs(60),
            ],
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (0-indexed).
    ///
    /// The last configured delay repeats once the sequence is exhausted.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delays
            .get(attempt as usize)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or(FALLBACK_RECONNECT_DELAY)
    }
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `current_attempt` - The number of retries already made (0-indexed)
/// * `max_attempts` - The maximum number of retries allowed
///
/// # Returns
///
/// `true` if reconnection should be attempted, `false` otherwise
pub fn should_attempt_reconnect(current_attempt: u32, max_attempts: u32) -> bool {
    current_attempt < max_attempts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, `start()` not called yet
    Idle,
    Connecting,
    Open,
    Reconnecting { attempt: u32, next_delay: Duration },
    /// Retries exhausted; terminal
    Failed,
}

/// Something that happened on the transport or its timers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened { session: SessionId },
    Frame { session: SessionId, text: String },
    Closed { session: SessionId, reason: String },
    Errored { session: SessionId, message: String },
    ConnectTimeoutElapsed { session: SessionId },
}

impl TransportEvent {
    pub fn session(&self) -> SessionId {
        match self {
            TransportEvent::Opened { session }
            | TransportEvent::Frame { session, .. }
            | TransportEvent::Closed { session, .. }
            | TransportEvent::Errored { session, .. }
            | TransportEvent::ConnectTimeoutElapsed { session } => *session,
        }
    }
}

/// Work the driver must carry out, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    Connect { session: SessionId },
    ArmConnectTimeout { session: SessionId, after: Duration },
    CancelConnectTimeout,
    CloseTransport { session: SessionId },
    Deliver(StatusMessage),
    PhaseChanged(ConnectionState),
    ScheduleReconnect { after: Duration },
    GiveUp { attempts: u32 },
}

#[derive(Debug)]
pub struct ConnectionManager {
    policy: ReconnectPolicy,
    state: ConnectionState,
    attempts: u32,
    session: SessionId,
    timeout_armed: bool,
}

impl ConnectionManager {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Idle,
            attempts: 0,
            session: 0,
            timeout_armed: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Retries made since the last successful open
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Open a new session, replacing any current one.
    pub fn start(&mut self) -> Vec<ConnectionAction> {
        if self.state == ConnectionState::Failed {
            tracing::warn!("Connection has permanently failed; not starting a new session");
            return Vec::new();
        }

        let mut actions = Vec::new();
        self.cancel_timeout(&mut actions);
        if matches!(self.state, ConnectionState::Connecting | ConnectionState::Open) {
            actions.push(ConnectionAction::CloseTransport {
                session: self.session,
            });
        }

        self.session += 1;
        self.state = ConnectionState::Connecting;
        self.timeout_armed = true;
        tracing::info!(
            "Connecting to status feed (session {}, retry {}/{})",
            self.session,
            self.attempts,
            self.policy.max_attempts
        );

        actions.push(ConnectionAction::Connect {
            session: self.session,
        });
        actions.push(ConnectionAction::ArmConnectTimeout {
            session: self.session,
            after: self.policy.connect_timeout,
        });
        actions.push(ConnectionAction::PhaseChanged(self.state));
        actions
    }

    /// The single entry point for everything the transport reports.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Vec<ConnectionAction> {
        if event.session() != self.session {
            tracing::debug!(
                "Ignoring event for stale session {} (current {})",
                event.session(),
                self.session
            );
            return Vec::new();
        }

        match event {
            TransportEvent::Opened { .. } => self.on_open(),
            TransportEvent::Frame { text, .. } => self.on_frame(&text),
            TransportEvent::Closed { reason, .. } => self.on_connection_lost(&reason),
            TransportEvent::Errored { message, .. } => self.on_connection_lost(&message),
            TransportEvent::ConnectTimeoutElapsed { session } => {
                if self.state != ConnectionState::Connecting || !self.timeout_armed {
                    return Vec::new();
                }
                self.timeout_armed = false;
                tracing::info!("Connection attempt timed out; closing session {}", session);
                // Force-close and then take the ordinary close path
                let mut actions = vec![ConnectionAction::CloseTransport { session }];
                actions.extend(self.on_connection_lost("connect timeout"));
                actions
            }
        }
    }

    fn cancel_timeout(&mut self, actions: &mut Vec<ConnectionAction>) {
        if self.timeout_armed {
            self.timeout_armed = false;
            actions.push(ConnectionAction::CancelConnectTimeout);
        }
    }

    fn on_open(&mut self) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        let mut actions = Vec::new();
        self.cancel_timeout(&mut actions);
        self.attempts = 0;
        self.state = ConnectionState::Open;
        tracing::info!("Connected to status feed (session {})", self.session);
        actions.push(ConnectionAction::PhaseChanged(self.state));
        actions
    }

    fn on_frame(&mut self, text: &str) -> Vec<ConnectionAction> {
        if self.state != ConnectionState::Open {
            return Vec::new();
        }
        match text.parse::<StatusMessage>() {
            Ok(message) => {
                tracing::debug!("Status message: type: {}, {}", message.kind(), message.summary());
                vec![ConnectionAction::Deliver(message)]
            }
            Err(e) => {
                tracing::warn!(
                    "Dropping frame: {} (raw: {})",
                    e,
                    text.chars().take(200).collect::<String>()
                );
                Vec::new()
            }
        }
    }

    fn on_connection_lost(&mut self, reason: &str) -> Vec<ConnectionAction> {
        if !matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        ) {
            // Already handled (e.g. an error followed by a close)
            return Vec::new();
        }

        let mut actions = Vec::new();
        self.cancel_timeout(&mut actions);
        tracing::warn!("Connection lost: {}", reason);

        if should_attempt_reconnect(self.attempts, self.policy.max_attempts) {
            let delay = self.policy.delay_for(self.attempts);
            self.attempts += 1;
            self.state = ConnectionState::Reconnecting {
                attempt: self.attempts,
                next_delay: delay,
            };
            tracing::info!(
                "Reconnecting in {:?}... (attempt {}/{})",
                delay,
                self.attempts,
                self.policy.max_attempts
            );
            actions.push(ConnectionAction::PhaseChanged(self.state));
            actions.push(ConnectionAction::ScheduleReconnect { after: delay });
        } else {
            self.state = ConnectionState::Failed;
            tracing::error!(
                "Failed to reconnect after {} attempts. Giving up.",
                self.attempts
            );
            actions.push(ConnectionAction::PhaseChanged(self.state));
            actions.push(ConnectionAction::GiveUp {
                attempts: self.attempts,
            });
        }
        actions
    }
}

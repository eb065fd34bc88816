//! Pure derivation of what the rendering surface shows.
//!
//! Nothing here mutates the snapshot. Precedence, from strongest to weakest:
//! permanent connection failure, maintenance, reconnecting, the per-group data
//! rules, and finally "loading" while nothing has been received.

use std::collections::BTreeSet;

use chrono::FixedOffset;
use lantern_shared::time::timestamp_to_display;

use super::duration::{DurationMode, LOADING_TEXT, format_seconds};
use super::group::ServerGroup;
use super::snapshot::{MaintenanceStart, Snapshot};

pub const MAINTENANCE_TEXT: &str = "maintenance";
pub const PARTIALLY_UNKNOWN_TEXT: &str = "partially unknown";
pub const UNKNOWN_TEXT: &str = "unknown";
pub const OFFLINE_TEXT: &str = "offline";
pub const ONLINE_SUFFIX: &str = "online";
pub const RECONNECTING_TEXT: &str = "reconnecting";
pub const CONNECTION_FAILED_TEXT: &str = "connection failed";
/// Uptime placeholder while in maintenance
pub const NO_UPTIME_TEXT: &str = "-";
pub const UNKNOWN_TIME_TEXT: &str = "unknown time";
pub const INVALID_TIMESTAMP_TEXT: &str = "invalid timestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorClass {
    Green,
    Yellow,
    Red,
}

/// (label, color, pulsing) for one entry on the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub label: String,
    pub color: ColorClass,
    pub pulsing: bool,
}

impl Presentation {
    fn new(label: impl Into<String>, color: ColorClass, pulsing: bool) -> Self {
        Self {
            label: label.into(),
            color,
            pulsing,
        }
    }

    fn loading() -> Self {
        Self::new(LOADING_TEXT, ColorClass::Yellow, true)
    }

    fn maintenance(phase: ConnectionPhase) -> Self {
        let label = if phase == ConnectionPhase::Reconnecting {
            format!("{} ({})", MAINTENANCE_TEXT, RECONNECTING_TEXT)
        } else {
            MAINTENANCE_TEXT.to_string()
        };
        Self::new(label, ColorClass::Yellow, false)
    }

    fn reconnecting() -> Self {
        Self::new(RECONNECTING_TEXT, ColorClass::Yellow, true)
    }

    fn connection_failed() -> Self {
        Self::new(CONNECTION_FAILED_TEXT, ColorClass::Red, false)
    }
}

/// The connection phase as the surface sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// First connection attempt, nothing received yet
    Connecting,
    Open,
    /// Waiting for, or in the middle of, a retry
    Reconnecting,
    /// Retries exhausted
    Failed,
}

/// Which uptime counter a text belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UptimeKind {
    /// Uptime of the current server session
    Current,
    /// Historical total uptime
    Cumulative,
}

impl UptimeKind {
    pub fn mode(self) -> DurationMode {
        match self {
            UptimeKind::Current => DurationMode::Default,
            UptimeKind::Cumulative => DurationMode::Cumulative,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            UptimeKind::Current => "current uptime",
            UptimeKind::Cumulative => "cumulative uptime",
        }
    }
}

/// The global banner: total players, or the overlay that replaces them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub presentation: Presentation,
    /// Formatted maintenance start, only while in maintenance
    pub maintenance_since: Option<String>,
}

/// Project one group.
pub fn project_group(
    snapshot: &Snapshot,
    group: &ServerGroup,
    phase: ConnectionPhase,
) -> Presentation {
    if phase == ConnectionPhase::Failed {
        return Presentation::connection_failed();
    }
    if snapshot.is_maintenance {
        return Presentation::maintenance(phase);
    }
    if phase == ConnectionPhase::Reconnecting {
        return Presentation::reconnecting();
    }
    if !snapshot.has_server_data() {
        // Nothing before first contact is "loading"; nothing from an open feed is "unknown"
        return if phase == ConnectionPhase::Open {
            Presentation::new(UNKNOWN_TEXT, ColorClass::Yellow, false)
        } else {
            Presentation::loading()
        };
    }

    let mut any_missing = false;
    let mut any_online = false;
    let mut online_count: u64 = 0;
    for member in group.members() {
        match snapshot.server(member) {
            None => any_missing = true,
            Some(record) if record.is_online => {
                any_online = true;
                online_count = online_count.saturating_add(record.online_count);
            }
            Some(_) => {}
        }
    }

    if any_missing {
        tracing::debug!(
            "Group '{}' has members missing from the snapshot",
            group.key()
        );
        Presentation::new(PARTIALLY_UNKNOWN_TEXT, ColorClass::Yellow, true)
    } else if any_online {
        Presentation::new(
            format!("{} {}", online_count, ONLINE_SUFFIX),
            ColorClass::Green,
            false,
        )
    } else {
        Presentation::new(OFFLINE_TEXT, ColorClass::Red, false)
    }
}

/// Project the global banner.
pub fn project_summary(
    snapshot: &Snapshot,
    phase: ConnectionPhase,
    offset: &FixedOffset,
) -> Summary {
    if phase == ConnectionPhase::Failed {
        return Summary {
            presentation: Presentation::connection_failed(),
            maintenance_since: None,
        };
    }
    if snapshot.is_maintenance {
        let since = match snapshot.maintenance_started_at {
            Some(MaintenanceStart::Millis(millis)) => timestamp_to_display(millis, offset)
                .unwrap_or_else(|| INVALID_TIMESTAMP_TEXT.to_string()),
            Some(MaintenanceStart::Invalid) => INVALID_TIMESTAMP_TEXT.to_string(),
            None => UNKNOWN_TIME_TEXT.to_string(),
        };
        return Summary {
            presentation: Presentation::maintenance(phase),
            maintenance_since: Some(since),
        };
    }

    let presentation = match phase {
        ConnectionPhase::Reconnecting => Presentation::reconnecting(),
        ConnectionPhase::Connecting if !snapshot.has_server_data() => Presentation::loading(),
        _ => Presentation::new(
            format!("{} {}", snapshot.total_online_players, ONLINE_SUFFIX),
            ColorClass::Green,
            false,
        ),
    };
    Summary {
        presentation,
        maintenance_since: None,
    }
}

/// Project one uptime field, given the ticker's current value for it.
pub fn project_uptime(
    snapshot: &Snapshot,
    phase: ConnectionPhase,
    kind: UptimeKind,
    seconds: Option<u64>,
) -> String {
    match phase {
        ConnectionPhase::Failed => CONNECTION_FAILED_TEXT.to_string(),
        _ if snapshot.is_maintenance => NO_UPTIME_TEXT.to_string(),
        ConnectionPhase::Reconnecting => RECONNECTING_TEXT.to_string(),
        _ => format_seconds(seconds, kind.mode()),
    }
}

/// Sorted, de-duplicated usernames currently placed on one of the group's servers.
pub fn players_in_group(snapshot: &Snapshot, group: &ServerGroup) -> Vec<String> {
    snapshot
        .players_by_username
        .iter()
        .filter(|(_, entry)| {
            entry
                .current_server
                .server()
                .is_some_and(|server| group.contains(server))
        })
        .map(|(username, _)| username.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

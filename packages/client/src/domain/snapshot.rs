//! The canonical local view of the status feed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Opaque key identifying one backend server
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the feed last said about one server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerRecord {
    pub online_count: u64,
    pub is_online: bool,
}

impl ServerRecord {
    pub fn new(online_count: u64, is_online: bool) -> Self {
        Self {
            online_count,
            is_online,
        }
    }
}

/// Where a tracked player currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentServer {
    /// Joined, but no `server_update` has placed them yet
    Unknown,
    Known(ServerId),
}

impl CurrentServer {
    pub fn server(&self) -> Option<&ServerId> {
        match self {
            CurrentServer::Unknown => None,
            CurrentServer::Known(id) => Some(id),
        }
    }
}

/// A player tracked for the who's-online lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntry {
    /// Stable player id (the authoritative key on leave)
    pub id: String,
    pub current_server: CurrentServer,
}

/// When the current maintenance window began, as reported by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceStart {
    /// Epoch milliseconds
    Millis(i64),
    /// The feed sent something that is not a timestamp
    Invalid,
}

/// Canonical in-memory copy of server, player and maintenance state
///
/// `servers` only holds servers the feed has mentioned at least once: a
/// missing key means "unknown", which is not the same as `is_online == false`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub servers: BTreeMap<ServerId, ServerRecord>,
    pub total_online_players: u64,
    pub players_by_username: HashMap<String, PlayerEntry>,
    pub running_time_seconds: Option<u64>,
    pub total_running_time_seconds: Option<u64>,
    pub is_maintenance: bool,
    pub maintenance_started_at: Option<MaintenanceStart>,
}

impl Snapshot {
    /// Empty snapshot that only carries over an active maintenance window
    pub fn reset_keeping_maintenance(&self) -> Self {
        if self.is_maintenance {
            Self {
                is_maintenance: true,
                maintenance_started_at: self.maintenance_started_at,
                ..Self::default()
            }
        } else {
            Self::default()
        }
    }

    pub fn has_server_data(&self) -> bool {
        !self.servers.is_empty()
    }

    pub fn server(&self, id: &ServerId) -> Option<&ServerRecord> {
        self.servers.get(id)
    }

    /// Username of the player with the given id, if tracked
    pub fn username_for_player_id(&self, player_id: &str) -> Option<&str> {
        self.players_by_username
            .iter()
            .find(|(_, entry)| entry.id == player_id)
            .map(|(username, _)| username.as_str())
    }
}

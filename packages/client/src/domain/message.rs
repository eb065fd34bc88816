//! Inbound status messages, after decoding from the wire.
//!
//! One variant per feed `type`. Types this client does not know about are
//! kept as [`StatusMessage::Unknown`] so a newer feed never breaks the session.

use std::collections::BTreeMap;

use super::snapshot::{MaintenanceStart, ServerId, ServerRecord};

/// Complete state push
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FullUpdate {
    pub servers: BTreeMap<ServerId, ServerRecord>,
    pub total_online_players: Option<u64>,
    pub running_time_seconds: Option<u64>,
    pub total_running_time_seconds: Option<u64>,
    /// `None` when the feed omitted the field
    pub is_maintenance: Option<bool>,
    pub maintenance_started_at: Option<MaintenanceStart>,
}

/// Explicit maintenance toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceUpdate {
    pub entering: bool,
    pub started_at: Option<MaintenanceStart>,
}

/// A player as referenced by join/leave/move messages
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerRef {
    pub id: Option<String>,
    pub username: Option<String>,
}

/// `players_update_add` / `players_update_remove`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerCountUpdate {
    /// Authoritative total, not an increment
    pub total_online_players: Option<u64>,
    pub player: Option<PlayerRef>,
}

/// A player moving to a server, carried by `server_update`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMove {
    pub id: Option<String>,
    pub username: String,
    pub new_server: Option<ServerId>,
}

/// Per-server count patch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerCountUpdate {
    pub counts: BTreeMap<ServerId, u64>,
    pub player: Option<PlayerMove>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Full(FullUpdate),
    Maintenance(MaintenanceUpdate),
    PlayerJoined(PlayerCountUpdate),
    PlayerLeft(PlayerCountUpdate),
    ServerCounts(ServerCountUpdate),
    Unknown { message_type: String },
}

impl StatusMessage {
    /// The wire `type` this message was decoded from
    pub fn kind(&self) -> &str {
        match self {
            StatusMessage::Full(_) => "full",
            StatusMessage::Maintenance(_) => "maintenance_status_update",
            StatusMessage::PlayerJoined(_) => "players_update_add",
            StatusMessage::PlayerLeft(_) => "players_update_remove",
            StatusMessage::ServerCounts(_) => "server_update",
            StatusMessage::Unknown { message_type } => message_type,
        }
    }

    /// Short description for debug logs
    pub fn summary(&self) -> String {
        match self {
            StatusMessage::Full(full) => format!(
                "servers: {}, players: {}, isMaintenance: {:?}",
                full.servers.len(),
                full.total_online_players
                    .map_or_else(|| "N/A".to_string(), |n| n.to_string()),
                full.is_maintenance
            ),
            StatusMessage::Maintenance(update) => format!("entering: {}", update.entering),
            StatusMessage::PlayerJoined(update) | StatusMessage::PlayerLeft(update) => format!(
                "total: {:?}, player: {:?}",
                update.total_online_players,
                update.player.as_ref().and_then(|p| p.id.as_deref())
            ),
            StatusMessage::ServerCounts(update) => format!(
                "updated_servers: {}",
                update
                    .counts
                    .keys()
                    .map(ServerId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            StatusMessage::Unknown { message_type } => format!("unknown type '{}'", message_type),
        }
    }
}

//! Conversion logic between wire frames and domain messages.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Value;

use crate::domain::{
    FullUpdate, MaintenanceStart, MaintenanceUpdate, MessageError, PlayerCountUpdate, PlayerMove,
    PlayerRef, ServerCountUpdate, ServerId, ServerRecord, StatusMessage,
};
use crate::infrastructure::dto::websocket::{
    FullFrame, LenientNumber, MaintenanceFrame, PlayerCountFrame, PlayerDto, ServerUpdateFrame,
    StatusFrame,
};

// ========================================
// Raw text → Domain message
// ========================================

impl FromStr for StatusMessage {
    type Err = MessageError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let message_type = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(MessageError::MissingType)?
            .to_string();

        match serde_json::from_value::<StatusFrame>(value)? {
            StatusFrame::Unknown => Ok(StatusMessage::Unknown { message_type }),
            frame => StatusMessage::try_from(frame),
        }
    }
}

// ========================================
// DTO → Domain message
// ========================================

impl TryFrom<StatusFrame> for StatusMessage {
    type Error = MessageError;

    fn try_from(frame: StatusFrame) -> Result<Self, Self::Error> {
        Ok(match frame {
            StatusFrame::Full(full) => StatusMessage::Full(full.try_into()?),
            StatusFrame::MaintenanceStatusUpdate(update) => {
                StatusMessage::Maintenance(update.into())
            }
            StatusFrame::PlayersUpdateAdd(update) => {
                StatusMessage::PlayerJoined(update.try_into()?)
            }
            StatusFrame::PlayersUpdateRemove(update) => {
                StatusMessage::PlayerLeft(update.try_into()?)
            }
            StatusFrame::ServerUpdate(update) => StatusMessage::ServerCounts(update.try_into()?),
            StatusFrame::Unknown => StatusMessage::Unknown {
                message_type: "unknown".to_string(),
            },
        })
    }
}

fn optional_u64(
    value: Option<&LenientNumber>,
    field: &'static str,
) -> Result<Option<u64>, MessageError> {
    value.map(|v| v.to_u64(field)).transpose()
}

/// `maintenanceStartTime`: null, absent or empty means "not given"
fn maintenance_start(value: Option<&Value>) -> Option<MaintenanceStart> {
    let value = match value? {
        Value::Null => return None,
        Value::String(text) if text.trim().is_empty() => return None,
        value => value,
    };
    let millis = serde_json::from_value::<LenientNumber>(value.clone())
        .ok()
        .and_then(|number| number.to_i64("maintenanceStartTime").ok());
    match millis {
        Some(millis) => Some(MaintenanceStart::Millis(millis)),
        None => {
            tracing::warn!("Unreadable maintenanceStartTime {}, showing it as invalid", value);
            Some(MaintenanceStart::Invalid)
        }
    }
}

/// `maintenance_status_update.status`
fn is_entering_maintenance(status: Option<&Value>) -> bool {
    match status {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) if text == "true" => true,
        Some(Value::String(text)) if text == "false" => false,
        other => {
            tracing::warn!("Unexpected maintenance status {:?}, treating it as false", other);
            false
        }
    }
}

impl TryFrom<FullFrame> for FullUpdate {
    type Error = MessageError;

    fn try_from(frame: FullFrame) -> Result<Self, Self::Error> {
        let mut servers = BTreeMap::new();
        for (id, status) in frame.servers.unwrap_or_default() {
            let online_count = optional_u64(status.online.as_ref(), "servers.online")?;
            servers.insert(
                ServerId::new(id),
                ServerRecord::new(online_count.unwrap_or(0), status.is_online),
            );
        }

        Ok(Self {
            servers,
            total_online_players: optional_u64(
                frame.players.as_ref().and_then(|p| p.online.as_ref()),
                "players.online",
            )?,
            running_time_seconds: optional_u64(frame.running_time.as_ref(), "runningTime")?,
            total_running_time_seconds: optional_u64(
                frame.total_running_time.as_ref(),
                "totalRunningTime",
            )?,
            is_maintenance: frame.is_maintenance.as_ref().and_then(serde_json::Value::as_bool),
            maintenance_started_at: maintenance_start(frame.maintenance_start_time.as_ref()),
        })
    }
}

impl From<MaintenanceFrame> for MaintenanceUpdate {
    fn from(frame: MaintenanceFrame) -> Self {
        Self {
            entering: is_entering_maintenance(frame.status.as_ref()),
            started_at: maintenance_start(frame.maintenance_start_time.as_ref()),
        }
    }
}

impl From<PlayerDto> for PlayerRef {
    fn from(dto: PlayerDto) -> Self {
        Self {
            id: dto.uuid,
            username: dto.username,
        }
    }
}

impl TryFrom<PlayerCountFrame> for PlayerCountUpdate {
    type Error = MessageError;

    fn try_from(frame: PlayerCountFrame) -> Result<Self, Self::Error> {
        Ok(Self {
            total_online_players: optional_u64(
                frame.total_online_players.as_ref(),
                "totalOnlinePlayers",
            )?,
            player: frame.player.map(PlayerRef::from),
        })
    }
}

impl TryFrom<ServerUpdateFrame> for ServerCountUpdate {
    type Error = MessageError;

    fn try_from(frame: ServerUpdateFrame) -> Result<Self, Self::Error> {
        let mut counts = BTreeMap::new();
        for (id, count) in frame.servers.unwrap_or_default() {
            counts.insert(ServerId::new(id), count.to_u64("servers")?);
        }

        // A move without a username cannot be tracked
        let player = frame.player.and_then(|dto| {
            dto.username.map(|username| PlayerMove {
                id: dto.uuid,
                username,
                new_server: dto.new_server.map(ServerId::new),
            })
        });

        Ok(Self { counts, player })
    }
}

//! WebSocket frame DTOs, as the status feed sends them.
//!
//! Numeric fields are deliberately loose: the feed sends counts and times
//! either as JSON numbers or as decimal strings.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::MessageError;

/// A JSON number or a decimal string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LenientNumber {
    Number(serde_json::Number),
    Text(String),
}

impl LenientNumber {
    fn as_f64(&self, field: &'static str) -> Result<f64, MessageError> {
        let value = match self {
            LenientNumber::Number(n) => n.as_f64(),
            LenientNumber::Text(text) => text.trim().parse::<f64>().ok(),
        };
        match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(MessageError::NotANumber {
                field,
                value: self.to_string(),
            }),
        }
    }

    /// Non-negative integer value; fractions are truncated and negatives clamp to 0
    pub fn to_u64(&self, field: &'static str) -> Result<u64, MessageError> {
        if let LenientNumber::Number(n) = self
            && let Some(v) = n.as_u64()
        {
            return Ok(v);
        }
        Ok(self.as_f64(field)?.max(0.0).trunc() as u64)
    }

    /// Signed integer value (e.g. epoch milliseconds); fractions are truncated
    pub fn to_i64(&self, field: &'static str) -> Result<i64, MessageError> {
        if let LenientNumber::Number(n) = self
            && let Some(v) = n.as_i64()
        {
            return Ok(v);
        }
        Ok(self.as_f64(field)?.trunc() as i64)
    }
}

impl std::fmt::Display for LenientNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LenientNumber::Number(n) => write!(f, "{}", n),
            LenientNumber::Text(text) => write!(f, "{:?}", text),
        }
    }
}

/// One entry of `full.servers`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatusDto {
    #[serde(default)]
    pub online: Option<LenientNumber>,
    #[serde(default)]
    pub is_online: bool,
}

/// `full.players`
#[derive(Debug, Clone, Deserialize)]
pub struct PlayersDto {
    #[serde(default)]
    pub online: Option<LenientNumber>,
}

/// Player reference carried by player and server updates
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub new_server: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullFrame {
    #[serde(default)]
    pub servers: Option<HashMap<String, ServerStatusDto>>,
    #[serde(default)]
    pub players: Option<PlayersDto>,
    #[serde(default)]
    pub running_time: Option<LenientNumber>,
    #[serde(default)]
    pub total_running_time: Option<LenientNumber>,
    /// Only a JSON bool counts; anything else is treated as absent
    #[serde(default)]
    pub is_maintenance: Option<serde_json::Value>,
    /// Kept raw: an unreadable start time must not cost the rest of the frame
    #[serde(default)]
    pub maintenance_start_time: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceFrame {
    /// `true` or `"true"` enters maintenance; any other value leaves it
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub maintenance_start_time: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCountFrame {
    #[serde(default)]
    pub total_online_players: Option<LenientNumber>,
    #[serde(default)]
    pub player: Option<PlayerDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerUpdateFrame {
    #[serde(default)]
    pub servers: Option<HashMap<String, LenientNumber>>,
    #[serde(default)]
    pub player: Option<PlayerDto>,
}

/// Every frame the feed sends, discriminated by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StatusFrame {
    #[serde(rename = "full")]
    Full(FullFrame),
    #[serde(rename = "maintenance_status_update")]
    MaintenanceStatusUpdate(MaintenanceFrame),
    #[serde(rename = "players_update_add")]
    PlayersUpdateAdd(PlayerCountFrame),
    #[serde(rename = "players_update_remove")]
    PlayersUpdateRemove(PlayerCountFrame),
    #[serde(rename = "server_update")]
    ServerUpdate(ServerUpdateFrame),
    #[serde(other)]
    Unknown,
}

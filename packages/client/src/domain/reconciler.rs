//! The single authority that mutates the [`Snapshot`].
//!
//! Every message is applied as a whole: the new values are computed first and
//! then written, so observers never see half of a message.

use super::message::{
    FullUpdate, MaintenanceUpdate, PlayerCountUpdate, ServerCountUpdate, StatusMessage,
};
use super::snapshot::{CurrentServer, PlayerEntry, ServerRecord, Snapshot};

/// Result of applying one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The snapshot may have changed; refresh the surface and restart the ticker
    Updated,
    /// Nothing to do (unknown message type)
    Ignored,
}

#[derive(Debug, Default)]
pub struct StateReconciler {
    snapshot: Snapshot,
    /// Latched by an explicit maintenance message; `full` cannot clear it
    forced_maintenance: bool,
    /// Set while reconnecting; the next `full` drops the tracked players
    players_stale: bool,
}

impl StateReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn is_maintenance_forced(&self) -> bool {
        self.forced_maintenance
    }

    pub fn apply(&mut self, message: &StatusMessage) -> Applied {
        match message {
            StatusMessage::Full(full) => self.apply_full(full),
            StatusMessage::Maintenance(update) => self.apply_maintenance(update),
            StatusMessage::PlayerJoined(update) => self.apply_player_joined(update),
            StatusMessage::PlayerLeft(update) => self.apply_player_left(update),
            StatusMessage::ServerCounts(update) => self.apply_server_counts(update),
            StatusMessage::Unknown { message_type } => {
                tracing::warn!("Ignoring message of unknown type '{}'", message_type);
                return Applied::Ignored;
            }
        }
        Applied::Updated
    }

    /// Forget everything except an active maintenance window.
    ///
    /// Called once the connection is confirmed lost, not on transient reconnects.
    pub fn reset_after_disconnect(&mut self) {
        self.snapshot = self.snapshot.reset_keeping_maintenance();
        self.players_stale = false;
    }

    /// Mark the tracked players as stale after a transient connection loss.
    ///
    /// Joins and leaves sent while reconnecting are missed, so the first
    /// `full` of the new session starts the player list over.
    pub fn note_connection_lost(&mut self) {
        self.players_stale = true;
    }

    fn apply_full(&mut self, full: &FullUpdate) {
        let (is_maintenance, started_at) = if self.forced_maintenance {
            (true, self.snapshot.maintenance_started_at)
        } else {
            match full.is_maintenance {
                Some(flag) => (flag, full.maintenance_started_at),
                // An omitted flag never ends a maintenance window we already know about
                None if self.snapshot.is_maintenance => {
                    (true, self.snapshot.maintenance_started_at)
                }
                None => (false, None),
            }
        };

        self.snapshot.servers = full.servers.clone();
        self.snapshot.total_online_players = full.total_online_players.unwrap_or(0);
        self.snapshot.running_time_seconds = full.running_time_seconds;
        self.snapshot.total_running_time_seconds = full.total_running_time_seconds;
        self.snapshot.is_maintenance = is_maintenance;
        self.snapshot.maintenance_started_at = started_at;
        if self.players_stale {
            self.snapshot.players_by_username.clear();
            self.players_stale = false;
        }
    }

    fn apply_maintenance(&mut self, update: &MaintenanceUpdate) {
        self.forced_maintenance = update.entering;
        self.snapshot.is_maintenance = update.entering;
        self.snapshot.maintenance_started_at = update.started_at;
    }

    fn overwrite_total(&mut self, update: &PlayerCountUpdate) {
        if self.snapshot.is_maintenance {
            return;
        }
        if let Some(total) = update.total_online_players {
            self.snapshot.total_online_players = total;
        }
    }

    fn apply_player_joined(&mut self, update: &PlayerCountUpdate) {
        self.overwrite_total(update);

        let Some(player) = &update.player else {
            return;
        };
        if let (Some(id), Some(username)) = (&player.id, &player.username) {
            self.snapshot.players_by_username.insert(
                username.clone(),
                PlayerEntry {
                    id: id.clone(),
                    current_server: CurrentServer::Unknown,
                },
            );
        }
    }

    fn apply_player_left(&mut self, update: &PlayerCountUpdate) {
        self.overwrite_total(update);

        let Some(player_id) = update.player.as_ref().and_then(|p| p.id.as_deref()) else {
            return;
        };
        let Some(username) = self
            .snapshot
            .username_for_player_id(player_id)
            .map(str::to_string)
        else {
            tracing::warn!("Player to remove not found in local cache: {}", player_id);
            return;
        };

        if let Some(entry) = self.snapshot.players_by_username.remove(&username)
            && let Some(server) = entry.current_server.server()
            && let Some(record) = self.snapshot.servers.get_mut(server)
        {
            record.online_count = record.online_count.saturating_sub(1);
        }
    }

    fn apply_server_counts(&mut self, update: &ServerCountUpdate) {
        if let Some(player) = &update.player {
            let current_server = match &player.new_server {
                Some(server) => CurrentServer::Known(server.clone()),
                None => CurrentServer::Unknown,
            };
            // Keep the id we already know if the move did not carry one
            let id = player.id.clone().or_else(|| {
                self.snapshot
                    .players_by_username
                    .get(&player.username)
                    .map(|entry| entry.id.clone())
            });
            if let Some(id) = id {
                self.snapshot.players_by_username.insert(
                    player.username.clone(),
                    PlayerEntry { id, current_server },
                );
            }
        }

        for (server, &count) in &update.counts {
            self.snapshot
                .servers
                .entry(server.clone())
                .and_modify(|record| record.online_count = count)
                // Only a reporting server shows up here, so it starts online
                .or_insert_with(|| ServerRecord::new(count, true));
        }
    }
}

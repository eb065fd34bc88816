//! Monitor configuration: endpoint, retry policy and display groups.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

use crate::domain::{GroupDefinition, GroupError, ReconnectPolicy, ServerGroup, default_groups};

pub const DEFAULT_ENDPOINT_URL: &str = "ws://127.0.0.1:10203";
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;
pub const DEFAULT_RECONNECT_DELAYS_MS: [u64; 3] = [10_000, 30_000, 60_000];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("endpoint url must use the ws or wss scheme (got '{0}')")]
    UnsupportedScheme(String),

    #[error("connect timeout must be greater than zero")]
    ZeroConnectTimeout,

    #[error("no display groups configured")]
    NoGroups,

    #[error("duplicate group key '{0}'")]
    DuplicateGroupKey(String),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error("failed to read groups file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse groups file '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
    pub endpoint_url: String,
    pub connect_timeout_ms: u64,
    pub max_reconnect_attempts: u32,
    /// The last entry repeats once exhausted; empty means a single 5000 ms delay
    pub reconnect_delays_ms: Vec<u64>,
    pub groups: Vec<ServerGroup>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_delays_ms: DEFAULT_RECONNECT_DELAYS_MS.to_vec(),
            groups: default_groups(),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let request = self
            .endpoint_url
            .as_str()
            .into_client_request()
            .map_err(|e| ConfigError::InvalidUrl {
                url: self.endpoint_url.clone(),
                reason: e.to_string(),
            })?;
        match request.uri().scheme_str() {
            Some("ws") | Some("wss") => {}
            other => return Err(ConfigError::UnsupportedScheme(other.unwrap_or("").to_string())),
        }

        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ZeroConnectTimeout);
        }

        if self.groups.is_empty() {
            return Err(ConfigError::NoGroups);
        }
        let mut seen = HashSet::new();
        for group in &self.groups {
            if !seen.insert(group.key()) {
                return Err(ConfigError::DuplicateGroupKey(group.key().to_string()));
            }
        }
        Ok(())
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            max_attempts: self.max_reconnect_attempts,
            delays: self
                .reconnect_delays_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }
}

/// Read a JSON array of group definitions.
pub fn load_groups(path: &Path) -> Result<Vec<ServerGroup>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_groups(&raw).map_err(|e| match e {
        ParseGroupsError::Json(source) => ConfigError::Json {
            path: path.to_path_buf(),
            source,
        },
        ParseGroupsError::Group(e) => ConfigError::Group(e),
    })
}

enum ParseGroupsError {
    Json(serde_json::Error),
    Group(GroupError),
}

fn parse_groups(raw: &str) -> Result<Vec<ServerGroup>, ParseGroupsError> {
    let definitions: Vec<GroupDefinition> =
        serde_json::from_str(raw).map_err(ParseGroupsError::Json)?;
    definitions
        .into_iter()
        .map(|definition| ServerGroup::try_from(definition).map_err(ParseGroupsError::Group))
        .collect()
}

//! Error types returned to the binary.

use thiserror::Error;

use crate::config::ConfigError;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration rejected before connecting
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The status feed could not be reached again
    #[error("Gave up after {attempts} reconnect attempts")]
    RetriesExhausted { attempts: u32 },
}

//! Realtime status client for the Lantern game service.
//!
//! Keeps a local view of the service's status feed (servers, player counts,
//! maintenance, uptime) over an intermittent WebSocket connection and derives
//! what a status surface should show from it.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;

// wiring
pub mod config;
pub mod error;
pub mod monitor;
pub mod runner;
pub mod session;

pub use config::{ConfigError, MonitorConfig};
pub use error::ClientError;
pub use monitor::{Directive, StatusMonitor};
pub use runner::{DisplayOptions, run_client, run_client_with};
pub use session::run_monitor_session;

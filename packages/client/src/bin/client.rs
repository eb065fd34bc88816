//! Realtime status client.
//!
//! Connects to the status feed over WebSocket and prints server status,
//! player counts and uptime whenever they change.
//! Automatically reconnects on disconnection (3 retries after 10s, 30s and 60s by default).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin lantern-client
//! cargo run --bin lantern-client -- -u ws://status.example.com:10203 --players
//! ```

use std::path::PathBuf;

use clap::Parser;

use lantern_client::{
    DisplayOptions, MonitorConfig,
    config::{
        DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_ENDPOINT_URL, DEFAULT_MAX_RECONNECT_ATTEMPTS,
        load_groups,
    },
};
use lantern_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "lantern-client")]
#[command(about = "Realtime server status client for the Lantern status feed", long_about = None)]
struct Args {
    /// WebSocket status feed URL
    #[arg(short = 'u', long, default_value = DEFAULT_ENDPOINT_URL)]
    url: String,

    /// Give up a connection attempt after this many milliseconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_MS)]
    connect_timeout_ms: u64,

    /// Retries after the connection is lost
    #[arg(long, default_value_t = DEFAULT_MAX_RECONNECT_ATTEMPTS)]
    max_reconnect_attempts: u32,

    /// Delays between retries, comma separated (the last one repeats)
    #[arg(long, value_delimiter = ',', default_value = "10000,30000,60000")]
    reconnect_delays_ms: Vec<u64>,

    /// JSON file with display group definitions
    #[arg(long)]
    groups: Option<PathBuf>,

    /// Also print who is online on each group
    #[arg(long)]
    players: bool,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let mut config = MonitorConfig {
        endpoint_url: args.url,
        connect_timeout_ms: args.connect_timeout_ms,
        max_reconnect_attempts: args.max_reconnect_attempts,
        reconnect_delays_ms: args.reconnect_delays_ms,
        ..MonitorConfig::default()
    };
    if let Some(path) = args.groups {
        match load_groups(&path) {
            Ok(groups) => config.groups = groups,
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(2);
            }
        }
    }

    let display = DisplayOptions {
        show_players: args.players,
    };

    tokio::select! {
        result = lantern_client::run_client(config, display) => {
            if let Err(e) = result {
                tracing::error!("Client error: {}", e);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
        }
    }
}

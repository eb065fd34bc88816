//! Client execution logic.

use std::io::IsTerminal;
use std::sync::Arc;

use lantern_shared::time::{Clock, SystemClock};

use crate::{
    config::MonitorConfig,
    domain::{FeedConnector, RenderSink},
    error::ClientError,
    infrastructure::transport::WebSocketFeedConnector,
    monitor::StatusMonitor,
    session::run_monitor_session,
    ui::TerminalSink,
};

/// Options for the terminal surface
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    pub show_players: bool,
}

/// Watch the configured feed and print status changes to stdout.
///
/// Returns only once reconnecting has been given up.
pub async fn run_client(config: MonitorConfig, display: DisplayOptions) -> Result<(), ClientError> {
    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    let sink = TerminalSink::new(stdout, &config.groups, color).with_players(display.show_players);

    run_client_with(config, sink, &WebSocketFeedConnector::new(), Arc::new(SystemClock)).await
}

/// Same as [`run_client`] with the surface, transport and clock injected.
pub async fn run_client_with<S, C>(
    config: MonitorConfig,
    sink: S,
    connector: &C,
    clock: Arc<dyn Clock>,
) -> Result<(), ClientError>
where
    S: RenderSink,
    C: FeedConnector + ?Sized,
{
    config.validate()?;

    tracing::info!(
        "Watching status feed at {} ({} groups, up to {} retries)",
        config.endpoint_url,
        config.groups.len(),
        config.max_reconnect_attempts
    );

    let policy = config.reconnect_policy();
    let mut monitor = StatusMonitor::new(config.groups, policy, sink, clock);
    let attempts = run_monitor_session(&mut monitor, connector, &config.endpoint_url).await;

    Err(ClientError::RetriesExhausted { attempts })
}

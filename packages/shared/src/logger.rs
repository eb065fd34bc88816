//! Logging setup utilities for the Lantern binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Library crates whose log output follows the binary's default level.
const LIBRARY_TARGETS: &[&str] = &["lantern_client", "lantern_shared"];

/// Build the default filter directive for the given binary and level.
///
/// The result looks like `lantern_client=info,lantern_shared=info,my_bin=info`.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let mut targets: Vec<&str> = LIBRARY_TARGETS.to_vec();
    if !targets.contains(&binary_target.as_str()) {
        targets.push(&binary_target);
    }

    targets
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "lantern-client")
/// * `default_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use lantern_shared::logger::setup_logger;
///
/// setup_logger("lantern-client", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let directive = default_directive(binary_name, default_log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| directive.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::debug!("Logger initialized (default filter: {})", directive);
}

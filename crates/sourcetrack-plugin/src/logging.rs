//! Logging setup for the plugin module.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::TrackerConfig;

const FALLBACK_FILTER: &str = "info";

/// Build the filter from `config.log_filter`, then `RUST_LOG`, then `info`.
///
/// Returns the parse error of an invalid `log_filter` alongside the fallback.
fn build_filter(config: &TrackerConfig) -> (EnvFilter, Option<String>) {
    match &config.log_filter {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new(FALLBACK_FILTER), Some(e.to_string())),
        },
        None => (
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER)),
            None,
        ),
    }
}

/// Install a global `fmt` subscriber.
///
/// Leaves an already installed subscriber in place (the host or another
/// plugin may own it). Returns `true` if ours was installed.
pub fn init_logging(config: &TrackerConfig) -> bool {
    let (filter, invalid) = build_filter(config);

    let installed = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .try_init()
        .is_ok();

    if let Some(e) = invalid {
        tracing::warn!("invalid SOURCETRACK_LOG directives, using '{FALLBACK_FILTER}': {e}");
    }
    installed
}

//! Tracker configuration.

/// Configuration for the source tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Scan all existing host sources at construction (default: true).
    pub initial_scan: bool,
    /// `tracing` filter directives used by `init_logging` (default: none,
    /// which falls back to `RUST_LOG`, then `info`).
    pub log_filter: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            initial_scan: true,
            log_filter: None,
        }
    }
}

impl TrackerConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Self {
        Self {
            initial_scan: std::env::var("SOURCETRACK_INITIAL_SCAN")
                .map(|v| !(v.eq_ignore_ascii_case("false") || v == "0"))
                .unwrap_or(true),
            log_filter: std::env::var("SOURCETRACK_LOG")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_tracker_config_default() {
        let config = TrackerConfig::default();
        assert!(config.initial_scan);
        assert!(config.log_filter.is_none());
    }

    #[test]
    #[serial(env)]
    fn test_tracker_config_from_env() {
        std::env::set_var("SOURCETRACK_INITIAL_SCAN", "false");
        std::env::set_var("SOURCETRACK_LOG", "sourcetrack_plugin=debug");

        let config = TrackerConfig::from_env();
        assert!(!config.initial_scan);
        assert_eq!(
            config.log_filter.as_deref(),
            Some("sourcetrack_plugin=debug")
        );

        std::env::set_var("SOURCETRACK_INITIAL_SCAN", "0");
        assert!(!TrackerConfig::from_env().initial_scan);

        std::env::set_var("SOURCETRACK_INITIAL_SCAN", "yes");
        std::env::set_var("SOURCETRACK_LOG", "  ");
        let config = TrackerConfig::from_env();
        assert!(config.initial_scan);
        assert!(config.log_filter.is_none());

        // Clean up
        std::env::remove_var("SOURCETRACK_INITIAL_SCAN");
        std::env::remove_var("SOURCETRACK_LOG");

        // Unset matches the defaults
        assert_eq!(TrackerConfig::from_env(), TrackerConfig::default());
    }
}

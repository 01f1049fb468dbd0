//! Host error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("source not owned by this host: {0}")]
    UnknownSource(String),

    #[error("source name already in use: {0}")]
    NameInUse(String),

    #[error("source name must not be empty")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Display messages ──────────────────────────────────────────────

    #[test]
    fn test_display_unknown_source() {
        let err = HostError::UnknownSource("camera".into());
        assert_eq!(err.to_string(), "source not owned by this host: camera");
    }

    #[test]
    fn test_display_name_in_use() {
        let err = HostError::NameInUse("mic".into());
        assert_eq!(err.to_string(), "source name already in use: mic");
    }

    #[test]
    fn test_display_empty_name() {
        assert_eq!(
            HostError::EmptyName.to_string(),
            "source name must not be empty"
        );
    }

    // ── Error trait source chain ──────────────────────────────────────

    #[test]
    fn test_error_source_string_variants() {
        use std::error::Error;
        let err = HostError::NameInUse("mic".into());
        assert!(err.source().is_none());
    }
}

//! Source tracker error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("source not tracked: {0}")]
    Untracked(String),

    #[error("new and old name are identical: {0}")]
    IdenticalNames(String),

    #[error("missing '{0}' parameter")]
    MissingParameter(&'static str),

    #[error("unknown signal: {0}")]
    UnknownSignal(String),

    #[error("invalid sink settings: {0}")]
    Settings(#[from] serde_json::Error),
}

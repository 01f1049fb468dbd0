//! Source lifecycle events: decoding host signal payloads.

use std::fmt;

use sourcetrack_host::{source::source_addr, Calldata, SourceRef};
use sourcetrack_host::{SOURCE_CREATE, SOURCE_DESTROY, SOURCE_RENAME};

use crate::error::TrackerError;

/// Host signals the tracker subscribes to.
pub const KNOWN_SIGNALS: &[&str] = &[SOURCE_CREATE, SOURCE_DESTROY, SOURCE_RENAME];

/// A decoded lifecycle notification.
pub enum SourceEvent {
    Created(SourceRef),
    Destroyed(SourceRef),
    Renamed {
        source: SourceRef,
        prev_name: String,
        new_name: String,
    },
}

impl SourceEvent {
    /// Decode the payload of `signal`.
    ///
    /// Every event needs `source`; renames also need `prev_name` and
    /// `new_name`. A missing field makes the whole event malformed.
    pub fn from_calldata(signal: &str, data: &Calldata) -> Result<Self, TrackerError> {
        let source = data
            .get_source("source")
            .cloned()
            .ok_or(TrackerError::MissingParameter("source"))?;

        match signal {
            SOURCE_CREATE => Ok(Self::Created(source)),
            SOURCE_DESTROY => Ok(Self::Destroyed(source)),
            SOURCE_RENAME => {
                let prev_name = data
                    .get_string("prev_name")
                    .ok_or(TrackerError::MissingParameter("prev_name"))?;
                let new_name = data
                    .get_string("new_name")
                    .ok_or(TrackerError::MissingParameter("new_name"))?;
                Ok(Self::Renamed {
                    source,
                    prev_name: prev_name.to_string(),
                    new_name: new_name.to_string(),
                })
            }
            other => Err(TrackerError::UnknownSignal(other.to_string())),
        }
    }

    /// Check if this signal name is one the tracker handles.
    pub fn is_known_signal(name: &str) -> bool {
        KNOWN_SIGNALS.contains(&name)
    }

    /// The signal this event was decoded from.
    pub fn signal(&self) -> &'static str {
        match self {
            Self::Created(_) => SOURCE_CREATE,
            Self::Destroyed(_) => SOURCE_DESTROY,
            Self::Renamed { .. } => SOURCE_RENAME,
        }
    }

    pub fn source(&self) -> &SourceRef {
        match self {
            Self::Created(source) | Self::Destroyed(source) => source,
            Self::Renamed { source, .. } => source,
        }
    }
}

impl fmt::Debug for SourceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SourceEvent");
        s.field("signal", &self.signal())
            .field("source", &source_addr(self.source()));
        if let Self::Renamed {
            prev_name,
            new_name,
            ..
        } = self
        {
            s.field("prev_name", prev_name).field("new_name", new_name);
        }
        s.finish()
    }
}

//! Host signal bus: named lifecycle notifications with dictionary payloads.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::source::SourceRef;

/// Emitted after a source is created.
pub const SOURCE_CREATE: &str = "source_create";
/// Emitted while a source is being destroyed; the handle is still valid.
pub const SOURCE_DESTROY: &str = "source_destroy";
/// Emitted after a source changed its name.
pub const SOURCE_RENAME: &str = "source_rename";

// ─── Payload ────────────────────────────────────────────────────────────

/// A single named parameter in a signal payload.
#[derive(Clone)]
pub enum CallValue {
    Source(SourceRef),
    String(String),
}

impl fmt::Debug for CallValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(source) => f
                .debug_tuple("Source")
                .field(&crate::source::source_addr(source))
                .finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
        }
    }
}

/// Best-effort dictionary of named parameters delivered with each signal.
///
/// Getters return `None` when the key is absent or holds another type.
#[derive(Debug, Clone, Default)]
pub struct Calldata {
    params: HashMap<String, CallValue>,
}

impl Calldata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: CallValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: CallValue) {
        self.params.insert(key.into(), value);
    }

    pub fn get_source(&self, key: &str) -> Option<&SourceRef> {
        match self.params.get(key)? {
            CallValue::Source(source) => Some(source),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.params.get(key)? {
            CallValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

// ─── Bus ────────────────────────────────────────────────────────────────

/// Identifies one connected handler, for later disconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub u64);

/// Callback invoked for every emission of a connected signal.
///
/// May be called from any host thread.
pub type SignalHandler = Arc<dyn Fn(&Calldata) + Send + Sync>;

/// The host's global notification bus.
pub trait SignalBus: Send + Sync {
    /// Subscribe `handler` to `signal`.
    fn connect(&self, signal: &str, handler: SignalHandler) -> HandlerId;

    /// Unsubscribe a handler. Returns `false` if it was not connected.
    fn disconnect(&self, signal: &str, id: HandlerId) -> bool;
}

// ─── Tests ──────────────────────────────────────────────────────────────

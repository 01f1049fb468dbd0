//! Host source objects: the named entities the host owns.
//!
//! The host hands out strong `SourceRef` handles; plugin code that wants to
//! remember a source without keeping it alive holds a `WeakSource` instead.

use std::fmt;
use std::sync::{Arc, Weak};

// ─── Kind & capabilities ────────────────────────────────────────────────

/// Category of a host source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A regular input (capture device, media file, image, ...).
    Input,
    /// A filter attached to another source.
    Filter,
    /// A transition between scenes.
    Transition,
    /// A scene composed of other sources.
    Scene,
}

impl SourceKind {
    /// Lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Filter => "filter",
            Self::Transition => "transition",
            Self::Scene => "scene",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags::bitflags! {
    /// Output capabilities advertised by a source.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OutputFlags: u32 {
        /// Produces video.
        const VIDEO = 1 << 0;
        /// Produces audio.
        const AUDIO = 1 << 1;
        /// Pushes frames asynchronously instead of rendering on demand.
        const ASYNC = 1 << 2;
    }
}

// ─── Source trait ───────────────────────────────────────────────────────

/// Introspection surface of a host-owned source.
///
/// Implementations must be cheap to call from any thread.
pub trait Source: Send + Sync {
    /// Current name. `None` for private/unnamed sources.
    fn name(&self) -> Option<String>;

    /// Category of the source.
    fn kind(&self) -> SourceKind;

    /// Capability bitmask.
    fn output_flags(&self) -> OutputFlags;
}

/// Live handle to a host source.
pub type SourceRef = Arc<dyn Source>;

/// Non-owning reference to a host source.
///
/// Never extends the source's lifetime. Resolve with [`WeakSource::upgrade`],
/// which fails once the host has released the source.
#[derive(Clone)]
pub struct WeakSource(Weak<dyn Source>);

impl WeakSource {
    /// Downgrade a live handle.
    pub fn new(source: &SourceRef) -> Self {
        Self(Arc::downgrade(source))
    }

    /// Resolve to a live handle, or `None` if the source is gone.
    pub fn upgrade(&self) -> Option<SourceRef> {
        self.0.upgrade()
    }

    /// Whether the referenced source has been destroyed.
    pub fn is_expired(&self) -> bool {
        self.0.strong_count() == 0
    }

    /// Whether this reference points at the given source.
    ///
    /// Compares identity only; works even after the source expired.
    pub fn refers_to(&self, source: &SourceRef) -> bool {
        std::ptr::addr_eq(self.0.as_ptr(), Arc::as_ptr(source))
    }
}

impl From<&SourceRef> for WeakSource {
    fn from(source: &SourceRef) -> Self {
        Self::new(source)
    }
}

impl PartialEq<SourceRef> for WeakSource {
    fn eq(&self, other: &SourceRef) -> bool {
        self.refers_to(other)
    }
}

impl PartialEq for WeakSource {
    fn eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl fmt::Debug for WeakSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakSource")
            .field(&self.0.as_ptr().cast::<()>())
            .finish()
    }
}

/// Address of a source, for log fields.
pub fn source_addr(source: &SourceRef) -> *const () {
    Arc::as_ptr(source).cast::<()>()
}

// ─── Tests ──────────────────────────────────────────────────────────────

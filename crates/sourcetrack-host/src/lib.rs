//! Host boundary for sourcetrack plugins.
//!
//! Describes what a plugin may rely on from its media host: sources with a
//! name, category and capability flags, weak references to them, a global
//! signal bus with dictionary payloads, and a way to list every source.
//! `MemoryHost` implements all of it in-process.

pub mod error;
pub mod host;
pub mod memory;
pub mod signal;
pub mod source;

pub use error::HostError;
pub use host::Host;
pub use memory::{LocalSignalBus, MemoryHost, MemorySource};
pub use signal::{
    CallValue, Calldata, HandlerId, SignalBus, SignalHandler, SOURCE_CREATE, SOURCE_DESTROY,
    SOURCE_RENAME,
};
pub use source::{OutputFlags, Source, SourceKind, SourceRef, WeakSource};

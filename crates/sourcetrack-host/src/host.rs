//! The host application as seen from plugin code.

use std::sync::Arc;

use crate::signal::SignalBus;
use crate::source::SourceRef;

/// Entry points a plugin may call on its host.
pub trait Host: Send + Sync {
    /// The global signal bus, if the host has one up yet.
    fn signal_bus(&self) -> Option<Arc<dyn SignalBus>>;

    /// Visit every source that currently exists, including unnamed ones.
    ///
    /// Return `false` from `visitor` to stop early.
    fn for_each_source(&self, visitor: &mut dyn FnMut(&SourceRef) -> bool);
}

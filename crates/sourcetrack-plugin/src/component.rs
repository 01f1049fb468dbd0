//! Plugin component that keeps the tracker alive while the module is loaded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sourcetrack_host::Host;

use crate::config::TrackerConfig;
use crate::logging::init_logging;
use crate::tracker::SourceTracker;

/// Component name reported in logs.
pub const COMPONENT_NAME: &str = "core::source_tracker";

/// The module-wide component, driven by [`module_load`] / [`module_unload`].
pub static COMPONENT: TrackerComponent = TrackerComponent::new();

/// Holds one reference to the process-wide tracker between load and unload.
#[derive(Default)]
pub struct TrackerComponent {
    instance: Mutex<Option<Arc<SourceTracker>>>,
}

impl TrackerComponent {
    pub const fn new() -> Self {
        Self {
            instance: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<SourceTracker>>> {
        self.instance.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire the tracker. Loading again returns the held instance.
    pub fn load(&self, host: &dyn Host) -> Arc<SourceTracker> {
        let mut slot = self.slot();
        if let Some(tracker) = slot.as_ref() {
            return tracker.clone();
        }

        let tracker = SourceTracker::instance(host);
        *slot = Some(tracker.clone());
        tracing::info!(component = COMPONENT_NAME, "component loaded");
        tracker
    }

    /// Release the held tracker. Returns `false` if nothing was loaded.
    pub fn unload(&self) -> bool {
        let released = self.slot().take();
        match released {
            Some(tracker) => {
                drop(tracker);
                tracing::info!(component = COMPONENT_NAME, "component unloaded");
                true
            }
            None => false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot().is_some()
    }

    /// The held tracker, if loaded.
    pub fn tracker(&self) -> Option<Arc<SourceTracker>> {
        self.slot().clone()
    }
}

/// Module entry point: set up logging and load the tracker component.
pub fn module_load(host: &dyn Host) -> Arc<SourceTracker> {
    init_logging(&TrackerConfig::from_env());
    COMPONENT.load(host)
}

/// Module exit point.
pub fn module_unload() {
    COMPONENT.unload();
}

// Shared test utilities for integration tests
#![allow(dead_code)]

use std::ops::ControlFlow;
use std::sync::Arc;

use sourcetrack_host::{Host, MemoryHost, OutputFlags, SignalBus, Source, SourceKind, SourceRef};
use sourcetrack_plugin::{SourceFilter, SourceTracker};

/// Host with a live signal bus and the given `(name, kind, flags)` sources.
///
/// The host holds the only strong references.
pub fn host_with(sources: &[(&str, SourceKind, OutputFlags)]) -> Arc<MemoryHost> {
    let host = MemoryHost::new();
    for &(name, kind, flags) in sources {
        host.create_source(name, kind, flags);
    }
    host
}

/// The A/B/C fixture: video input, audio input, scene.
pub fn mixed_host() -> Arc<MemoryHost> {
    host_with(&[
        ("A", SourceKind::Input, OutputFlags::VIDEO),
        ("B", SourceKind::Input, OutputFlags::AUDIO),
        ("C", SourceKind::Scene, OutputFlags::VIDEO),
    ])
}

/// Sorted names the tracker yields through `filter`.
pub fn visible(tracker: &SourceTracker, filter: Option<&SourceFilter>) -> Vec<String> {
    let mut names = Vec::new();
    tracker.enumerate(filter, |name, _| {
        names.push(name.to_string());
        ControlFlow::Continue(())
    });
    names.sort();
    names
}

/// A source whose name lookup panics.
pub struct FaultySource;

impl Source for FaultySource {
    fn name(&self) -> Option<String> {
        panic!("name lookup faulted");
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Input
    }

    fn output_flags(&self) -> OutputFlags {
        OutputFlags::VIDEO
    }
}

/// Wraps a `MemoryHost` and misbehaves while its sources are listed.
pub struct FaultyHost {
    pub inner: Arc<MemoryHost>,
    faulty_first: bool,
    fail_after: Option<usize>,
}

impl FaultyHost {
    /// Lists a [`FaultySource`] before the inner host's sources.
    pub fn faulty_first(inner: Arc<MemoryHost>) -> Self {
        Self {
            inner,
            faulty_first: true,
            fail_after: None,
        }
    }

    /// Panics out of enumeration after `count` sources were listed.
    pub fn failing_after(inner: Arc<MemoryHost>, count: usize) -> Self {
        Self {
            inner,
            faulty_first: false,
            fail_after: Some(count),
        }
    }
}

impl Host for FaultyHost {
    fn signal_bus(&self) -> Option<Arc<dyn SignalBus>> {
        self.inner.signal_bus()
    }

    fn for_each_source(&self, visitor: &mut dyn FnMut(&SourceRef) -> bool) {
        if self.faulty_first {
            let faulty: SourceRef = Arc::new(FaultySource);
            if !visitor(&faulty) {
                return;
            }
        }

        let mut listed = 0;
        self.inner.for_each_source(&mut |source| {
            if self.fail_after == Some(listed) {
                panic!("host enumeration failed");
            }
            listed += 1;
            visitor(source)
        });
    }
}

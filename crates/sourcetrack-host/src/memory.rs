//! In-process host: owns sources and a local signal bus.
//!
//! Stands in for a real host in tests and in embedders that drive the
//! plugin without one. Behaves like the real thing where plugin code can
//! observe it: signals fire after creation and rename, and during
//! destruction while the handle is still valid. Handlers always run with no
//! internal lock held, so they may call back into the host.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::error::HostError;
use crate::host::Host;
use crate::signal::{
    CallValue, Calldata, HandlerId, SignalBus, SignalHandler, SOURCE_CREATE, SOURCE_DESTROY,
    SOURCE_RENAME,
};
use crate::source::{OutputFlags, Source, SourceKind, SourceRef};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Local signal bus ───────────────────────────────────────────────────

/// Thread-safe signal bus with per-signal handler lists.
#[derive(Default)]
pub struct LocalSignalBus {
    handlers: Mutex<HashMap<String, Vec<(HandlerId, SignalHandler)>>>,
    next_id: AtomicU64,
}

impl LocalSignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `data` to every handler connected to `signal`.
    ///
    /// Returns the number of handlers invoked.
    pub fn emit(&self, signal: &str, data: &Calldata) -> usize {
        let handlers: Vec<SignalHandler> = lock(&self.handlers)
            .get(signal)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(data);
        }
        handlers.len()
    }

    /// Number of handlers currently connected to `signal`.
    pub fn handler_count(&self, signal: &str) -> usize {
        lock(&self.handlers).get(signal).map_or(0, Vec::len)
    }
}

impl SignalBus for LocalSignalBus {
    fn connect(&self, signal: &str, handler: SignalHandler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.handlers)
            .entry(signal.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    fn disconnect(&self, signal: &str, id: HandlerId) -> bool {
        let mut handlers = lock(&self.handlers);
        let Some(list) = handlers.get_mut(signal) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        before != list.len()
    }
}

// ─── Sources ────────────────────────────────────────────────────────────

/// A source owned by [`MemoryHost`].
pub struct MemorySource {
    name: RwLock<Option<String>>,
    kind: SourceKind,
    flags: OutputFlags,
}

impl MemorySource {
    fn new(name: Option<String>, kind: SourceKind, flags: OutputFlags) -> Self {
        Self {
            name: RwLock::new(name),
            kind,
            flags,
        }
    }

    fn set_name(&self, name: &str) {
        *self.name.write().unwrap_or_else(PoisonError::into_inner) = Some(name.to_string());
    }
}

impl Source for MemorySource {
    fn name(&self) -> Option<String> {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn output_flags(&self) -> OutputFlags {
        self.flags
    }
}

// ─── Host ───────────────────────────────────────────────────────────────

/// A host that keeps its sources in memory.
pub struct MemoryHost {
    sources: Mutex<Vec<Arc<MemorySource>>>,
    bus: Option<Arc<LocalSignalBus>>,
}

impl MemoryHost {
    /// Host with a signal bus.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sources: Mutex::new(Vec::new()),
            bus: Some(Arc::new(LocalSignalBus::new())),
        })
    }

    /// Host whose signal bus is not available.
    pub fn without_bus() -> Arc<Self> {
        Arc::new(Self {
            sources: Mutex::new(Vec::new()),
            bus: None,
        })
    }

    /// The concrete bus, for inspection and manual emission.
    pub fn bus(&self) -> Option<&Arc<LocalSignalBus>> {
        self.bus.as_ref()
    }

    /// Emit a raw signal. No-op without a bus.
    pub fn emit(&self, signal: &str, data: &Calldata) -> usize {
        self.bus.as_ref().map_or(0, |bus| bus.emit(signal, data))
    }

    /// Create a named source and announce it with `source_create`.
    ///
    /// An empty name is accepted; such a source is simply unnamed.
    pub fn create_source(&self, name: &str, kind: SourceKind, flags: OutputFlags) -> SourceRef {
        self.add(Some(name.to_string()), kind, flags)
    }

    /// Create a source without a name (host-private).
    pub fn create_private_source(&self, kind: SourceKind, flags: OutputFlags) -> SourceRef {
        self.add(None, kind, flags)
    }

    fn add(&self, name: Option<String>, kind: SourceKind, flags: OutputFlags) -> SourceRef {
        let source = Arc::new(MemorySource::new(name, kind, flags));
        lock(&self.sources).push(source.clone());

        tracing::debug!(name = ?source.name(), kind = %kind, "source created");
        let handle: SourceRef = source;
        self.emit(
            SOURCE_CREATE,
            &Calldata::new().with("source", CallValue::Source(handle.clone())),
        );
        handle
    }

    /// Rename a source and announce it with `source_rename`.
    ///
    /// Renaming to the current name is a no-op and emits nothing.
    pub fn rename_source(&self, source: &SourceRef, new_name: &str) -> Result<(), HostError> {
        if new_name.is_empty() {
            return Err(HostError::EmptyName);
        }

        let prev_name = {
            let sources = lock(&self.sources);
            let owned = sources
                .iter()
                .find(|s| std::ptr::addr_eq(Arc::as_ptr(s), Arc::as_ptr(source)))
                .ok_or_else(|| Self::describe(source))?;

            let prev_name = owned.name().unwrap_or_default();
            if prev_name == new_name {
                return Ok(());
            }
            if sources
                .iter()
                .any(|s| s.name().as_deref() == Some(new_name))
            {
                return Err(HostError::NameInUse(new_name.to_string()));
            }

            owned.set_name(new_name);
            prev_name
        };
        tracing::debug!(%prev_name, %new_name, "source renamed");

        self.emit(
            SOURCE_RENAME,
            &Calldata::new()
                .with("source", CallValue::Source(source.clone()))
                .with("prev_name", CallValue::String(prev_name))
                .with("new_name", CallValue::String(new_name.to_string())),
        );
        Ok(())
    }

    /// Release the host's reference and announce it with `source_destroy`.
    ///
    /// The source is freed once the caller and every handler drop their
    /// strong handles.
    pub fn destroy_source(&self, source: &SourceRef) -> Result<(), HostError> {
        let removed = {
            let mut sources = lock(&self.sources);
            let index = sources
                .iter()
                .position(|s| std::ptr::addr_eq(Arc::as_ptr(s), Arc::as_ptr(source)))
                .ok_or_else(|| Self::describe(source))?;
            sources.remove(index)
        };
        tracing::debug!(name = ?removed.name(), "source destroyed");

        self.emit(
            SOURCE_DESTROY,
            &Calldata::new().with("source", CallValue::Source(source.clone())),
        );
        drop(removed);
        Ok(())
    }

    /// Look up a live source by its current name.
    pub fn find_source(&self, name: &str) -> Option<SourceRef> {
        lock(&self.sources)
            .iter()
            .find(|s| s.name().as_deref() == Some(name))
            .map(|s| s.clone() as SourceRef)
    }

    pub fn source_count(&self) -> usize {
        lock(&self.sources).len()
    }

    fn describe(source: &SourceRef) -> HostError {
        HostError::UnknownSource(
            source
                .name()
                .unwrap_or_else(|| format!("{:p}", crate::source::source_addr(source))),
        )
    }
}

impl Host for MemoryHost {
    fn signal_bus(&self) -> Option<Arc<dyn SignalBus>> {
        self.bus.clone().map(|bus| bus as Arc<dyn SignalBus>)
    }

    fn for_each_source(&self, visitor: &mut dyn FnMut(&SourceRef) -> bool) {
        let sources: Vec<SourceRef> = lock(&self.sources)
            .iter()
            .map(|s| s.clone() as SourceRef)
            .collect();

        for source in &sources {
            if !visitor(source) {
                break;
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────

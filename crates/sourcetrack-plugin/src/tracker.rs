//! Source tracker: a process-wide registry of the host's named sources.
//!
//! The tracker mirrors the host's live set of named sources through the
//! `source_create`, `source_destroy` and `source_rename` signals. It only
//! holds weak references, so it never keeps a source alive.
//!
//! The map is guarded by one mutex. No caller-supplied code (filters,
//! visitors) and no host call runs while that mutex is held: `enumerate`
//! copies the map and releases the lock before resolving anything, so
//! visitors may re-enter the tracker or mutate the host freely.

use std::collections::HashMap;
use std::fmt;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use sourcetrack_host::source::source_addr;
use sourcetrack_host::{Calldata, HandlerId, Host, SignalBus, SignalHandler, SourceRef, WeakSource};
use tracing::{debug, error, info, warn};

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::events::{SourceEvent, KNOWN_SIGNALS};
use crate::filters::SourceFilter;
use crate::guard::{guard_signal, panic_message};

/// The process-wide tracker, alive while anyone holds an `Arc` to it.
static INSTANCE: Mutex<Weak<SourceTracker>> = Mutex::new(Weak::new());

// The map only holds weak references; a panicked writer cannot leave it
// half-updated in a way readers could trip over.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes the entry pointing at `source`, or the first one if none does.
fn erase_one(entries: &mut Vec<WeakSource>, source: &SourceRef) -> bool {
    if entries.is_empty() {
        return false;
    }
    let index = entries.iter().position(|w| w == source).unwrap_or(0);
    entries.remove(index);
    true
}

/// Finds the entry to drop for `source`: by identity under `name`, then by
/// identity anywhere, then the first entry under `name`.
fn locate(
    sources: &HashMap<String, Vec<WeakSource>>,
    name: Option<&str>,
    source: &SourceRef,
) -> Option<(String, usize)> {
    let in_bucket = |key: &str| {
        sources
            .get(key)
            .and_then(|entries| entries.iter().position(|w| w == source))
            .map(|index| (key.to_string(), index))
    };

    name.and_then(in_bucket)
        .or_else(|| {
            sources.iter().find_map(|(key, entries)| {
                entries
                    .iter()
                    .position(|w| w == source)
                    .map(|index| (key.clone(), index))
            })
        })
        .or_else(|| {
            let key = name?;
            sources
                .get(key)
                .filter(|entries| !entries.is_empty())
                .map(|_| (key.to_string(), 0))
        })
}

/// Registry of named host sources.
pub struct SourceTracker {
    /// Name → weak references. Several entries may share a name.
    sources: Mutex<HashMap<String, Vec<WeakSource>>>,
    /// Bus the handlers were connected to; `None` in degraded mode.
    bus: Option<Arc<dyn SignalBus>>,
    /// Handlers that were actually connected, for disconnection on drop.
    connections: Mutex<Vec<(&'static str, HandlerId)>>,
}

impl SourceTracker {
    /// Obtain the process-wide tracker, creating it on first use.
    ///
    /// The tracker is torn down when the last returned `Arc` is dropped; the
    /// next call creates a fresh one. Concurrent callers block until a
    /// pending construction finishes and then share its result.
    pub fn instance(host: &dyn Host) -> Arc<Self> {
        let mut slot = lock(&INSTANCE);
        if let Some(tracker) = slot.upgrade() {
            return tracker;
        }

        let tracker = Self::with_config(host, &TrackerConfig::from_env());
        *slot = Arc::downgrade(&tracker);
        info!(tracked = tracker.len(), "source tracker created");
        tracker
    }

    /// Build a standalone tracker with default configuration.
    ///
    /// Not registered as the process-wide instance.
    pub fn new(host: &dyn Host) -> Arc<Self> {
        Self::with_config(host, &TrackerConfig::default())
    }

    /// Build a standalone tracker.
    ///
    /// Subscribes to the host's lifecycle signals first, then scans the
    /// existing sources, so nothing created in between is missed.
    pub fn with_config(host: &dyn Host, config: &TrackerConfig) -> Arc<Self> {
        let bus = host.signal_bus();
        let tracker = Arc::new(Self {
            sources: Mutex::new(HashMap::new()),
            bus: bus.clone(),
            connections: Mutex::new(Vec::new()),
        });

        match &bus {
            Some(bus) => tracker.connect_signals(bus),
            None => warn!("no global signal handler was present at initialization"),
        }

        if config.initial_scan {
            tracker.scan(host);
        }

        debug!(
            tracked = tracker.len(),
            subscribed = tracker.bus.is_some(),
            "source tracker initialized"
        );
        tracker
    }

    /// Insert every existing host source. One faulty source is skipped
    /// with a warning; a failing host enumeration ends the scan early.
    fn scan(&self, host: &dyn Host) {
        let walked = panic::catch_unwind(AssertUnwindSafe(|| {
            host.for_each_source(&mut |source| {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.insert(source)))
                {
                    warn!(
                        source = ?source_addr(source),
                        "skipped source during initial scan after panic: {}",
                        panic_message(payload.as_ref())
                    );
                }
                true
            });
        }));

        if let Err(payload) = walked {
            warn!(
                tracked = self.len(),
                "initial scan ended early after panic: {}",
                panic_message(payload.as_ref())
            );
        }
    }

    fn connect_signals(self: &Arc<Self>, bus: &Arc<dyn SignalBus>) {
        let connected: Vec<(&'static str, HandlerId)> = KNOWN_SIGNALS
            .iter()
            .map(|&signal| {
                let tracker = Arc::downgrade(self);
                let handler: SignalHandler = Arc::new(move |data: &Calldata| {
                    if let Some(tracker) = tracker.upgrade() {
                        tracker.handle_signal(signal, data);
                    }
                });
                (signal, bus.connect(signal, handler))
            })
            .collect();

        lock(&self.connections).extend(connected);
    }

    fn handle_signal(&self, signal: &str, data: &Calldata) {
        guard_signal(signal, || match SourceEvent::from_calldata(signal, data)? {
            SourceEvent::Created(source) => {
                self.insert(&source);
                Ok(())
            }
            SourceEvent::Destroyed(source) => self.remove(&source),
            SourceEvent::Renamed {
                source,
                prev_name,
                new_name,
            } => self.rename(&prev_name, &new_name, &source),
        });
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Start tracking `source` under its current name.
    ///
    /// Sources without a name, or with an empty one, are left untracked.
    pub fn insert(&self, source: &SourceRef) {
        let Some(name) = source.name().filter(|name| !name.is_empty()) else {
            debug!(source = ?source_addr(source), "unnamed source left untracked");
            return;
        };

        lock(&self.sources)
            .entry(name)
            .or_default()
            .push(WeakSource::new(source));
    }

    /// Stop tracking `source`.
    ///
    /// Looks it up by identity under its current name first, then across all
    /// entries (the name may already have changed). Only if neither finds it
    /// is the first entry under its current name dropped. Fails if there is
    /// nothing to drop.
    pub fn remove(&self, source: &SourceRef) -> Result<(), TrackerError> {
        let name = source.name();
        let mut sources = lock(&self.sources);

        if let Some((key, index)) = locate(&sources, name.as_deref(), source) {
            if let Some(entries) = sources.get_mut(&key) {
                entries.remove(index);
                if entries.is_empty() {
                    sources.remove(&key);
                }
            }
            return Ok(());
        }
        drop(sources);

        let label = name.unwrap_or_else(|| format!("{:p}", source_addr(source)));
        error!(source = %label, "attempt to remove untracked source failed");
        Err(TrackerError::Untracked(label))
    }

    /// Move `source` from `old_name` to `new_name` in one step.
    ///
    /// A missing `old_name` entry is tolerated; the new entry is always added.
    pub fn rename(
        &self,
        old_name: &str,
        new_name: &str,
        source: &SourceRef,
    ) -> Result<(), TrackerError> {
        if old_name == new_name {
            return Err(TrackerError::IdenticalNames(old_name.to_string()));
        }

        let mut sources = lock(&self.sources);
        if let Some(entries) = sources.get_mut(old_name) {
            erase_one(entries, source);
            if entries.is_empty() {
                sources.remove(old_name);
            }
        }
        sources
            .entry(new_name.to_string())
            .or_default()
            .push(WeakSource::new(source));
        Ok(())
    }

    // ── Enumeration ──────────────────────────────────────────────────

    fn snapshot(&self) -> Vec<(String, WeakSource)> {
        lock(&self.sources)
            .iter()
            .flat_map(|(name, entries)| entries.iter().map(move |w| (name.clone(), w.clone())))
            .collect()
    }

    /// Visit every live tracked source, in no particular order.
    ///
    /// Works on a copy taken at the start, so the visitor may see sources
    /// that were renamed or removed since; sources already destroyed are
    /// skipped. `filter` returning `true` excludes an entry. The visitor
    /// returns `ControlFlow::Break(())` to stop early. A panic while
    /// processing one entry skips that entry only.
    pub fn enumerate<V>(&self, filter: Option<&SourceFilter>, mut visitor: V)
    where
        V: FnMut(&str, &SourceRef) -> ControlFlow<()>,
    {
        for (name, weak) in self.snapshot() {
            let step = panic::catch_unwind(AssertUnwindSafe(|| {
                let Some(source) = weak.upgrade() else {
                    return ControlFlow::Continue(());
                };
                if filter.is_some_and(|filter| filter(name.as_str(), &source)) {
                    return ControlFlow::Continue(());
                }
                visitor(name.as_str(), &source)
            }));

            match step {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(payload) => {
                    warn!(
                        source = %name,
                        "skipped source after panic during enumeration: {}",
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
    }

    // ── Query methods ────────────────────────────────────────────────

    /// Number of tracked entries, including ones whose source has expired.
    pub fn len(&self) -> usize {
        lock(&self.sources).values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.sources).is_empty()
    }

    /// Sorted names of all live tracked sources.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.enumerate(None, |name, _| {
            names.push(name.to_string());
            ControlFlow::Continue(())
        });
        names.sort();
        names
    }

    /// Whether the tracker is subscribed to host signals.
    pub fn is_subscribed(&self) -> bool {
        !lock(&self.connections).is_empty()
    }
}

impl fmt::Debug for SourceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceTracker")
            .field("tracked", &self.len())
            .field("subscribed", &self.is_subscribed())
            .finish_non_exhaustive()
    }
}

impl Drop for SourceTracker {
    fn drop(&mut self) {
        let connections = std::mem::take(
            self.connections
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if let Some(bus) = &self.bus {
            for (signal, id) in connections {
                if !bus.disconnect(signal, id) {
                    debug!(signal = %signal, "signal handler was already disconnected");
                }
            }
        }

        self.sources
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("source tracker destroyed");
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────

mod common;

use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;

use common::{host_with, mixed_host, visible, FaultyHost};
use sourcetrack_host::{
    CallValue, Calldata, OutputFlags, SourceKind, SOURCE_CREATE, SOURCE_DESTROY, SOURCE_RENAME,
};
use sourcetrack_plugin::{
    filter_audio_sources, filter_scenes, filter_sources, filter_transitions,
    filter_video_sources, SourceTracker, TrackerConfig,
};

// ── Signal-driven updates ────────────────────────────────────────────

#[test]
fn test_tracks_sources_created_after_start() {
    let host = host_with(&[("early", SourceKind::Input, OutputFlags::VIDEO)]);
    let tracker = SourceTracker::new(&*host);
    assert!(tracker.is_subscribed());

    host.create_source("late", SourceKind::Input, OutputFlags::AUDIO);
    assert_eq!(tracker.names(), vec!["early", "late"]);
}

#[test]
fn test_private_sources_are_ignored() {
    let host = host_with(&[]);
    let tracker = SourceTracker::new(&*host);
    let _private = host.create_private_source(SourceKind::Filter, OutputFlags::VIDEO);
    assert!(tracker.is_empty());
}

#[test]
fn test_destroy_signal_removes_entry() {
    let host = mixed_host();
    let tracker = SourceTracker::new(&*host);
    assert_eq!(tracker.len(), 3);

    let b = host.find_source("B").unwrap();
    host.destroy_source(&b).unwrap();
    assert_eq!(tracker.len(), 2);
    assert_eq!(tracker.names(), vec!["A", "C"]);
}

#[test]
fn test_rename_signal_moves_entry() {
    let host = mixed_host();
    let tracker = SourceTracker::new(&*host);

    let a = host.find_source("A").unwrap();
    host.rename_source(&a, "A2").unwrap();
    assert_eq!(tracker.names(), vec!["A2", "B", "C"]);

    // The renamed source is still removed cleanly on destroy.
    host.destroy_source(&a).unwrap();
    assert_eq!(tracker.names(), vec!["B", "C"]);
    assert_eq!(tracker.len(), 2);
}

#[test]
fn test_destroy_of_unscanned_source_is_contained() {
    let host = host_with(&[("before", SourceKind::Input, OutputFlags::VIDEO)]);
    let config = TrackerConfig {
        initial_scan: false,
        ..Default::default()
    };
    let tracker = SourceTracker::with_config(&*host, &config);
    assert!(tracker.is_empty());

    // The tracker never saw it; the error stays inside the handler.
    let before = host.find_source("before").unwrap();
    host.destroy_source(&before).unwrap();
    assert!(tracker.is_empty());
}

#[test]
fn test_malformed_events_are_dropped() {
    let host = mixed_host();
    let tracker = SourceTracker::new(&*host);
    let a = host.find_source("A").unwrap();

    host.emit(SOURCE_CREATE, &Calldata::new());
    host.emit(
        SOURCE_DESTROY,
        &Calldata::new().with("source", CallValue::String("A".into())),
    );
    host.emit(
        SOURCE_RENAME,
        &Calldata::new()
            .with("source", CallValue::Source(a.clone()))
            .with("prev_name", CallValue::String("A".into())),
    );
    host.emit(
        SOURCE_RENAME,
        &Calldata::new()
            .with("source", CallValue::Source(a))
            .with("prev_name", CallValue::String("A".into()))
            .with("new_name", CallValue::String("A".into())),
    );

    assert_eq!(tracker.names(), vec!["A", "B", "C"]);
    assert_eq!(tracker.len(), 3);
}

// ── Enumeration ──────────────────────────────────────────────────────

#[test]
fn test_standard_filters() {
    let host = mixed_host();
    let tracker = SourceTracker::new(&*host);

    assert_eq!(visible(&tracker, None), vec!["A", "B", "C"]);
    assert_eq!(visible(&tracker, Some(&filter_sources)), vec!["A", "B"]);
    assert_eq!(visible(&tracker, Some(&filter_video_sources)), vec!["A"]);
    assert_eq!(visible(&tracker, Some(&filter_audio_sources)), vec!["B"]);
    assert_eq!(visible(&tracker, Some(&filter_scenes)), vec!["C"]);
    assert!(visible(&tracker, Some(&filter_transitions)).is_empty());
}

#[test]
fn test_early_termination() {
    let host = mixed_host();
    let tracker = SourceTracker::new(&*host);

    let mut visits = 0;
    tracker.enumerate(None, |_, _| {
        visits += 1;
        if visits == 2 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(visits, 2);
}

#[test]
fn test_visitor_may_destroy_other_sources() {
    let host = mixed_host();
    let tracker = SourceTracker::new(&*host);

    let mut visited = Vec::new();
    tracker.enumerate(None, |name, _| {
        visited.push(name.to_string());
        for other in ["A", "B", "C"] {
            if other == name {
                continue;
            }
            if let Some(source) = host.find_source(other) {
                host.destroy_source(&source).unwrap();
            }
        }
        ControlFlow::Continue(())
    });

    // The others were freed before their turn came.
    assert_eq!(visited.len(), 1);
    assert_eq!(tracker.len(), 1);
    assert_eq!(tracker.names(), visited);
}

#[test]
fn test_visitor_may_reenter_tracker() {
    let host = mixed_host();
    let tracker = SourceTracker::new(&*host);

    let mut inner_counts = Vec::new();
    tracker.enumerate(Some(&filter_scenes), |_, _| {
        inner_counts.push(tracker.names().len());
        host.create_source("spawned", SourceKind::Input, OutputFlags::VIDEO);
        ControlFlow::Continue(())
    });

    assert_eq!(inner_counts, vec![3]);
    assert_eq!(tracker.names(), vec!["A", "B", "C", "spawned"]);
}

#[test]
fn test_does_not_keep_sources_alive() {
    let host = mixed_host();
    let tracker = SourceTracker::new(&*host);

    let a = host.find_source("A").unwrap();
    let weak = Arc::downgrade(&a);
    drop(a);
    drop(host);

    assert!(weak.upgrade().is_none());
    assert!(visible(&tracker, None).is_empty());
}

#[test]
fn test_concurrent_updates_and_enumeration() {
    let host = host_with(&[]);
    let tracker = SourceTracker::new(&*host);

    thread::scope(|scope| {
        for worker in 0..4 {
            let host = &host;
            scope.spawn(move || {
                for i in 0..50 {
                    let name = format!("w{worker}-{i}");
                    let source = host.create_source(&name, SourceKind::Input, OutputFlags::VIDEO);
                    if i % 2 == 0 {
                        host.destroy_source(&source).unwrap();
                    }
                }
            });
        }
        let tracker = &tracker;
        scope.spawn(move || {
            for _ in 0..50 {
                tracker.enumerate(Some(&filter_video_sources), |_, source| {
                    assert_eq!(source.kind(), SourceKind::Input);
                    ControlFlow::Continue(())
                });
            }
        });
    });

    assert_eq!(tracker.len(), 100);
    assert_eq!(visible(&tracker, None).len(), 100);
}

// ── Construction scan ────────────────────────────────────────────────

#[test]
fn test_scan_skips_faulty_source() {
    let host = FaultyHost::faulty_first(mixed_host());
    let tracker = SourceTracker::new(&host);

    assert!(tracker.is_subscribed());
    assert_eq!(tracker.names(), vec!["A", "B", "C"]);
}

#[test]
fn test_teardown_after_interrupted_scan() {
    let inner = mixed_host();
    let bus = inner.bus().unwrap().clone();
    let host = FaultyHost::failing_after(inner.clone(), 1);

    let tracker = SourceTracker::new(&host);
    // Only the first listed source was reached.
    assert_eq!(tracker.names(), vec!["A"]);

    // Still subscribed despite the failed scan.
    inner.create_source("D", SourceKind::Input, OutputFlags::VIDEO);
    assert_eq!(tracker.names(), vec!["A", "D"]);

    drop(tracker);
    for signal in [SOURCE_CREATE, SOURCE_DESTROY, SOURCE_RENAME] {
        assert_eq!(bus.handler_count(signal), 0);
    }
}

// ── Teardown ─────────────────────────────────────────────────────────

#[test]
fn test_drop_disconnects_handlers() {
    let host = mixed_host();
    let bus = host.bus().unwrap().clone();

    let tracker = SourceTracker::new(&*host);
    for signal in [SOURCE_CREATE, SOURCE_DESTROY, SOURCE_RENAME] {
        assert_eq!(bus.handler_count(signal), 1);
    }

    drop(tracker);
    for signal in [SOURCE_CREATE, SOURCE_DESTROY, SOURCE_RENAME] {
        assert_eq!(bus.handler_count(signal), 0);
    }

    // Later events reach nobody.
    host.create_source("after", SourceKind::Input, OutputFlags::VIDEO);
}

#[test]
fn test_without_bus_still_scans() {
    let host = sourcetrack_host::MemoryHost::without_bus();
    host.create_source("only", SourceKind::Input, OutputFlags::VIDEO);

    let tracker = SourceTracker::new(&*host);
    assert!(!tracker.is_subscribed());
    assert_eq!(tracker.names(), vec!["only"]);
}

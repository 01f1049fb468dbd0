//! Source tracker plugin.
//!
//! Keeps a process-wide, name-keyed registry of the host's sources up to
//! date through the host's lifecycle signals, and lets callers enumerate
//! the live ones with optional filters. The `sink` module is the one
//! consumer shipped with the plugin.

pub mod component;
pub mod config;
pub mod error;
pub mod events;
pub mod filters;
pub mod guard;
pub mod logging;
pub mod sink;
pub mod tracker;

pub use component::{module_load, module_unload, TrackerComponent, COMPONENT, COMPONENT_NAME};
pub use config::TrackerConfig;
pub use error::TrackerError;
pub use events::{SourceEvent, KNOWN_SIGNALS};
pub use filters::{
    filter_audio_sources, filter_scenes, filter_sources, filter_transitions, filter_video_sources,
    SourceFilter,
};
pub use guard::guard_signal;
pub use logging::init_logging;
pub use sink::{SinkFactory, SinkInstance, SinkSettings};
pub use tracker::SourceTracker;

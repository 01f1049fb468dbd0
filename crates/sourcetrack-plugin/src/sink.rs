//! Sink source: lets the user pick one video and one audio source.
//!
//! Rendering and audio callbacks are not part of this module; what lives
//! here is the source descriptor, its persisted settings, and the choice
//! lists fed by the tracker.

use std::ops::ControlFlow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sourcetrack_host::{OutputFlags, SourceKind, SourceRef};

use crate::error::TrackerError;
use crate::filters::{filter_audio_sources, filter_video_sources, SourceFilter};
use crate::tracker::SourceTracker;

/// Source type id registered with the host.
pub const SINK_ID: &str = "source-sink";

pub const KEY_VIDEO: &str = "Video";
pub const KEY_VIDEO_SOURCE: &str = "Video.Source";
pub const KEY_AUDIO: &str = "Audio";
pub const KEY_AUDIO_SOURCE: &str = "Audio.Source";

// ─── Descriptor ─────────────────────────────────────────────────────────

/// Static description of the sink source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkFactory;

impl SinkFactory {
    pub fn id(&self) -> &'static str {
        SINK_ID
    }

    pub fn kind(&self) -> SourceKind {
        SourceKind::Input
    }

    pub fn output_flags(&self) -> OutputFlags {
        OutputFlags::VIDEO | OutputFlags::ASYNC | OutputFlags::AUDIO
    }

    /// Nominal size; the sink never draws anything itself.
    pub fn dimensions(&self) -> (u32, u32) {
        (1, 1)
    }
}

// ─── Settings ───────────────────────────────────────────────────────────

/// Persisted settings, stored by the host as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSettings {
    #[serde(rename = "Video")]
    pub video_enabled: bool,
    #[serde(rename = "Video.Source", skip_serializing_if = "Option::is_none")]
    pub video_source: Option<String>,
    #[serde(rename = "Audio")]
    pub audio_enabled: bool,
    #[serde(rename = "Audio.Source", skip_serializing_if = "Option::is_none")]
    pub audio_source: Option<String>,
}

impl SinkSettings {
    /// Parse from the host's settings object. Missing keys take defaults.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TrackerError> {
        Ok(Self::deserialize(value)?)
    }

    pub fn to_json(&self) -> Result<serde_json::Value, TrackerError> {
        Ok(serde_json::to_value(self)?)
    }
}

// ─── Instance ───────────────────────────────────────────────────────────

/// One sink placed by the user.
#[derive(Debug)]
pub struct SinkInstance {
    own_name: String,
    settings: SinkSettings,
    tracker: Arc<SourceTracker>,
}

impl SinkInstance {
    pub fn new(
        own_name: impl Into<String>,
        settings: SinkSettings,
        tracker: Arc<SourceTracker>,
    ) -> Self {
        Self {
            own_name: own_name.into(),
            settings,
            tracker,
        }
    }

    /// Apply a settings object from the host.
    ///
    /// Invalid settings leave the current ones untouched.
    pub fn update(&mut self, value: &serde_json::Value) -> Result<(), TrackerError> {
        self.settings = SinkSettings::from_json(value)?;
        tracing::debug!(sink = %self.own_name, settings = ?self.settings, "sink settings updated");
        Ok(())
    }

    pub fn settings(&self) -> &SinkSettings {
        &self.settings
    }

    /// The sink was renamed by the host.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.own_name = name.into();
    }

    /// Sorted names of inputs that can feed video into this sink.
    pub fn video_source_choices(&self) -> Vec<String> {
        self.choices(&filter_video_sources)
    }

    /// Sorted names of inputs that can feed audio into this sink.
    pub fn audio_source_choices(&self) -> Vec<String> {
        self.choices(&filter_audio_sources)
    }

    /// Resolve the configured video source, if enabled and still alive.
    pub fn selected_video_source(&self) -> Option<SourceRef> {
        if !self.settings.video_enabled {
            return None;
        }
        self.resolve(self.settings.video_source.as_deref()?, &filter_video_sources)
    }

    /// Resolve the configured audio source, if enabled and still alive.
    pub fn selected_audio_source(&self) -> Option<SourceRef> {
        if !self.settings.audio_enabled {
            return None;
        }
        self.resolve(self.settings.audio_source.as_deref()?, &filter_audio_sources)
    }

    fn choices(&self, filter: &SourceFilter) -> Vec<String> {
        let mut names = Vec::new();
        self.tracker.enumerate(Some(filter), |name, _| {
            if name != self.own_name {
                names.push(name.to_string());
            }
            ControlFlow::Continue(())
        });
        names.sort();
        names.dedup();
        names
    }

    fn resolve(&self, wanted: &str, filter: &SourceFilter) -> Option<SourceRef> {
        if wanted == self.own_name {
            return None;
        }

        let mut found = None;
        self.tracker.enumerate(Some(filter), |name, source| {
            if name == wanted {
                found = Some(source.clone());
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        found
    }
}

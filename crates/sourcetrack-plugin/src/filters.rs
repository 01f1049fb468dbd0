//! Enumeration filters.
//!
//! A filter returns `true` to EXCLUDE an entry from enumeration. The five
//! `filter_*` functions are the ready-made ones; `not_kind`, `lacking` and
//! `exclude_either` build new ones.

use sourcetrack_host::{OutputFlags, SourceKind, SourceRef};

/// Predicate over a tracked `(name, source)` pair; `true` excludes it.
pub type SourceFilter = dyn Fn(&str, &SourceRef) -> bool;

/// Excludes sources whose kind is not `kind`.
pub fn not_kind(kind: SourceKind) -> impl Fn(&str, &SourceRef) -> bool + Copy {
    move |_name: &str, source: &SourceRef| source.kind() != kind
}

/// Excludes sources missing any of `flags`.
pub fn lacking(flags: OutputFlags) -> impl Fn(&str, &SourceRef) -> bool + Copy {
    move |_name: &str, source: &SourceRef| !source.output_flags().contains(flags)
}

/// Excludes what either `a` or `b` excludes.
pub fn exclude_either<A, B>(a: A, b: B) -> impl Fn(&str, &SourceRef) -> bool
where
    A: Fn(&str, &SourceRef) -> bool,
    B: Fn(&str, &SourceRef) -> bool,
{
    move |name: &str, source: &SourceRef| a(name, source) || b(name, source)
}

/// Excludes everything that is not an input.
pub fn filter_sources(name: &str, source: &SourceRef) -> bool {
    not_kind(SourceKind::Input)(name, source)
}

/// Excludes non-inputs and inputs without audio.
pub fn filter_audio_sources(name: &str, source: &SourceRef) -> bool {
    exclude_either(not_kind(SourceKind::Input), lacking(OutputFlags::AUDIO))(name, source)
}

/// Excludes non-inputs and inputs without video.
pub fn filter_video_sources(name: &str, source: &SourceRef) -> bool {
    exclude_either(not_kind(SourceKind::Input), lacking(OutputFlags::VIDEO))(name, source)
}

/// Excludes everything that is not a transition.
pub fn filter_transitions(name: &str, source: &SourceRef) -> bool {
    not_kind(SourceKind::Transition)(name, source)
}

/// Excludes everything that is not a scene.
pub fn filter_scenes(name: &str, source: &SourceRef) -> bool {
    not_kind(SourceKind::Scene)(name, source)
}

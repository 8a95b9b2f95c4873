//! Mapping playback scopes to measure ranges

use serde::{Deserialize, Serialize};

use crate::composition::Composition;

/// Requested playback scope: the whole form or a named section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackScope {
    #[default]
    Full,
    SectionA,
    SectionB,
}

const SECTION_A_FALLBACK: (usize, usize) = (0, 7);
const SECTION_B_FALLBACK: (usize, usize) = (16, 23);

/// Resolve a scope to `(start_measure, end_measure)`, both inclusive.
///
/// Section scopes match the first section whose name contains the
/// letter, falling back to a fixed eight-bar range when nothing matches.
/// The end measure is informational only; playback is bounded by total
/// duration and looping, never clamped to it.
pub fn scope_bounds(scope: PlaybackScope, composition: &Composition) -> (usize, usize) {
    match scope {
        PlaybackScope::Full => (0, composition.measures.len().saturating_sub(1)),
        PlaybackScope::SectionA => named_bounds(composition, "A", SECTION_A_FALLBACK),
        PlaybackScope::SectionB => named_bounds(composition, "B", SECTION_B_FALLBACK),
    }
}

fn named_bounds(
    composition: &Composition,
    needle: &str,
    fallback: (usize, usize),
) -> (usize, usize) {
    composition
        .sections
        .iter()
        .find(|section| section.name.contains(needle))
        .map(|section| (section.start_measure, section.end_measure()))
        .unwrap_or(fallback)
}

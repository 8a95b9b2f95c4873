//! Derives timed note events per instrument voice from a composition

use crate::composition::Composition;
use crate::instrument::{Instrument, VOICE_COUNT};
use crate::pitch;

/// Beats per measure; the engine models 4/4 only.
pub const BEATS_PER_MEASURE: f64 = 4.0;

/// Seconds one measure occupies at the given tempo.
pub fn measure_duration_secs(tempo: f64) -> f64 {
    BEATS_PER_MEASURE / (tempo / 60.0)
}

/// One whole-measure note for one voice. Derived, never persisted;
/// timings are baked at the tempo the composition was resolved with.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// Voice index (0-7).
    pub voice: usize,
    /// 0-based measure index the note occupies.
    pub measure: usize,
    /// Resolved MIDI note number.
    pub note: u8,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub velocity: u8,
    /// Transient scheduling flag: true while the note is sounding.
    pub sounding: bool,
}

impl NoteEvent {
    /// Whether a playback position falls inside `[start, start+duration)`.
    pub fn contains(&self, position_secs: f64) -> bool {
        position_secs >= self.start_secs && position_secs < self.start_secs + self.duration_secs
    }
}

/// Ordered note events for one voice: one note per measure with a
/// resolvable pitch, each occupying its whole measure. Deterministic for
/// a given composition.
pub fn resolve_voice(composition: &Composition, voice: Instrument) -> Vec<NoteEvent> {
    let measure_secs = measure_duration_secs(composition.tempo);
    composition
        .measures
        .iter()
        .enumerate()
        .filter_map(|(measure_index, measure)| {
            let pitch_name = measure.chord.resolved_pitch(voice)?;
            Some(NoteEvent {
                voice: voice.index(),
                measure: measure_index,
                note: pitch::midi_note(pitch_name),
                start_secs: measure_index as f64 * measure_secs,
                duration_secs: measure_secs,
                velocity: voice.velocity(),
                sounding: false,
            })
        })
        .collect()
}

/// Note events for all eight voices, indexed by voice slot.
pub fn resolve_all(composition: &Composition) -> [Vec<NoteEvent>; VOICE_COUNT] {
    Instrument::ALL.map(|voice| resolve_voice(composition, voice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{Chord, Measure, Section, Voicing};

    fn composition(measures: Vec<Measure>) -> Composition {
        Composition {
            title: "Test".to_string(),
            key: "C".to_string(),
            form: "A".to_string(),
            style: "Test".to_string(),
            tempo: 120.0,
            measures,
            sections: vec![Section::new("A", 0, 4)],
        }
    }

    #[test]
    fn whole_measure_timing_at_120_bpm() {
        let events = resolve_voice(&Composition::sample(), Instrument::Flute);
        assert_eq!(events.len(), 4);
        // 4 beats at 120 BPM = 2 seconds per measure.
        assert_eq!(events[0].start_secs, 0.0);
        assert_eq!(events[0].duration_secs, 2.0);
        assert_eq!(events[2].start_secs, 4.0);
        assert_eq!(events[2].measure, 2);
    }

    #[test]
    fn round_robin_assignment_is_deterministic() {
        let comp = Composition::sample();
        // Flute (voice 0) takes the first pool pitch of each measure.
        let flute = resolve_voice(&comp, Instrument::Flute);
        assert_eq!(flute[0].note, 43); // G2
        assert_eq!(flute[1].note, 44); // Ab2
        // Viola I (voice 4) wraps around a 4-note pool back to slot 0.
        let viola = resolve_voice(&comp, Instrument::Viola1);
        assert_eq!(viola[0].note, 43);
        // Repeated resolution is idempotent.
        assert_eq!(resolve_voice(&comp, Instrument::Flute), flute);
    }

    #[test]
    fn voicing_override_wins() {
        let chord = Chord::new("C", ["C3", "E3", "G3"]).with_voicing(Voicing {
            flute: Some("C6".to_string()),
            ..Voicing::default()
        });
        let comp = composition(vec![Measure::new(1, chord)]);
        let events = resolve_voice(&comp, Instrument::Flute);
        assert_eq!(events[0].note, 84); // C6
    }

    #[test]
    fn empty_pool_leaves_a_silent_gap() {
        let comp = composition(vec![
            Measure::new(1, Chord::new("C", ["C3"])),
            Measure::new(2, Chord::new("N.C.", Vec::<String>::new())),
            Measure::new(3, Chord::new("G", ["G3"])),
        ]);
        let events = resolve_voice(&comp, Instrument::Piano);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].measure, 0);
        assert_eq!(events[1].measure, 2);
        // The gap is a gap, not a shifted note.
        assert_eq!(events[1].start_secs, 4.0);
    }

    #[test]
    fn unparseable_pitch_resolves_to_middle_c() {
        let comp = composition(vec![Measure::new(1, Chord::new("?", ["nonsense"]))]);
        let events = resolve_voice(&comp, Instrument::Bass);
        assert_eq!(events[0].note, 60);
    }

    #[test]
    fn velocities_come_from_the_instrument_table() {
        let comp = Composition::sample();
        assert_eq!(resolve_voice(&comp, Instrument::Flute)[0].velocity, 80);
        assert_eq!(resolve_voice(&comp, Instrument::Piano)[0].velocity, 90);
        assert_eq!(resolve_voice(&comp, Instrument::Bass)[0].velocity, 95);
    }

    #[test]
    fn window_containment_is_half_open() {
        let event = NoteEvent {
            voice: 0,
            measure: 0,
            note: 60,
            start_secs: 2.0,
            duration_secs: 2.0,
            velocity: 80,
            sounding: false,
        };
        assert!(!event.contains(1.99));
        assert!(event.contains(2.0));
        assert!(event.contains(3.99));
        assert!(!event.contains(4.0));
    }
}

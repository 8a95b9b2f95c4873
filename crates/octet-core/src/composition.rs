//! Composition data model: measures, chords, voicings, sections

use serde::{Deserialize, Serialize};

use crate::instrument::Instrument;

/// A complete symbolic composition as assembled by the generation
/// pipeline. Read-only once created; regeneration yields a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composition {
    pub title: String,
    /// Key as a pitch-class name ("Eb", "F#", ...).
    pub key: String,
    /// Form label ("AABA", ...).
    pub form: String,
    /// Style label ("Jazz Pop", ...).
    pub style: String,
    /// Tempo in beats per minute.
    pub tempo: f64,
    pub measures: Vec<Measure>,
    pub sections: Vec<Section>,
}

impl Composition {
    /// Bundled demo composition: four measures of an Eb jazz waltz with
    /// the standard AABA section map.
    pub fn sample() -> Self {
        Self {
            title: "Sample Jazz Waltz".to_string(),
            key: "Eb".to_string(),
            form: "AABA".to_string(),
            style: "Jazz Pop".to_string(),
            tempo: 120.0,
            measures: vec![
                Measure::new(1, Chord::new("Ebadd9/G", ["G2", "Bb3", "Eb4", "F4"])),
                Measure::new(2, Chord::new("Bb/Ab", ["Ab2", "D4", "F4", "Bb4"])),
                Measure::new(3, Chord::new("C-add9", ["C3", "Eb4", "G4", "D5"])),
                Measure::new(4, Chord::new("Absus2", ["Ab2", "Bb3", "Eb4", "Ab4"])),
            ],
            sections: vec![
                Section::new("A1", 0, 8),
                Section::new("A2", 8, 8),
                Section::new("B", 16, 8),
                Section::new("A3", 24, 8),
            ],
        }
    }
}

/// One bar carrying a single chord. Fixed 4/4: four beats per measure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measure {
    /// 1-based measure number.
    pub number: usize,
    pub chord: Chord,
    /// Duration in beats.
    pub duration_beats: f64,
}

impl Measure {
    pub fn new(number: usize, chord: Chord) -> Self {
        Self {
            number,
            chord,
            duration_beats: 4.0,
        }
    }
}

/// A chord symbol with its pitch pool and an optional explicit voicing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chord {
    /// Display symbol ("Ebadd9/G").
    pub symbol: String,
    /// Pitch-name pool distributed round-robin when no voicing applies.
    pub notes: Vec<String>,
    pub voicing: Option<Voicing>,
}

impl Chord {
    pub fn new<I, S>(symbol: &str, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbol: symbol.to_string(),
            notes: notes.into_iter().map(Into::into).collect(),
            voicing: None,
        }
    }

    pub fn with_voicing(mut self, voicing: Voicing) -> Self {
        self.voicing = Some(voicing);
        self
    }

    /// Pitch name this chord assigns to a voice: the explicit voicing
    /// slot when present, else the pool entry at `voice mod pool len`.
    /// An empty pool yields no pitch (a silent gap, not a rest).
    pub fn resolved_pitch(&self, voice: Instrument) -> Option<&str> {
        if let Some(voicing) = &self.voicing {
            if let Some(pitch) = voicing.slot(voice) {
                return Some(pitch);
            }
        }
        if self.notes.is_empty() {
            return None;
        }
        Some(&self.notes[voice.index() % self.notes.len()])
    }
}

/// Explicit per-voice pitch assignments for a chord. `None` slots fall
/// back to the chord's pitch pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Voicing {
    pub flute: Option<String>,
    pub piano: Option<String>,
    pub violin1: Option<String>,
    pub violin2: Option<String>,
    pub viola1: Option<String>,
    pub viola2: Option<String>,
    pub cello: Option<String>,
    pub bass: Option<String>,
}

impl Voicing {
    pub fn slot(&self, voice: Instrument) -> Option<&str> {
        let slot = match voice {
            Instrument::Flute => &self.flute,
            Instrument::Piano => &self.piano,
            Instrument::Violin1 => &self.violin1,
            Instrument::Violin2 => &self.violin2,
            Instrument::Viola1 => &self.viola1,
            Instrument::Viola2 => &self.viola2,
            Instrument::Cello => &self.cello,
            Instrument::Bass => &self.bass,
        };
        slot.as_deref()
    }
}

/// A named span of measures. Sections may overlap or leave gaps; nothing
/// enforces contiguity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    /// 0-based first measure.
    pub start_measure: usize,
    /// Length in measures.
    pub length: usize,
}

impl Section {
    pub fn new(name: &str, start_measure: usize, length: usize) -> Self {
        Self {
            name: name.to_string(),
            start_measure,
            length,
        }
    }

    /// Last measure of the section (inclusive). Clamped so a zero-length
    /// section cannot underflow.
    pub fn end_measure(&self) -> usize {
        (self.start_measure + self.length).saturating_sub(1)
    }
}

/// Request shape accepted by the external generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub key: String,
    pub form: String,
    pub style: String,
    pub tempo: f64,
    pub complexity: ComplexityLevel,
    pub voicing_style: VoicingStyle,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            key: "Eb Major".to_string(),
            form: "AABA".to_string(),
            style: "Jazz Waltz".to_string(),
            tempo: 120.0,
            complexity: ComplexityLevel::default(),
            voicing_style: VoicingStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Simple,
    #[default]
    Medium,
    Complex,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoicingStyle {
    #[default]
    AxelFisch,
    Traditional,
    Modern,
    Minimal,
}

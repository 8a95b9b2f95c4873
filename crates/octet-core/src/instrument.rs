//! The fixed eight-voice instrument set and its per-voice constants

use serde::{Deserialize, Serialize};

/// Number of instrument voices; fixed across the whole engine.
pub const VOICE_COUNT: usize = 8;

/// One of the eight fixed instrument slots, in channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    Flute,
    Piano,
    Violin1,
    Violin2,
    Viola1,
    Viola2,
    Cello,
    Bass,
}

impl Instrument {
    /// All voices in slot order. The index into this array is the voice
    /// index, the MIDI channel, and the MIDI track position.
    pub const ALL: [Instrument; VOICE_COUNT] = [
        Instrument::Flute,
        Instrument::Piano,
        Instrument::Violin1,
        Instrument::Violin2,
        Instrument::Viola1,
        Instrument::Viola2,
        Instrument::Cello,
        Instrument::Bass,
    ];

    pub fn from_index(index: usize) -> Option<Instrument> {
        Self::ALL.get(index).copied()
    }

    /// Voice index (0-7) in slot order.
    pub fn index(self) -> usize {
        match self {
            Instrument::Flute => 0,
            Instrument::Piano => 1,
            Instrument::Violin1 => 2,
            Instrument::Violin2 => 3,
            Instrument::Viola1 => 4,
            Instrument::Viola2 => 5,
            Instrument::Cello => 6,
            Instrument::Bass => 7,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Instrument::Flute => "Flute",
            Instrument::Piano => "Piano",
            Instrument::Violin1 => "Violin I",
            Instrument::Violin2 => "Violin II",
            Instrument::Viola1 => "Viola I",
            Instrument::Viola2 => "Viola II",
            Instrument::Cello => "Cello",
            Instrument::Bass => "Bass",
        }
    }

    /// General MIDI program number written on this voice's track.
    pub fn gm_program(self) -> u8 {
        match self {
            Instrument::Flute => 73,
            Instrument::Piano => 0,
            Instrument::Violin1 | Instrument::Violin2 => 40,
            Instrument::Viola1 | Instrument::Viola2 => 41,
            Instrument::Cello => 42,
            Instrument::Bass => 43,
        }
    }

    /// Note-on velocity for this voice. A per-instrument constant, not
    /// derived from the composition.
    pub fn velocity(self) -> u8 {
        match self {
            Instrument::Flute => 80,
            Instrument::Piano => 90,
            Instrument::Violin1 | Instrument::Violin2 => 85,
            Instrument::Viola1 | Instrument::Viola2 => 80,
            Instrument::Cello => 85,
            Instrument::Bass => 95,
        }
    }

    /// Synthesis profile consumed by the audio sink.
    pub fn profile(self) -> InstrumentProfile {
        match self {
            Instrument::Flute => InstrumentProfile::new(Waveform::Sine, 0.3, 4000.0),
            Instrument::Piano => InstrumentProfile::new(Waveform::Sawtooth, 0.4, 8000.0),
            Instrument::Violin1 | Instrument::Violin2 => {
                InstrumentProfile::new(Waveform::Sawtooth, 0.35, 6000.0)
            }
            Instrument::Viola1 | Instrument::Viola2 => {
                InstrumentProfile::new(Waveform::Sawtooth, 0.4, 4000.0)
            }
            Instrument::Cello => InstrumentProfile::new(Waveform::Sawtooth, 0.45, 2000.0),
            Instrument::Bass => InstrumentProfile::new(Waveform::Square, 0.5, 1000.0),
        }
    }
}

/// Oscillator waveform for a voice's fallback synthesis path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Square,
}

/// Timbre and tone-shaping constants for one voice.
///
/// Carried as plain data; how a sink realises the waveform and filter is
/// its own concern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    pub waveform: Waveform,
    /// Oscillator amplitude (0-1).
    pub amplitude: f32,
    /// Low-pass cutoff in Hz.
    pub filter_cutoff_hz: f32,
}

impl InstrumentProfile {
    fn new(waveform: Waveform, amplitude: f32, filter_cutoff_hz: f32) -> Self {
        Self {
            waveform,
            amplitude,
            filter_cutoff_hz,
        }
    }
}

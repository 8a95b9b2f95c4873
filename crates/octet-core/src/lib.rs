//! octet-core: Domain types and algorithms for the octet orchestrator

pub mod clock;
pub mod composition;
pub mod instrument;
pub mod midi_file;
pub mod mixer;
pub mod pitch;
pub mod resolver;
pub mod section;

pub use clock::{TempoClock, total_duration_secs};
pub use composition::{
    Chord, ComplexityLevel, Composition, GenerationParameters, Measure, Section, Voicing,
    VoicingStyle,
};
pub use instrument::{Instrument, InstrumentProfile, VOICE_COUNT, Waveform};
pub use midi_file::{MidiExportError, TICKS_PER_QUARTER, export_midi};
pub use mixer::{MixerChannel, MixerState};
pub use resolver::{BEATS_PER_MEASURE, NoteEvent, measure_duration_secs, resolve_all, resolve_voice};
pub use section::{PlaybackScope, scope_bounds};

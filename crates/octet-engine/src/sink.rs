//! Audio sink boundary: where note triggers leave the scheduler

use tracing::trace;

/// Receiver for real-time note and level triggers.
///
/// Implementations must not block: triggers are fire-and-forget, and a
/// slow sink should drop or defer work rather than stall the tick loop.
/// Sink failures are logged, never surfaced to the scheduler.
pub trait AudioSink: Send {
    fn note_on(&mut self, voice: usize, note: u8, velocity: u8);
    fn note_off(&mut self, voice: usize, note: u8);
    /// Per-voice effective volume (0-1); 0 means the voice is muted.
    fn set_volume(&mut self, voice: usize, volume: f64);
    /// Per-voice reverb wet mix (0-1).
    fn set_reverb(&mut self, voice: usize, reverb: f64);
    /// Master bus levels, applied downstream of per-voice settings.
    fn set_master(&mut self, volume: f64, reverb: f64);
}

/// Sink that discards every trigger; used headless and in tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn note_on(&mut self, voice: usize, note: u8, velocity: u8) {
        trace!(voice, note, velocity, "note on discarded");
    }

    fn note_off(&mut self, voice: usize, note: u8) {
        trace!(voice, note, "note off discarded");
    }

    fn set_volume(&mut self, _voice: usize, _volume: f64) {}

    fn set_reverb(&mut self, _voice: usize, _reverb: f64) {}

    fn set_master(&mut self, _volume: f64, _reverb: f64) {}
}

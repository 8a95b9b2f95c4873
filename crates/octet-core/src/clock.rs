//! Tempo-scaled playback position clock

use crate::resolver::BEATS_PER_MEASURE;

/// Reference tempo: position advances in real time at 120 BPM.
pub const REFERENCE_BPM: f64 = 120.0;

/// Accumulates a musical position from wall-clock deltas, scaled
/// relative to [`REFERENCE_BPM`]. A tempo change applies from the next
/// `advance`; already-elapsed position is never rescaled.
#[derive(Debug, Clone)]
pub struct TempoClock {
    tempo: f64,
    position_secs: f64,
}

impl TempoClock {
    pub fn new(tempo: f64) -> Self {
        Self {
            tempo,
            position_secs: 0.0,
        }
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn set_tempo(&mut self, tempo: f64) {
        self.tempo = tempo;
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn seek(&mut self, position_secs: f64) {
        self.position_secs = position_secs;
    }

    pub fn reset(&mut self) {
        self.position_secs = 0.0;
    }

    /// Advance by a wall-clock delta and return the new position.
    pub fn advance(&mut self, dt_secs: f64) -> f64 {
        self.position_secs += dt_secs * (self.tempo / REFERENCE_BPM);
        self.position_secs
    }

    /// 0-based measure index at the current position, derived from the
    /// current tempo.
    pub fn current_measure(&self) -> usize {
        let beats = self.position_secs * (self.tempo / 60.0);
        (beats / BEATS_PER_MEASURE).floor() as usize
    }
}

/// Total composition length in seconds.
///
/// Intentionally a separate formula from the accumulator in
/// [`TempoClock::advance`]; the two scales agree only at 120 BPM and the
/// loop trigger depends on comparing them as-is.
pub fn total_duration_secs(measure_count: usize, tempo: f64) -> f64 {
    measure_count as f64 * BEATS_PER_MEASURE / (tempo / 60.0)
}

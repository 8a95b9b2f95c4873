//! Per-voice and master mixer state with solo-override audibility

use serde::{Deserialize, Serialize};

use crate::instrument::VOICE_COUNT;

pub const DEFAULT_VOLUME: f64 = 0.8;
pub const DEFAULT_REVERB: f64 = 0.3;

/// One mixer strip: levels plus the explicit mute and solo flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MixerChannel {
    /// Volume in 0-1.
    pub volume: f64,
    /// Reverb wet mix in 0-1.
    pub reverb: f64,
    pub muted: bool,
    pub soloed: bool,
}

impl Default for MixerChannel {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            reverb: DEFAULT_REVERB,
            muted: false,
            soloed: false,
        }
    }
}

/// Eight voice channels plus the master bus.
///
/// Audibility is computed, not stored: soloing any voice overrides every
/// explicit mute flag until the last solo is released, at which point
/// each voice falls back to its own flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixerState {
    channels: [MixerChannel; VOICE_COUNT],
    master_volume: f64,
    master_reverb: f64,
}

impl Default for MixerState {
    fn default() -> Self {
        Self {
            channels: [MixerChannel::default(); VOICE_COUNT],
            master_volume: DEFAULT_VOLUME,
            master_reverb: DEFAULT_REVERB,
        }
    }
}

impl MixerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, voice: usize) -> &MixerChannel {
        &self.channels[voice]
    }

    pub fn set_volume(&mut self, voice: usize, volume: f64) {
        self.channels[voice].volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_reverb(&mut self, voice: usize, reverb: f64) {
        self.channels[voice].reverb = reverb.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, voice: usize, muted: bool) {
        self.channels[voice].muted = muted;
    }

    pub fn set_soloed(&mut self, voice: usize, soloed: bool) {
        self.channels[voice].soloed = soloed;
    }

    pub fn master_volume(&self) -> f64 {
        self.master_volume
    }

    pub fn master_reverb(&self) -> f64 {
        self.master_reverb
    }

    pub fn set_master_volume(&mut self, volume: f64) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_master_reverb(&mut self, reverb: f64) {
        self.master_reverb = reverb.clamp(0.0, 1.0);
    }

    pub fn any_soloed(&self) -> bool {
        self.channels.iter().any(|channel| channel.soloed)
    }

    /// Computed audibility: with any solo active, every non-soloed voice
    /// is muted regardless of its explicit flag.
    pub fn effective_mute(&self, voice: usize) -> bool {
        if self.any_soloed() {
            !self.channels[voice].soloed
        } else {
            self.channels[voice].muted
        }
    }

    /// Volume a sink should apply for a voice: 0 while effectively muted.
    pub fn effective_volume(&self, voice: usize) -> f64 {
        if self.effective_mute(voice) {
            0.0
        } else {
            self.channels[voice].volume
        }
    }

    /// Final conceptual gain: master x voice x mute gate. The exact
    /// mixing curve beyond this ordering is a sink concern.
    pub fn effective_gain(&self, voice: usize) -> f64 {
        self.master_volume * self.effective_volume(voice)
    }
}

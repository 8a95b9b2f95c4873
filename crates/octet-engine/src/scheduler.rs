//! Real-time playback scheduling over a polling tick loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, info};

use octet_core::clock::{self, TempoClock};
use octet_core::composition::Composition;
use octet_core::instrument::VOICE_COUNT;
use octet_core::mixer::MixerState;
use octet_core::resolver::{self, NoteEvent};
use octet_core::section::{PlaybackScope, scope_bounds};

use crate::sink::AudioSink;

/// Poll interval of the tick driver thread.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Transport state machine. Paused is only reachable from Playing;
/// Stopped always means position zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Copyable snapshot of playback state for control surfaces.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackSnapshot {
    pub state: TransportState,
    pub position_secs: f64,
    pub total_duration_secs: f64,
    pub current_measure: usize,
    pub looping: bool,
    pub scope: PlaybackScope,
    pub tempo: f64,
}

/// Drives note activation against a polled clock and pushes triggers to
/// an [`AudioSink`].
///
/// One scheduler owns one logical tick timeline: wrap it in an
/// `Arc<Mutex<_>>` to share it between a [`SchedulerDriver`] and control
/// surfaces, which serialise on the same lock.
pub struct PlaybackScheduler {
    sink: Box<dyn AudioSink>,
    composition: Option<Composition>,
    /// Resolved note events per voice, baked at load-time tempo.
    voices: [Vec<NoteEvent>; VOICE_COUNT],
    clock: TempoClock,
    mixer: MixerState,
    state: TransportState,
    total_duration: f64,
    current_measure: usize,
    looping: bool,
    scope: PlaybackScope,
    measure_tx: Option<Sender<usize>>,
}

impl PlaybackScheduler {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            composition: None,
            voices: std::array::from_fn(|_| Vec::new()),
            clock: TempoClock::new(120.0),
            mixer: MixerState::new(),
            state: TransportState::Stopped,
            total_duration: 0.0,
            current_measure: 0,
            looping: false,
            scope: PlaybackScope::Full,
            measure_tx: None,
        }
    }

    /// Subscribe to measure-change notifications. Emitted whenever the
    /// derived measure changes during playback, and on stop.
    pub fn subscribe(&mut self) -> Receiver<usize> {
        let (tx, rx) = unbounded();
        self.measure_tx = Some(tx);
        rx
    }

    /// Load a composition, baking note timings at its stated tempo.
    pub fn load_composition(&mut self, composition: Composition) {
        self.clock.set_tempo(composition.tempo);
        self.voices = resolver::resolve_all(&composition);
        self.total_duration =
            clock::total_duration_secs(composition.measures.len(), composition.tempo);
        info!(
            title = %composition.title,
            measures = composition.measures.len(),
            tempo = composition.tempo,
            "composition loaded"
        );
        self.composition = Some(composition);
    }

    /// Begin or resume playback. No-op until a composition is loaded.
    pub fn play(&mut self) {
        if self.composition.is_none() {
            debug!("play ignored: no composition loaded");
            return;
        }
        self.state = TransportState::Playing;
        info!("transport playing");
    }

    /// Pause, retaining position. Every sounding note is forced off so
    /// nothing sustains silently; resuming re-evaluates the windows.
    pub fn pause(&mut self) {
        if self.state != TransportState::Playing {
            return;
        }
        self.state = TransportState::Paused;
        self.silence_active_notes();
        info!("transport paused");
    }

    /// Stop: silence everything, reset position and measure, notify.
    pub fn stop(&mut self) {
        self.silence_active_notes();
        self.state = TransportState::Stopped;
        self.clock.reset();
        self.current_measure = 0;
        self.notify_measure(0);
        info!("transport stopped");
    }

    /// Seek to a scope's start measure and play. The scope's end bound
    /// never clamps playback; only total duration and looping end it.
    pub fn play_scope(&mut self, scope: PlaybackScope) {
        let Some(composition) = &self.composition else {
            return;
        };
        self.scope = scope;
        let (start_measure, _end_measure) = scope_bounds(scope, composition);
        let measure_secs = resolver::measure_duration_secs(self.clock.tempo());
        self.clock.seek(start_measure as f64 * measure_secs);
        self.play();
    }

    /// Change tempo. Applies to the position clock and the duration and
    /// measure derivations from the next tick; note events stay baked at
    /// the tempo they were resolved with.
    pub fn set_tempo(&mut self, tempo: f64) {
        self.clock.set_tempo(tempo);
        if let Some(composition) = &self.composition {
            self.total_duration = clock::total_duration_secs(composition.measures.len(), tempo);
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn mixer(&self) -> &MixerState {
        &self.mixer
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            position_secs: self.clock.position_secs(),
            total_duration_secs: self.total_duration,
            current_measure: self.current_measure,
            looping: self.looping,
            scope: self.scope,
            tempo: self.clock.tempo(),
        }
    }

    pub fn set_voice_volume(&mut self, voice: usize, volume: f64) {
        if voice >= VOICE_COUNT {
            return;
        }
        self.mixer.set_volume(voice, volume);
        self.sink.set_volume(voice, self.mixer.effective_volume(voice));
    }

    pub fn set_voice_reverb(&mut self, voice: usize, reverb: f64) {
        if voice >= VOICE_COUNT {
            return;
        }
        self.mixer.set_reverb(voice, reverb);
        self.sink.set_reverb(voice, self.mixer.channel(voice).reverb);
    }

    pub fn set_voice_muted(&mut self, voice: usize, muted: bool) {
        if voice >= VOICE_COUNT {
            return;
        }
        self.mixer.set_muted(voice, muted);
        self.push_voice_levels();
    }

    /// Toggle solo. Recomputes effective audibility for every voice, not
    /// just the changed one.
    pub fn set_voice_soloed(&mut self, voice: usize, soloed: bool) {
        if voice >= VOICE_COUNT {
            return;
        }
        self.mixer.set_soloed(voice, soloed);
        self.push_voice_levels();
    }

    pub fn set_master_volume(&mut self, volume: f64) {
        self.mixer.set_master_volume(volume);
        self.push_master_levels();
    }

    pub fn set_master_reverb(&mut self, reverb: f64) {
        self.mixer.set_master_reverb(reverb);
        self.push_master_levels();
    }

    /// Advance the scheduler by an elapsed wall-clock interval.
    ///
    /// Called from the driver thread every [`TICK_INTERVAL`]; tests call
    /// it directly with virtual time. No-op outside Playing.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.state != TransportState::Playing {
            return;
        }

        let position = self.clock.advance(elapsed.as_secs_f64());

        let measure = self.clock.current_measure();
        if measure != self.current_measure {
            self.current_measure = measure;
            self.notify_measure(measure);
        }

        self.update_note_windows(position);

        if position >= self.total_duration {
            if self.looping {
                // Any note still inside its window must retrigger on the
                // next pass, so force it off and clear its flag.
                self.silence_active_notes();
                self.clock.reset();
                self.current_measure = 0;
                debug!("loop wrap");
            } else {
                self.stop();
            }
        }
    }

    /// Edge-triggered activation: a note fires once on entering its
    /// window and once on leaving it, idempotent across ticks.
    fn update_note_windows(&mut self, position: f64) {
        for events in &mut self.voices {
            for event in events.iter_mut() {
                let in_window = event.contains(position);
                if in_window && !event.sounding {
                    // A voice muted at onset never sounds this note; the
                    // flag stays clear so nothing needs a note-off later.
                    if !self.mixer.effective_mute(event.voice) {
                        self.sink.note_on(event.voice, event.note, event.velocity);
                        event.sounding = true;
                    }
                } else if !in_window && event.sounding {
                    self.sink.note_off(event.voice, event.note);
                    event.sounding = false;
                }
            }
        }
    }

    fn silence_active_notes(&mut self) {
        for events in &mut self.voices {
            for event in events.iter_mut() {
                if event.sounding {
                    self.sink.note_off(event.voice, event.note);
                    event.sounding = false;
                }
            }
        }
    }

    fn push_voice_levels(&mut self) {
        for voice in 0..VOICE_COUNT {
            self.sink.set_volume(voice, self.mixer.effective_volume(voice));
        }
    }

    fn push_master_levels(&mut self) {
        self.sink
            .set_master(self.mixer.master_volume(), self.mixer.master_reverb());
    }

    fn notify_measure(&mut self, measure: usize) {
        if let Some(tx) = &self.measure_tx {
            if tx.send(measure).is_err() {
                // Subscriber went away; stop sending.
                self.measure_tx = None;
            }
        }
    }
}

/// Handle to the spawned tick driver; the loop ends on `stop` or drop,
/// effective within one tick interval.
pub struct SchedulerDriver {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerDriver {
    /// Spawn a thread that ticks the scheduler every [`TICK_INTERVAL`]
    /// with measured wall-clock deltas.
    pub fn spawn(scheduler: Arc<Mutex<PlaybackScheduler>>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let thread = thread::spawn(move || {
            let mut last = Instant::now();
            while !stop_flag.load(Ordering::Relaxed) {
                thread::sleep(TICK_INTERVAL);
                let now = Instant::now();
                let elapsed = now - last;
                last = now;
                if let Ok(mut scheduler) = scheduler.lock() {
                    scheduler.tick(elapsed);
                }
            }
        });
        Self {
            stop,
            thread: Some(thread),
        }
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SchedulerDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        On(usize, u8, u8),
        Off(usize, u8),
        Volume(usize, f64),
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl AudioSink for RecordingSink {
        fn note_on(&mut self, voice: usize, note: u8, velocity: u8) {
            self.calls.lock().unwrap().push(Call::On(voice, note, velocity));
        }

        fn note_off(&mut self, voice: usize, note: u8) {
            self.calls.lock().unwrap().push(Call::Off(voice, note));
        }

        fn set_volume(&mut self, voice: usize, volume: f64) {
            self.calls.lock().unwrap().push(Call::Volume(voice, volume));
        }

        fn set_reverb(&mut self, _voice: usize, _reverb: f64) {}

        fn set_master(&mut self, _volume: f64, _reverb: f64) {}
    }

    fn scheduler_with_sample() -> (PlaybackScheduler, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink { calls: calls.clone() };
        let mut scheduler = PlaybackScheduler::new(Box::new(sink));
        scheduler.load_composition(octet_core::Composition::sample());
        (scheduler, calls)
    }

    fn tick_to(scheduler: &mut PlaybackScheduler, secs: f64) {
        let step = Duration::from_millis(10);
        let ticks = (secs * 100.0).round() as usize;
        for _ in 0..ticks {
            scheduler.tick(step);
        }
    }

    #[test]
    fn play_without_composition_is_a_no_op() {
        let mut scheduler = PlaybackScheduler::new(Box::new(RecordingSink::default()));
        scheduler.play();
        assert_eq!(scheduler.state(), TransportState::Stopped);
    }

    #[test]
    fn notes_trigger_edge_wise_and_measures_advance() {
        let (mut scheduler, calls) = scheduler_with_sample();
        let updates = scheduler.subscribe();
        scheduler.play();

        // Two and a half measures at 120 BPM (2 s per measure).
        tick_to(&mut scheduler, 5.0);

        assert_eq!(scheduler.snapshot().current_measure, 2);
        let seen: Vec<usize> = updates.try_iter().collect();
        assert_eq!(seen, vec![1, 2]);

        let calls = calls.lock().unwrap();
        // Voice 0 (flute): G2 on/off, Ab2 on/off, C3 on, still sounding.
        let flute: Vec<&Call> = calls
            .iter()
            .filter(|c| matches!(c, Call::On(0, ..) | Call::Off(0, _)))
            .collect();
        assert_eq!(
            flute,
            vec![
                &Call::On(0, 43, 80),
                &Call::Off(0, 43),
                &Call::On(0, 44, 80),
                &Call::Off(0, 44),
                &Call::On(0, 48, 80),
            ]
        );
        // Every voice whose first two windows closed got its note-offs.
        for voice in 0..VOICE_COUNT {
            let offs = calls
                .iter()
                .filter(|c| matches!(c, Call::Off(v, _) if *v == voice))
                .count();
            assert_eq!(offs, 2, "voice {voice}");
        }
    }

    #[test]
    fn no_duplicate_triggers_inside_a_window() {
        let (mut scheduler, calls) = scheduler_with_sample();
        scheduler.play();
        tick_to(&mut scheduler, 1.0);

        let ons = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::On(..)))
            .count();
        assert_eq!(ons, VOICE_COUNT); // one per voice, despite 100 ticks
    }

    #[test]
    fn end_of_composition_stops_and_resets() {
        let (mut scheduler, calls) = scheduler_with_sample();
        let updates = scheduler.subscribe();
        scheduler.play();

        tick_to(&mut scheduler, 8.02);

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.state, TransportState::Stopped);
        assert_eq!(snapshot.position_secs, 0.0);
        assert_eq!(snapshot.current_measure, 0);
        // Stop emits a final measure-0 notification.
        assert_eq!(updates.try_iter().last(), Some(0));
        // Nothing is left sounding.
        let calls = calls.lock().unwrap();
        let ons = calls.iter().filter(|c| matches!(c, Call::On(..))).count();
        let offs = calls.iter().filter(|c| matches!(c, Call::Off(..))).count();
        assert_eq!(ons, offs);
    }

    #[test]
    fn looping_wraps_without_stopping() {
        let (mut scheduler, calls) = scheduler_with_sample();
        scheduler.set_looping(true);
        scheduler.play();

        // Past the 8 s total duration: exactly one wrap.
        tick_to(&mut scheduler, 8.1);

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.state, TransportState::Playing);
        assert!(snapshot.position_secs < 1.0);
        assert_eq!(snapshot.current_measure, 0);

        // The next pass retriggers the first measure's note.
        tick_to(&mut scheduler, 0.5);
        let retriggered = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::On(0, 43, _)))
            .count();
        assert_eq!(retriggered, 2);
    }

    #[test]
    fn pause_silences_and_resume_retriggers() {
        let (mut scheduler, calls) = scheduler_with_sample();
        scheduler.play();
        tick_to(&mut scheduler, 1.0);

        scheduler.pause();
        assert_eq!(scheduler.state(), TransportState::Paused);
        // Position retained.
        assert!((scheduler.snapshot().position_secs - 1.0).abs() < 1e-9);
        {
            let calls = calls.lock().unwrap();
            let ons = calls.iter().filter(|c| matches!(c, Call::On(..))).count();
            let offs = calls.iter().filter(|c| matches!(c, Call::Off(..))).count();
            assert_eq!(ons, offs);
        }

        // Ticking while paused does nothing.
        scheduler.tick(Duration::from_secs(5));
        assert!((scheduler.snapshot().position_secs - 1.0).abs() < 1e-9);

        // Resuming re-enters the same windows.
        scheduler.play();
        tick_to(&mut scheduler, 0.1);
        let retriggers = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::On(0, 43, _)))
            .count();
        assert_eq!(retriggers, 2);
    }

    #[test]
    fn pause_is_only_reachable_from_playing() {
        let (mut scheduler, _calls) = scheduler_with_sample();
        scheduler.pause();
        assert_eq!(scheduler.state(), TransportState::Stopped);
    }

    #[test]
    fn muted_voice_does_not_trigger() {
        let (mut scheduler, calls) = scheduler_with_sample();
        scheduler.set_voice_muted(0, true);
        scheduler.play();
        tick_to(&mut scheduler, 1.0);

        let calls = calls.lock().unwrap();
        assert!(!calls.iter().any(|c| matches!(c, Call::On(0, ..))));
        assert!(calls.iter().any(|c| matches!(c, Call::On(1, ..))));
    }

    #[test]
    fn solo_pushes_effective_volumes_for_all_voices() {
        let (mut scheduler, calls) = scheduler_with_sample();
        scheduler.set_voice_soloed(2, true);

        let calls = calls.lock().unwrap();
        let volumes: Vec<&Call> = calls
            .iter()
            .filter(|c| matches!(c, Call::Volume(..)))
            .collect();
        assert_eq!(volumes.len(), VOICE_COUNT);
        assert_eq!(volumes[2], &Call::Volume(2, 0.8));
        assert_eq!(volumes[0], &Call::Volume(0, 0.0));
    }

    #[test]
    fn play_scope_seeks_to_section_start() {
        let (mut scheduler, _calls) = scheduler_with_sample();
        // Sample has a "B" section at measure 16; 2 s per measure.
        scheduler.play_scope(PlaybackScope::SectionB);
        assert_eq!(scheduler.state(), TransportState::Playing);
        assert_eq!(scheduler.snapshot().position_secs, 32.0);
    }

    #[test]
    fn tempo_change_rescales_position_and_duration_only() {
        let (mut scheduler, _calls) = scheduler_with_sample();
        scheduler.play();
        tick_to(&mut scheduler, 1.0);

        scheduler.set_tempo(240.0);
        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.tempo, 240.0);
        // Duration derivation follows the new tempo immediately.
        assert_eq!(snapshot.total_duration_secs, 4.0);
        // Position itself is not rescaled retroactively.
        assert!((snapshot.position_secs - 1.0).abs() < 1e-9);
    }
}

//! octet-engine: Playback scheduling and service boundaries

pub mod generation;
pub mod scheduler;
pub mod sink;

pub use generation::{GenerationBridge, GenerationError, SampleBridge};
pub use scheduler::{
    PlaybackScheduler, PlaybackSnapshot, SchedulerDriver, TICK_INTERVAL, TransportState,
};
pub use sink::{AudioSink, NullSink};

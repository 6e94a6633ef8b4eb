//! Audio playback: two channels (looping ambient bed, one-shot completion
//! cue) coordinated on top of a pluggable [`Playback`] seam.

mod channel;
mod coordinator;
mod rodio_sink;

pub use channel::{Playback, SilentPlayback};
pub use coordinator::{AudioCoordinator, AMBIENT_VOLUME, COMPLETION_VOLUME, DEFAULT_FADE};
pub use rodio_sink::RodioPlayback;

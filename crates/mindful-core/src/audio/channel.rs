use crate::error::AudioError;

/// A single playable audio handle.
///
/// Implementations are best-effort: `play` may fail (no output device,
/// missing or undecodable file) and callers must degrade to a silent run
/// rather than propagate the failure into the timer path.
pub trait Playback {
    /// Begin or resume playback.
    fn play(&mut self) -> Result<(), AudioError>;

    /// Pause playback, keeping the current position.
    fn pause(&mut self);

    /// Seek back to the start of the asset.
    fn rewind(&mut self);

    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    /// Whether the asset should repeat when it ends.
    fn set_looping(&mut self, looping: bool);

    fn is_looping(&self) -> bool;

    /// True when nothing is audibly playing (paused, stopped, or never
    /// started).
    fn is_paused(&self) -> bool;
}

/// Playback double that records requests without touching any device.
///
/// Used by the test suite and by contexts that need the coordinator's
/// bookkeeping without sound (the detached CLI commands).
#[derive(Debug, Default)]
pub struct SilentPlayback {
    playing: bool,
    looping: bool,
    volume: f32,
    /// Number of successful `play` calls.
    pub play_count: u32,
    pub rewind_count: u32,
    /// Every volume the channel was set to, in order.
    pub volume_trace: Vec<f32>,
    /// When set, the next `play` call fails (autoplay-block simulation).
    pub fail_next_play: bool,
}

impl Playback for SilentPlayback {
    fn play(&mut self) -> Result<(), AudioError> {
        if self.fail_next_play {
            self.fail_next_play = false;
            return Err(AudioError::PlaybackFailed("playback blocked".into()));
        }
        self.playing = true;
        self.play_count += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {
        self.rewind_count += 1;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.volume_trace.push(volume);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn is_paused(&self) -> bool {
        !self.playing
    }
}

impl SilentPlayback {
    /// Simulate a platform silently dropping the loop flag mid-playback.
    pub fn drop_loop_flag(&mut self) {
        self.looping = false;
    }
}

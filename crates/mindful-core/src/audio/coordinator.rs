//! Coordinates the two audio channels of a session.
//!
//! The ambient bed loops while the countdown runs and is the only channel
//! that fades. The completion cue is a gesture-gated one-shot: platforms
//! with autoplay policies refuse unsolicited audio, so the cue stays
//! locked until at least one user action has been reported via
//! [`AudioCoordinator::unlock_completion`].
//!
//! Every operation is best-effort. A failed play request leaves the run
//! functioning silently; the caller may retry on the next user gesture.

use std::time::Duration;

use tracing::{debug, warn};

use super::channel::Playback;

/// Default ambient bed volume.
pub const AMBIENT_VOLUME: f32 = 0.5;
/// Default completion cue volume.
pub const COMPLETION_VOLUME: f32 = 0.7;
/// Default fade-out applied when pausing the ambient bed.
pub const DEFAULT_FADE: Duration = Duration::from_millis(400);

/// Coordinator ticks between loop-flag re-assertions. At one tick per
/// second this matches the original 10 s keep-alive.
const WATCHDOG_PERIOD_TICKS: u32 = 10;
const FADE_STEPS: u32 = 8;

pub struct AudioCoordinator<P: Playback> {
    ambient: P,
    completion: P,
    sound_enabled: bool,
    /// Intended ambient state. Play/stop requests may resolve out of
    /// order on the platform side; decisions are made against this flag,
    /// never against the device.
    ambient_playing: bool,
    watchdog_armed: bool,
    watchdog_ticks: u32,
    unlocked: bool,
}

impl<P: Playback> AudioCoordinator<P> {
    pub fn new(mut ambient: P, mut completion: P, sound_enabled: bool) -> Self {
        ambient.set_volume(AMBIENT_VOLUME);
        completion.set_volume(COMPLETION_VOLUME);
        Self {
            ambient,
            completion,
            sound_enabled,
            ambient_playing: false,
            watchdog_armed: false,
            watchdog_ticks: 0,
            unlocked: false,
        }
    }

    /// Override the default channel volumes, e.g. from configuration.
    pub fn with_volumes(mut self, ambient: f32, completion: f32) -> Self {
        self.ambient.set_volume(ambient.clamp(0.0, 1.0));
        self.completion.set_volume(completion.clamp(0.0, 1.0));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn is_ambient_playing(&self) -> bool {
        self.ambient_playing
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn ambient(&self) -> &P {
        &self.ambient
    }

    pub fn completion(&self) -> &P {
        &self.completion
    }

    #[cfg(test)]
    pub(crate) fn ambient_mut(&mut self) -> &mut P {
        &mut self.ambient
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the ambient loop. No-op when sound is disabled.
    ///
    /// Rewinds only when the channel is not audibly playing, so resuming
    /// an already-running loop does not restart it. Returns whether
    /// playback actually started.
    pub fn play_ambient(&mut self) -> bool {
        if !self.sound_enabled {
            return false;
        }
        if self.ambient.is_paused() {
            self.ambient.rewind();
        }
        self.ambient.set_looping(true);
        match self.ambient.play() {
            Ok(()) => {
                self.ambient_playing = true;
                self.watchdog_armed = true;
                self.watchdog_ticks = 0;
                true
            }
            Err(e) => {
                warn!(error = %e, "ambient playback failed; continuing without sound");
                false
            }
        }
    }

    /// Stop the ambient loop, optionally ramping volume to zero first.
    ///
    /// The ramp is a short blocking linear fade; the channel volume is
    /// restored afterwards so the next play is audible. Always disarms
    /// the loop watchdog.
    pub fn stop_ambient(&mut self, fade: Option<Duration>) {
        self.watchdog_armed = false;
        self.watchdog_ticks = 0;

        if let Some(fade) = fade {
            if self.ambient_playing && !self.ambient.is_paused() {
                let base = self.ambient.volume();
                let step = fade / FADE_STEPS;
                for remaining in (0..FADE_STEPS).rev() {
                    self.ambient
                        .set_volume(base * remaining as f32 / FADE_STEPS as f32);
                    std::thread::sleep(step);
                }
                self.ambient.pause();
                self.ambient.rewind();
                self.ambient.set_volume(base);
                self.ambient_playing = false;
                return;
            }
        }

        self.ambient.pause();
        self.ambient.rewind();
        self.ambient_playing = false;
    }

    /// Record that a user gesture has occurred. Idempotent.
    ///
    /// Autoplay policies refuse audio before a gesture; once unlocked,
    /// the completion cue may play for the rest of the session.
    pub fn unlock_completion(&mut self) {
        if !self.unlocked {
            debug!("completion cue unlocked");
            self.unlocked = true;
        }
    }

    /// Fire the completion cue once. No-op while locked; never fails.
    pub fn play_completion(&mut self) {
        if !self.unlocked {
            debug!("completion cue still locked; skipping");
            return;
        }
        self.completion.rewind();
        if let Err(e) = self.completion.play() {
            warn!(error = %e, "completion cue failed; session ends silently");
        }
    }

    /// Rewind the completion cue so a later completion can replay it.
    pub fn rewind_completion(&mut self) {
        self.completion.pause();
        self.completion.rewind();
    }

    /// Flip the sound preference. Turning it off force-stops the ambient
    /// bed immediately; turning it on while the countdown is running
    /// starts the bed right away. Returns the new preference.
    pub fn toggle_sound(&mut self, timer_running: bool) -> bool {
        self.sound_enabled = !self.sound_enabled;
        if !self.sound_enabled {
            self.stop_ambient(None);
        } else if timer_running {
            self.play_ambient();
        }
        self.sound_enabled
    }

    /// Advance the loop watchdog by one second.
    ///
    /// Some platform audio implementations drop the loop flag over long
    /// playback; while the bed is meant to be looping, the flag is
    /// re-asserted periodically instead of trusted once.
    pub fn tick(&mut self) {
        if !self.watchdog_armed {
            return;
        }
        self.watchdog_ticks += 1;
        if self.watchdog_ticks >= WATCHDOG_PERIOD_TICKS {
            self.watchdog_ticks = 0;
            if !self.ambient.is_looping() {
                debug!("re-asserting ambient loop flag");
                self.ambient.set_looping(true);
            }
        }
    }

    /// Stop both channels immediately. Called on every exit path so no
    /// audio outlives the session.
    pub fn halt(&mut self) {
        self.stop_ambient(None);
        self.completion.pause();
        self.completion.rewind();
    }
}

impl<P: Playback> Drop for AudioCoordinator<P> {
    fn drop(&mut self) {
        self.halt();
    }
}

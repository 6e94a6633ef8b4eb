//! Session controller: funnels user intents through the countdown engine
//! and mirrors every transition into the audio coordinator.
//!
//! Collaborators (session recording, preferences, stats) sit behind small
//! traits. Recording is fire-and-forget: a sink failure is logged and the
//! run continues.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audio::{AudioCoordinator, Playback, DEFAULT_FADE};
use crate::error::CoreError;
use crate::events::Event;
use crate::timer::{CountdownEngine, TimerState};

/// Per-user preferences, as stored by the preferences collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Seconds of stillness before the countdown starts.
    pub preparation_secs: u32,
    pub default_duration_secs: u32,
    pub end_sound_id: Option<i64>,
    pub background_image: String,
    pub daily_goal_secs: u32,
    pub weekly_goal_secs: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            preparation_secs: 10,
            default_duration_secs: 600,
            end_sound_id: None,
            background_image: "default".into(),
            daily_goal_secs: 600,
            weekly_goal_secs: 1800,
        }
    }
}

/// Aggregate numbers consumed by a display surface.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub total_minutes: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Where finished and abandoned sessions are reported.
pub trait SessionSink {
    fn record_session(&mut self, duration_min: u32, completed: bool) -> Result<(), CoreError>;
}

pub trait PreferencesSource {
    fn preferences(&self) -> Result<Preferences, CoreError>;
}

pub trait StatsSource {
    fn stats(&self) -> Result<SessionStats, CoreError>;
}

/// Don't record runs abandoned before this much has elapsed; fidgeting
/// with the controls should not produce session rows.
const MIN_RECORDED_SECS: u32 = 60;

/// Owns the engine, the audio coordinator and the recording sink, and
/// keeps the three consistent across every transition.
pub struct SessionController<P: Playback, S: SessionSink> {
    engine: CountdownEngine,
    audio: AudioCoordinator<P>,
    sink: S,
    fade: Option<Duration>,
}

impl<P: Playback, S: SessionSink> SessionController<P, S> {
    pub fn new(engine: CountdownEngine, audio: AudioCoordinator<P>, sink: S) -> Self {
        Self {
            engine,
            audio,
            sink,
            fade: Some(DEFAULT_FADE),
        }
    }

    /// Override the pause fade. `None` disables fading entirely.
    pub fn with_fade(mut self, fade: Option<Duration>) -> Self {
        self.fade = fade;
        self
    }

    pub fn engine(&self) -> &CountdownEngine {
        &self.engine
    }

    pub fn audio(&self) -> &AudioCoordinator<P> {
        &self.audio
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    /// Tear the controller apart, e.g. to persist the engine afterwards.
    pub fn into_parts(self) -> (CountdownEngine, AudioCoordinator<P>, S) {
        (self.engine, self.audio, self.sink)
    }

    // ── User intents ─────────────────────────────────────────────────

    /// Start or pause. Every toggle is a user gesture, so it also
    /// unlocks the completion cue.
    pub fn toggle(&mut self) -> Event {
        self.audio.unlock_completion();
        let event = self.engine.toggle();
        match &event {
            Event::TimerStarted { .. } => {
                // A start after completion also rewinds the cue so the
                // next completion can replay it.
                self.audio.rewind_completion();
                self.audio.play_ambient();
            }
            Event::TimerPaused { .. } => {
                self.audio.stop_ambient(self.fade);
            }
            _ => {}
        }
        event
    }

    /// Deliver one second of countdown and keep the audio in step.
    pub fn tick(&mut self) -> Option<Event> {
        let event = self.engine.tick();
        if let Some(Event::TimerCompleted { duration_min, .. }) = &event {
            let duration_min = *duration_min;
            self.audio.stop_ambient(None);
            self.audio.play_completion();
            self.record(duration_min, true);
        }
        self.audio.tick();
        event
    }

    /// Catch up on wall time for detached use, mirroring a completion
    /// into the coordinator and the sink exactly like `tick()` would.
    pub fn sync_to_clock(&mut self) -> Option<Event> {
        let event = self.engine.sync_to_clock();
        if let Some(Event::TimerCompleted { duration_min, .. }) = &event {
            let duration_min = *duration_min;
            self.audio.stop_ambient(None);
            self.audio.play_completion();
            self.record(duration_min, true);
        }
        event
    }

    pub fn set_duration_min(&mut self, minutes: u32) -> Event {
        let event = self.engine.set_duration_min(minutes);
        self.audio.stop_ambient(None);
        event
    }

    pub fn reset(&mut self) -> Event {
        self.record_if_abandoned();
        let event = self.engine.reset();
        self.audio.stop_ambient(None);
        self.audio.rewind_completion();
        event
    }

    pub fn toggle_sound(&mut self) -> Event {
        let enabled = self.audio.toggle_sound(self.engine.is_running());
        Event::SoundToggled {
            enabled,
            at: chrono::Utc::now(),
        }
    }

    /// Exit path: record an abandoned run and silence everything. Must be
    /// called before the controller is dropped on interactive exits.
    pub fn finish(&mut self) {
        self.record_if_abandoned();
        self.audio.halt();
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Recording policy: natural completions are recorded by `tick()`
    /// with `completed = true`; a run abandoned mid-way (reset or exit)
    /// is recorded with `completed = false` once at least a minute has
    /// elapsed, using the elapsed minutes as the duration.
    fn record_if_abandoned(&mut self) {
        let mid_run = matches!(
            self.engine.state(),
            TimerState::Running | TimerState::Paused
        );
        let elapsed = self.engine.elapsed_secs();
        if mid_run && elapsed >= MIN_RECORDED_SECS {
            self.record(elapsed / 60, false);
        }
    }

    fn record(&mut self, duration_min: u32, completed: bool) {
        if let Err(e) = self.sink.record_session(duration_min, completed) {
            warn!(error = %e, "failed to record session");
        }
    }
}

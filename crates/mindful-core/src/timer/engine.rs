//! Countdown engine implementation.
//!
//! The engine is a pure state machine. It does not use internal threads -
//! the caller invokes `tick()` once per elapsed second, or `sync_to_clock()`
//! to catch up after the process was away.
//!
//! ## State Transitions
//!
//! ```text
//! Idle/Paused/Completed -> Running  (toggle)
//! Running -> Paused                 (toggle)
//! Running -> Completed              (tick reaches zero)
//! any -> Idle                       (reset, set_duration_min)
//! ```
//!
//! The engine owns the single authoritative remaining-time value; the
//! presentation layer only reads snapshots from it.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Shortest selectable session, in minutes.
pub const MIN_DURATION_MIN: u32 = 1;
/// Longest selectable session, in minutes.
pub const MAX_DURATION_MIN: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// The countdown reached zero on its own. Re-enterable: a toggle from
    /// here restores the full duration and starts again.
    Completed,
}

/// Core countdown engine.
///
/// Serializable so the CLI can persist it between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownEngine {
    duration_min: u32,
    remaining_secs: u32,
    state: TimerState,
    /// Timestamp (ms since epoch) of the last delivered tick while running.
    /// `sync_to_clock()` converts wall time since then into whole ticks,
    /// keeping the sub-second remainder so detached use does not drift.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

impl CountdownEngine {
    /// Create an idle engine. Out-of-range durations are clamped to
    /// [`MIN_DURATION_MIN`]..=[`MAX_DURATION_MIN`].
    pub fn new(duration_min: u32) -> Self {
        let duration_min = duration_min.clamp(MIN_DURATION_MIN, MAX_DURATION_MIN);
        Self {
            duration_min,
            remaining_secs: duration_min * 60,
            state: TimerState::Idle,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration_min(&self) -> u32 {
        self.duration_min
    }

    pub fn total_secs(&self) -> u32 {
        self.duration_min * 60
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn has_completed(&self) -> bool {
        self.state == TimerState::Completed
    }

    /// Seconds elapsed in the current run.
    pub fn elapsed_secs(&self) -> u32 {
        self.total_secs() - self.remaining_secs
    }

    /// 0.0 .. 1.0 progress through the session.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Select a new duration, clamped to the valid range.
    ///
    /// Always lands in `Idle` with the full new duration remaining. A
    /// change mid-run stops the run; there is no silent continuation
    /// toward a different target.
    pub fn set_duration_min(&mut self, minutes: u32) -> Event {
        let minutes = minutes.clamp(MIN_DURATION_MIN, MAX_DURATION_MIN);
        self.duration_min = minutes;
        self.remaining_secs = minutes * 60;
        self.state = TimerState::Idle;
        self.last_tick_epoch_ms = None;
        Event::DurationChanged {
            minutes,
            at: Utc::now(),
        }
    }

    /// The single start/pause control.
    ///
    /// Starting from `Completed` (or any state with nothing remaining)
    /// first restores the full duration, so a finished session can be
    /// replayed without an explicit reset.
    pub fn toggle(&mut self) -> Event {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                self.last_tick_epoch_ms = None;
                Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                }
            }
            TimerState::Idle | TimerState::Paused | TimerState::Completed => {
                if self.remaining_secs == 0 {
                    self.remaining_secs = self.total_secs();
                }
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now_ms());
                Event::TimerStarted {
                    duration_secs: self.total_secs(),
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                }
            }
        }
    }

    /// Deliver one second of countdown. No-op unless running.
    ///
    /// Returns `Some(Event::TimerCompleted)` when the countdown reaches
    /// zero; the engine is then in `Completed` and stays there until the
    /// user acts.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = TimerState::Completed;
            self.last_tick_epoch_ms = None;
            return Some(Event::TimerCompleted {
                duration_min: self.duration_min,
                at: Utc::now(),
            });
        }
        None
    }

    /// Restore the full duration and return to `Idle`.
    pub fn reset(&mut self) -> Event {
        self.remaining_secs = self.total_secs();
        self.state = TimerState::Idle;
        self.last_tick_epoch_ms = None;
        Event::TimerReset { at: Utc::now() }
    }

    /// Convert wall time elapsed since the last delivered tick into whole
    /// ticks. Used by the detached CLI commands, where no 1 Hz loop runs.
    ///
    /// Returns the completion event if the catch-up crossed zero.
    pub fn sync_to_clock(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        let last = self.last_tick_epoch_ms?;
        let now = now_ms();
        let due = now.saturating_sub(last) / 1000;
        for _ in 0..due {
            if let Some(event) = self.tick() {
                return Some(event);
            }
        }
        // Keep the sub-second remainder by advancing in whole seconds.
        self.last_tick_epoch_ms = Some(last + due * 1000);
        None
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_cycles_running_and_paused() {
        let mut engine = CountdownEngine::new(10);
        assert_eq!(engine.state(), TimerState::Idle);

        engine.toggle();
        assert_eq!(engine.state(), TimerState::Running);

        engine.toggle();
        assert_eq!(engine.state(), TimerState::Paused);

        engine.toggle();
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn tick_counts_down_to_completed() {
        let mut engine = CountdownEngine::new(1);
        engine.toggle();
        for _ in 0..59 {
            assert!(engine.tick().is_none());
        }
        let event = engine.tick();
        assert!(matches!(event, Some(Event::TimerCompleted { .. })));
        assert_eq!(engine.remaining_secs(), 0);
        assert_eq!(engine.state(), TimerState::Completed);
        assert!(!engine.is_running());
    }

    #[test]
    fn tick_is_noop_when_not_running() {
        let mut engine = CountdownEngine::new(5);
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 300);
    }

    #[test]
    fn pause_preserves_remaining_exactly() {
        let mut engine = CountdownEngine::new(10);
        engine.toggle();
        for _ in 0..100 {
            engine.tick();
        }
        engine.toggle();
        assert_eq!(engine.remaining_secs(), 500);
        engine.toggle();
        assert_eq!(engine.remaining_secs(), 500);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 499);
    }

    #[test]
    fn duration_is_clamped_at_both_ends() {
        let mut engine = CountdownEngine::new(10);
        engine.set_duration_min(0);
        assert_eq!(engine.duration_min(), 1);
        engine.set_duration_min(500);
        assert_eq!(engine.duration_min(), 180);
        assert_eq!(engine.remaining_secs(), 180 * 60);
    }

    #[test]
    fn duration_change_stops_a_running_countdown() {
        let mut engine = CountdownEngine::new(10);
        engine.toggle();
        engine.tick();
        engine.set_duration_min(5);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 300);
    }

    #[test]
    fn completed_session_replays_from_full_duration() {
        let mut engine = CountdownEngine::new(1);
        engine.toggle();
        for _ in 0..60 {
            engine.tick();
        }
        assert!(engine.has_completed());

        let event = engine.toggle();
        assert!(matches!(event, Event::TimerStarted { remaining_secs: 60, .. }));
        assert_eq!(engine.remaining_secs(), 60);
        assert!(engine.is_running());
    }

    #[test]
    fn reset_clears_completed_and_restores_duration() {
        let mut engine = CountdownEngine::new(1);
        engine.toggle();
        for _ in 0..60 {
            engine.tick();
        }
        assert!(engine.has_completed());

        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(!engine.has_completed());
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn progress_spans_zero_to_one() {
        let mut engine = CountdownEngine::new(1);
        assert_eq!(engine.progress(), 0.0);
        engine.toggle();
        for _ in 0..30 {
            engine.tick();
        }
        assert!((engine.progress() - 0.5).abs() < 1e-9);
        for _ in 0..30 {
            engine.tick();
        }
        assert_eq!(engine.progress(), 1.0);
    }

    #[test]
    fn engine_survives_serde_round_trip() {
        let mut engine = CountdownEngine::new(15);
        engine.toggle();
        engine.tick();
        let json = serde_json::to_string(&engine).unwrap();
        let restored: CountdownEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), TimerState::Running);
        assert_eq!(restored.remaining_secs(), engine.remaining_secs());
    }

    #[test]
    fn sync_to_clock_noop_when_idle() {
        let mut engine = CountdownEngine::new(5);
        assert!(engine.sync_to_clock().is_none());
        assert_eq!(engine.remaining_secs(), 300);
    }

    /// Move the persisted tick timestamp into the past, as if the process
    /// had been away that long.
    fn rewind_last_tick(engine: &CountdownEngine, ms_back: u64) -> CountdownEngine {
        let mut json = serde_json::to_value(engine).unwrap();
        let last = json["last_tick_epoch_ms"].as_u64().unwrap();
        json["last_tick_epoch_ms"] = serde_json::Value::from(last - ms_back);
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn sync_to_clock_converts_absence_into_whole_ticks() {
        let mut engine = CountdownEngine::new(5);
        engine.toggle();
        let mut engine = rewind_last_tick(&engine, 90_500);

        assert!(engine.sync_to_clock().is_none());
        assert_eq!(engine.remaining_secs(), 210);
        assert!(engine.is_running());
    }

    #[test]
    fn sync_to_clock_banks_the_subsecond_remainder() {
        let mut engine = CountdownEngine::new(5);
        engine.toggle();
        let mut engine = rewind_last_tick(&engine, 90_500);

        engine.sync_to_clock();
        assert_eq!(engine.remaining_secs(), 210);

        // The half second not yet delivered stays on the timestamp: an
        // immediate second sync owes nothing.
        engine.sync_to_clock();
        assert_eq!(engine.remaining_secs(), 210);

        // But it still counts: half a second of persisted deficit plus a
        // full simulated second makes exactly one more tick due.
        let mut engine = rewind_last_tick(&engine, 1_000);
        engine.sync_to_clock();
        assert_eq!(engine.remaining_secs(), 209);
    }

    #[test]
    fn sync_to_clock_completes_when_away_past_zero() {
        let mut engine = CountdownEngine::new(1);
        engine.toggle();
        let mut engine = rewind_last_tick(&engine, 120_000);

        let event = engine.sync_to_clock();
        assert!(matches!(event, Some(Event::TimerCompleted { .. })));
        assert_eq!(engine.remaining_secs(), 0);
        assert_eq!(engine.state(), TimerState::Completed);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every state change in the timer produces an Event.
/// The presentation layer renders snapshots; the session controller uses
/// transition events to drive the audio coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration_secs: u32,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero on its own.
    TimerCompleted {
        duration_min: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// Duration selection. Emitted after clamping to the valid range.
    DurationChanged {
        minutes: u32,
        at: DateTime<Utc>,
    },
    SoundToggled {
        enabled: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        remaining_secs: u32,
        total_secs: u32,
        /// 0.0 .. 1.0 progress through the session.
        progress: f64,
        at: DateTime<Utc>,
    },
}

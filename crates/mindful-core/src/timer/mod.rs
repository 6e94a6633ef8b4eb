mod engine;

pub use engine::{CountdownEngine, TimerState, MAX_DURATION_MIN, MIN_DURATION_MIN};

/// Format a second count as `MM:SS` for display.
pub fn format_mm_ss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

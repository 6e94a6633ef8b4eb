//! End-to-end session scenarios: controller, coordinator, and sink
//! working together through full runs.

use std::time::Duration;

use mindful_core::{
    AudioCoordinator, CountdownEngine, CoreError, SessionController, SessionSink, SilentPlayback,
    TimerState,
};

#[derive(Default)]
struct RecordingSink {
    recorded: Vec<(u32, bool)>,
}

impl SessionSink for RecordingSink {
    fn record_session(&mut self, duration_min: u32, completed: bool) -> Result<(), CoreError> {
        self.recorded.push((duration_min, completed));
        Ok(())
    }
}

struct FailingSink;

impl SessionSink for FailingSink {
    fn record_session(&mut self, _duration_min: u32, _completed: bool) -> Result<(), CoreError> {
        Err(CoreError::Custom("sink offline".into()))
    }
}

fn controller(
    minutes: u32,
    fade: Option<Duration>,
) -> SessionController<SilentPlayback, RecordingSink> {
    let audio = AudioCoordinator::new(
        SilentPlayback::default(),
        SilentPlayback::default(),
        true,
    );
    SessionController::new(CountdownEngine::new(minutes), audio, RecordingSink::default())
        .with_fade(fade)
}

#[test]
fn five_minute_run_to_completion() {
    let mut session = controller(5, None);
    session.toggle();
    assert!(session.audio().is_ambient_playing());

    for _ in 0..300 {
        session.tick();
    }

    assert_eq!(session.engine().remaining_secs(), 0);
    assert!(session.engine().has_completed());
    assert!(!session.audio().is_ambient_playing());
    assert_eq!(session.audio().completion().play_count, 1);

    let (_, _, sink) = session.into_parts();
    assert_eq!(sink.recorded, vec![(5, true)]);
}

#[test]
fn ten_minute_run_paused_after_100_ticks() {
    let mut session = controller(10, Some(Duration::from_millis(8)));
    session.toggle();
    for _ in 0..100 {
        session.tick();
    }
    session.toggle();

    assert_eq!(session.engine().remaining_secs(), 500);
    assert!(!session.engine().is_running());
    assert!(!session.audio().is_ambient_playing());
    // The pause faded the bed out: a ramp ending at zero was written.
    assert!(session
        .audio()
        .ambient()
        .volume_trace
        .iter()
        .any(|v| *v == 0.0));
}

#[test]
fn replay_after_completion_counts_full_duration_again() {
    let mut session = controller(1, None);
    session.toggle();
    for _ in 0..60 {
        session.tick();
    }
    assert!(session.engine().has_completed());

    // Start again without a reset: full duration, second completion cue.
    session.toggle();
    assert!(session.engine().is_running());
    assert_eq!(session.engine().remaining_secs(), 60);

    for _ in 0..60 {
        session.tick();
    }
    assert_eq!(session.audio().completion().play_count, 2);

    let (_, _, sink) = session.into_parts();
    assert_eq!(sink.recorded, vec![(1, true), (1, true)]);
}

#[test]
fn reset_during_completed_state_restores_everything() {
    let mut session = controller(2, None);
    session.toggle();
    for _ in 0..120 {
        session.tick();
    }
    session.reset();

    assert_eq!(session.engine().state(), TimerState::Idle);
    assert!(!session.engine().has_completed());
    assert_eq!(session.engine().remaining_secs(), 120);
    // Cue rewound so the next completion replays it.
    assert!(session.audio().completion().rewind_count >= 2);
}

#[test]
fn sound_toggle_mid_run_keeps_countdown_intact() {
    let mut session = controller(10, None);
    session.toggle();
    for _ in 0..50 {
        session.tick();
    }

    session.toggle_sound();
    assert!(!session.audio().is_ambient_playing());
    for _ in 0..50 {
        session.tick();
    }
    assert_eq!(session.engine().remaining_secs(), 500);

    session.toggle_sound();
    assert!(session.audio().is_ambient_playing());
    assert_eq!(session.engine().remaining_secs(), 500);
    assert!(session.engine().is_running());
}

#[test]
fn exactly_one_completion_attempt_per_run() {
    let mut session = controller(1, None);
    session.toggle();
    for _ in 0..90 {
        session.tick();
    }
    // Extra ticks past completion must not re-fire the cue.
    assert_eq!(session.audio().completion().play_count, 1);
}

#[test]
fn failing_sink_never_breaks_the_run() {
    let audio = AudioCoordinator::new(
        SilentPlayback::default(),
        SilentPlayback::default(),
        true,
    );
    let mut session =
        SessionController::new(CountdownEngine::new(1), audio, FailingSink).with_fade(None);
    session.toggle();
    for _ in 0..60 {
        session.tick();
    }
    assert!(session.engine().has_completed());
    assert_eq!(session.audio().completion().play_count, 1);
}

#[test]
fn blocked_ambient_playback_leaves_run_silent_but_alive() {
    let mut ambient = SilentPlayback::default();
    ambient.fail_next_play = true;
    let audio = AudioCoordinator::new(ambient, SilentPlayback::default(), true);
    let mut session = SessionController::new(
        CountdownEngine::new(1),
        audio,
        RecordingSink::default(),
    )
    .with_fade(None);

    session.toggle();
    assert!(!session.audio().is_ambient_playing());
    assert!(session.engine().is_running());

    // The next gesture retries and succeeds.
    session.toggle();
    session.toggle();
    assert!(session.audio().is_ambient_playing());
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Subcommand;
use tracing::debug;

use mindful_core::{
    AudioCoordinator, Config, CountdownEngine, Database, Event, PreferencesSource, RodioPlayback,
    SessionController, SilentPlayback,
};

use crate::render::{completion_message, DisplayMode, SessionRenderer};

const ENGINE_KEY: &str = "countdown_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Meditate now: run the countdown in the foreground with sound
    Run {
        /// Session length in minutes (the usual picks are 5, 10, 15, 30)
        #[arg(long)]
        minutes: Option<u32>,
        /// Full-screen focus display instead of the inline bar
        #[arg(long)]
        focus: bool,
        /// Run silently regardless of the sound preference
        #[arg(long)]
        no_sound: bool,
    },
    /// Start or resume the detached countdown
    Start,
    /// Pause the detached countdown
    Pause,
    /// Reset to idle state
    Reset,
    /// Select a new duration in minutes (clamped to 1..=180)
    Set { minutes: u32 },
    /// Print current timer state as JSON
    Status,
}

fn load_engine(db: &Database, default_minutes: u32) -> CountdownEngine {
    if let Ok(Some(json)) = db.kv_get(ENGINE_KEY) {
        if let Ok(engine) = serde_json::from_str::<CountdownEngine>(&json) {
            return engine;
        }
        debug!("stored engine state unreadable, starting fresh");
    }
    CountdownEngine::new(default_minutes)
}

fn save_engine(db: &Database, engine: &CountdownEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            minutes,
            focus,
            no_sound,
        } => run_interactive(minutes, focus, no_sound),
        detached => run_detached(detached),
    }
}

/// Detached control: the engine lives in the kv store and wall time is
/// converted into ticks on every invocation. No audio is attached; sound
/// belongs to the foreground `run` mode.
///
/// The interactive `run` mode never reads or writes this state, so a
/// detached countdown keeps accruing wall time through an interactive
/// session and is still where it should be afterwards.
fn run_detached(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let default_minutes = (db.preferences()?.default_duration_secs / 60).max(1);
    let engine = load_engine(&db, default_minutes);

    let audio = AudioCoordinator::new(SilentPlayback::default(), SilentPlayback::default(), false);
    let mut controller = SessionController::new(engine, audio, db).with_fade(None);

    if let Some(event) = controller.sync_to_clock() {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }

    match action {
        TimerAction::Start => {
            if !controller.engine().is_running() {
                let event = controller.toggle();
                println!("{}", serde_json::to_string_pretty(&event)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
            }
        }
        TimerAction::Pause => {
            if controller.engine().is_running() {
                let event = controller.toggle();
                println!("{}", serde_json::to_string_pretty(&event)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
            }
        }
        TimerAction::Reset => {
            let event = controller.reset();
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Set { minutes } => {
            let event = controller.set_duration_min(minutes);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
        }
        TimerAction::Run { .. } => unreachable!("handled by run()"),
    }

    let (engine, _, db) = controller.into_parts();
    save_engine(&db, &engine)?;
    Ok(())
}

/// Foreground session: 1 Hz countdown, ambient bed, completion cue, and
/// line-based controls (Enter pause/resume, `s` sound, `q` end).
fn run_interactive(
    minutes: Option<u32>,
    focus: bool,
    no_sound: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let prefs = db.preferences()?;
    let minutes = minutes.unwrap_or((prefs.default_duration_secs / 60).max(1));

    // An end-cue chosen in preferences wins over the configured path,
    // falling back when the catalog id no longer resolves.
    let completion_path = match prefs.end_sound_id {
        Some(id) => db
            .sound_path(id)?
            .unwrap_or_else(|| config.sound.completion_path.clone()),
        None => config.sound.completion_path.clone(),
    };

    let sound_enabled = config.sound.enabled && !no_sound;
    let audio = AudioCoordinator::new(
        RodioPlayback::new(&config.sound.ambient_path),
        RodioPlayback::new(&completion_path),
        sound_enabled,
    )
    .with_volumes(config.sound.ambient_volume, config.sound.completion_volume);

    let fade = match config.sound.fade_ms {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };
    let mut controller =
        SessionController::new(CountdownEngine::new(minutes), audio, db).with_fade(fade);

    let mode = if focus || config.ui.focus_default {
        DisplayMode::Focus
    } else {
        DisplayMode::Inline
    };
    let renderer = SessionRenderer::new(mode, controller.engine().total_secs());

    // Ctrl-C must stop ticks and audio before the handles are released.
    let interrupted = Arc::new(AtomicBool::new(false));
    let latch = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        latch.store(true, Ordering::SeqCst);
    })?;

    // Line-buffered control channel; no raw terminal mode needed.
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            line.clear();
            if std::io::stdin().read_line(&mut line).is_err() {
                break;
            }
            if tx.send(line.trim().to_string()).is_err() {
                break;
            }
        }
    });

    if mode == DisplayMode::Inline {
        println!("{} minute meditation - Enter: pause/resume, s: sound, q: end", minutes);
    }

    controller.toggle();
    renderer.update(controller.engine(), controller.audio().sound_enabled());

    let mut next_tick = Instant::now() + Duration::from_secs(1);
    let mut completed = false;

    while !interrupted.load(Ordering::SeqCst) {
        while let Ok(cmd) = rx.try_recv() {
            match cmd.as_str() {
                "" | "p" => {
                    let event = controller.toggle();
                    if matches!(event, Event::TimerStarted { .. }) {
                        next_tick = Instant::now() + Duration::from_secs(1);
                    }
                }
                "s" => {
                    controller.toggle_sound();
                }
                "q" => interrupted.store(true, Ordering::SeqCst),
                _ => {}
            }
            renderer.update(controller.engine(), controller.audio().sound_enabled());
        }
        if interrupted.load(Ordering::SeqCst) {
            break;
        }

        if controller.engine().is_running() && Instant::now() >= next_tick {
            let event = controller.tick();
            // Advance by whole seconds off the monotonic clock; if the
            // loop fell behind, the next pass ticks again immediately.
            next_tick += Duration::from_secs(1);
            renderer.update(controller.engine(), controller.audio().sound_enabled());
            if matches!(event, Some(Event::TimerCompleted { .. })) {
                completed = true;
                break;
            }
        } else {
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    renderer.finish();
    if completed {
        completion_message(config.ui.show_quote);
        // Let the bowl ring out before tearing the stream down.
        std::thread::sleep(Duration::from_secs(3));
    } else {
        println!();
        println!("Session ended.");
    }
    controller.finish();
    Ok(())
}

//! Terminal presentation for the interactive run.
//!
//! One parameterized renderer serves both display modes: a compact
//! progress-bar line, and a cleared-screen "focus" layout that stands in
//! for the original full-screen overlay.

use std::io::Write;

use indicatif::{ProgressBar, ProgressStyle};
use mindful_core::timer::format_mm_ss;
use mindful_core::{CountdownEngine, TimerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Inline,
    Focus,
}

pub struct SessionRenderer {
    mode: DisplayMode,
    bar: Option<ProgressBar>,
}

const FOCUS_BAR_WIDTH: usize = 40;

impl SessionRenderer {
    pub fn new(mode: DisplayMode, total_secs: u32) -> Self {
        let bar = match mode {
            DisplayMode::Inline => {
                let pb = ProgressBar::new(u64::from(total_secs));
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{msg} [{bar:40.cyan/blue}] {percent:>3}%")
                        .unwrap()
                        .progress_chars("##-"),
                );
                Some(pb)
            }
            DisplayMode::Focus => None,
        };
        Self { mode, bar }
    }

    pub fn update(&self, engine: &CountdownEngine, sound_enabled: bool) {
        match self.mode {
            DisplayMode::Inline => {
                if let Some(bar) = &self.bar {
                    bar.set_position(u64::from(engine.elapsed_secs()));
                    bar.set_message(format_mm_ss(engine.remaining_secs()));
                }
            }
            DisplayMode::Focus => draw_focus(engine, sound_enabled),
        }
    }

    /// Remove the progress display before printing the closing message.
    pub fn finish(&self) {
        match self.mode {
            DisplayMode::Inline => {
                if let Some(bar) = &self.bar {
                    bar.finish_and_clear();
                }
            }
            DisplayMode::Focus => {
                print!("\x1b[2J\x1b[H");
                let _ = std::io::stdout().flush();
            }
        }
    }
}

fn draw_focus(engine: &CountdownEngine, sound_enabled: bool) {
    let filled = (engine.progress() * FOCUS_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(FOCUS_BAR_WIDTH);
    let hint = match engine.state() {
        TimerState::Running => "Enter: pause   s: sound   q: end",
        TimerState::Paused => "paused - Enter to resume",
        TimerState::Completed => "session complete",
        TimerState::Idle => "",
    };
    let speaker = if sound_enabled { "" } else { "(muted)" };

    print!("\x1b[2J\x1b[H");
    println!();
    println!();
    println!("          {}   {}", format_mm_ss(engine.remaining_secs()), speaker);
    println!();
    println!(
        "      {}{}",
        "#".repeat(filled),
        "-".repeat(FOCUS_BAR_WIDTH - filled)
    );
    println!();
    println!("      {hint}");
    let _ = std::io::stdout().flush();
}

pub fn completion_message(show_quote: bool) {
    println!("Session Complete");
    println!("Great job maintaining your practice!");
    if show_quote {
        println!();
        println!("\"Breathe in peace, breathe out tension.\"");
    }
}

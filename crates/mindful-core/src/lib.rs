//! # Mindful Core Library
//!
//! Core logic for the Mindful meditation timer. All operations are
//! available through a standalone CLI binary; any richer presentation
//! layer is expected to be a thin shell over this library.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: a pure state machine that the caller ticks
//!   once per second (or catches up via wall clock for detached use)
//! - **Audio Coordinator**: a looping ambient bed and a gesture-gated
//!   completion cue behind a pluggable playback seam
//! - **Session Controller**: keeps engine, audio, and the session
//!   recording collaborator consistent across every transition
//! - **Storage**: SQLite session/preference/sound storage and TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: countdown state machine
//! - [`AudioCoordinator`]: two-channel audio lifecycle
//! - [`SessionController`]: intent funnel over both
//! - [`Database`]: sessions, preferences, sounds, kv store
//! - [`Config`]: sound and display configuration

pub mod audio;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;

pub use audio::{AudioCoordinator, Playback, RodioPlayback, SilentPlayback};
pub use error::{AudioError, ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use session::{
    Preferences, PreferencesSource, SessionController, SessionSink, SessionStats, StatsSource,
};
pub use storage::{Config, Database};
pub use timer::{CountdownEngine, TimerState};

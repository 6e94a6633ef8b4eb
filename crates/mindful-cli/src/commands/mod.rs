pub mod config;
pub mod sound;
pub mod stats;
pub mod timer;

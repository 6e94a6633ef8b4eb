use clap::Subcommand;
use mindful_core::{Config, Database};

#[derive(Subcommand)]
pub enum SoundAction {
    /// List the sound catalog as JSON
    List,
    /// Flip the sound preference on or off
    Toggle,
}

pub fn run(action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SoundAction::List => {
            let db = Database::open()?;
            let sounds = db.sounds()?;
            println!("{}", serde_json::to_string_pretty(&sounds)?);
        }
        SoundAction::Toggle => {
            let mut config = Config::load()?;
            let next = !config.sound.enabled;
            config.set("sound.enabled", if next { "true" } else { "false" })?;
            println!("sound {}", if next { "enabled" } else { "disabled" });
        }
    }
    Ok(())
}

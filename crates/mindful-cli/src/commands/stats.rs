use clap::Subcommand;
use mindful_core::{Database, StatsSource};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Aggregate practice numbers as JSON
    Show,
    /// Number of recorded sessions
    Sessions,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        StatsAction::Show => {
            let stats = db.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Sessions => {
            println!("{}", db.session_count()?);
        }
    }
    Ok(())
}

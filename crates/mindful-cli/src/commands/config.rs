use clap::Subcommand;
use mindful_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a single value by dot-separated key, e.g. `sound.enabled`
    Get { key: String },
    /// Set a value and persist
    Set { key: String, value: String },
    /// Print the whole configuration as TOML
    List,
    /// Print the location of the data directory
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    match action {
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None => {
                eprintln!("unknown key: {key}");
                std::process::exit(1);
            }
        },
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", mindful_core::storage::data_dir()?.display());
        }
    }
    Ok(())
}

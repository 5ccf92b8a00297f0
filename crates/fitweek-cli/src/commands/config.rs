use clap::Subcommand;
use fitweek_core::storage::{data_dir, Config};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", data_dir()?.join("config.toml").display());
        }
    }
    Ok(())
}

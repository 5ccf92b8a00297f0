//! Persistence: SQLite ledgers and TOML configuration.

mod config;
pub mod database;

pub use config::{Config, ReminderConfig};
pub use database::{
    Database, GuildStanding, MemberRanking, TeamRanking, UserRank,
};

use std::path::PathBuf;

/// Returns the data directory, honoring two environment overrides:
///
/// - `FITWEEK_DATA_DIR` points at an explicit directory (tests, containers).
/// - `FITWEEK_ENV=dev` switches to `~/.config/fitweek-dev/` instead of
///   `~/.config/fitweek/`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = if let Ok(explicit) = std::env::var("FITWEEK_DATA_DIR") {
        PathBuf::from(explicit)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("FITWEEK_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("fitweek-dev")
        } else {
            base_dir.join("fitweek")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

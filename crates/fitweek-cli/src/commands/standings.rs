use clap::Subcommand;
use fitweek_core::storage::Database;

#[derive(Subcommand)]
pub enum StandingsAction {
    /// Team leaderboard (average points per member)
    Teams,
    /// Guild standings with per-category totals
    Guilds,
    /// Top individual scorers
    Users {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

pub fn run(action: StandingsAction) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::open()?;

    match action {
        StandingsAction::Teams => {
            let rankings = db.team_rankings()?;
            println!("{}", serde_json::to_string_pretty(&rankings)?);
        }
        StandingsAction::Guilds => {
            let standings = db.guild_standings()?;
            println!("{}", serde_json::to_string_pretty(&standings)?);
        }
        StandingsAction::Users { limit } => {
            let top = db.top_users(limit)?;
            println!("{}", serde_json::to_string_pretty(&top)?);
        }
    }
    Ok(())
}

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fitweek-cli", version, about = "Fitweek competition CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register for the competition
    Register {
        /// Chat identity to register under
        #[arg(long)]
        user: i64,
        /// Display name
        name: String,
        /// Guild to list under in standings
        #[arg(long)]
        guild: Option<String>,
    },
    /// Team management
    Team {
        #[command(subcommand)]
        action: commands::team::TeamAction,
    },
    /// Submit this week's scores interactively
    Score {
        #[arg(long)]
        user: i64,
    },
    /// Your cumulative points
    Summary {
        #[arg(long)]
        user: i64,
    },
    /// Leaderboards
    Standings {
        #[command(subcommand)]
        action: commands::standings::StandingsAction,
    },
    /// Who still needs a weekly reminder
    Remind,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Register { user, name, guild } => commands::register::run(user, name, guild),
        Commands::Team { action } => commands::team::run(action),
        Commands::Score { user } => commands::score::run(user),
        Commands::Summary { user } => commands::summary::run(user),
        Commands::Standings { action } => commands::standings::run(action),
        Commands::Remind => commands::remind::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

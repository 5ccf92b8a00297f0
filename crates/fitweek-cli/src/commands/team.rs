use clap::Subcommand;
use fitweek_core::storage::Database;
use fitweek_core::UserStore;

#[derive(Subcommand)]
pub enum TeamAction {
    /// Create a new team
    Create { name: String },
    /// Join an existing team by name
    Join {
        name: String,
        #[arg(long)]
        user: i64,
    },
    /// Show your team's member rankings
    Members {
        #[arg(long)]
        user: i64,
    },
}

pub fn run(action: TeamAction) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::open()?;

    match action {
        TeamAction::Create { name } => {
            let team = db.create_team(&name)?;
            println!("Team '{}' created ({}).", team.name, team.id);
        }
        TeamAction::Join { name, user } => {
            if db.find_user(user)?.is_none() {
                println!("User not found. Please register first.");
                return Ok(());
            }
            let Some(team) = db.find_team_by_name(&name)? else {
                println!("No team named '{name}'.");
                return Ok(());
            };
            db.join_team(user, team.id)?;
            println!("Joined team '{}'.", team.name);
        }
        TeamAction::Members { user } => {
            let members = db.team_member_rankings(user)?;
            if members.is_empty() {
                println!("You are not in a team yet.");
                return Ok(());
            }
            println!("{}:", members[0].team_name);
            for (place, member) in members.iter().enumerate() {
                println!(
                    "{:>2}. {:<24}{:>5}",
                    place + 1,
                    member.name,
                    member.total_points
                );
            }
        }
    }
    Ok(())
}

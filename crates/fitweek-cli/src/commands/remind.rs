use chrono::Utc;
use fitweek_core::storage::{Config, Database};

pub fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::open()?;
    let config = Config::load_or_default();

    let due = db.users_needing_reminder(&config.submission, Utc::now())?;
    if due.is_empty() {
        println!("Everyone has submitted this week.");
        return Ok(());
    }

    println!("{}", config.reminder.message);
    for user in due {
        println!("{:>12}  {}", user.user_id, user.name);
    }
    Ok(())
}

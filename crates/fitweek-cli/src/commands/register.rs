use fitweek_core::storage::Database;
use fitweek_core::UserStore;

pub fn run(
    user: i64,
    name: String,
    guild: Option<String>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::open()?;

    if db.find_user(user)?.is_some() {
        println!("User {user} is already registered.");
        return Ok(());
    }

    let ledger = db.create_user(user, &name, guild.as_deref())?;
    match &ledger.guild {
        Some(guild) => println!("Registered {} (user {}) in guild {}.", ledger.name, user, guild),
        None => println!("Registered {} (user {}).", ledger.name, user),
    }
    Ok(())
}

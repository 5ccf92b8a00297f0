use fitweek_core::storage::Database;
use fitweek_core::Category;

pub fn run(user: i64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let db = Database::open()?;

    let Some(points) = db.user_summary(user)? else {
        println!("User not found. Please register first.");
        return Ok(());
    };

    println!("Your points so far:");
    for category in Category::ALL {
        println!("{:<26}{:>5}", category.label(), points.get(category));
    }
    println!();
    println!("{:<26}{:>5}", "Total Points:", points.total);
    Ok(())
}

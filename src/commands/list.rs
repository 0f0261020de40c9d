use anyhow::Result;
use owo_colors::OwoColorize;
use planner_core::Store;

pub fn run(store: &Store) -> Result<()> {
    let usernames = store.usernames()?;
    if usernames.is_empty() {
        println!("{}", "No users found".dimmed());
        return Ok(());
    }

    for username in &usernames {
        println!("{}", username.bold());
        let user = store.get_user(username)?;
        for reference in &user.calendar_references {
            println!(
                "  {} {}",
                reference.calendar_id,
                format!("[{}]", reference.permission).dimmed()
            );
        }
    }

    println!();
    println!(
        "{} users, {} calendars in {}",
        usernames.len(),
        store.calendar_ids()?.len(),
        store.root().display()
    );

    Ok(())
}

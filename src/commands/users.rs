use anyhow::Result;
use owo_colors::OwoColorize;
use planner_core::Store;

pub fn add(store: &Store, username: &str, password_hash: &str) -> Result<()> {
    store.add_user(username, password_hash)?;

    println!("{} {}", "Added user".green(), username);
    println!("  Default calendar: {username}/{username}");
    Ok(())
}

pub fn delete(store: &Store, username: &str) -> Result<()> {
    let owned = store
        .get_user(username)?
        .calendar_references
        .iter()
        .filter(|r| r.calendar_id.starts_with(&format!("{username}/")))
        .count();

    store.delete_user(username)?;

    println!("{} {}", "Deleted user".red(), username);
    println!("  Removed {owned} owned calendar(s)");
    Ok(())
}

pub fn show(store: &Store, username: &str) -> Result<()> {
    let user = store.get_user(username)?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::store;

    #[test]
    fn test_add_and_delete_user() {
        let (dir, store) = store();

        add(&store, "alice", "h1").unwrap();
        assert!(store.get_calendar("alice/alice").is_ok());
        show(&store, "alice").unwrap();

        delete(&store, "alice").unwrap();
        assert!(store.get_user("alice").is_err());
        assert!(!dir.path().join("calendars/alice").exists());
    }

    #[test]
    fn test_errors_surface() {
        let (_dir, store) = store();
        add(&store, "alice", "h1").unwrap();

        let err = add(&store, "alice", "h2").unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(delete(&store, "ghost").is_err());
        assert!(show(&store, "ghost").is_err());
    }
}

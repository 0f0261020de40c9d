use anyhow::Result;
use owo_colors::OwoColorize;
use planner_core::Store;

use super::check_calendar_id;

pub fn add(store: &Store, owner: &str, name: &str) -> Result<()> {
    store.add_calendar(owner, name)?;

    println!("{} {owner}/{name}", "Added calendar".green());
    Ok(())
}

pub fn delete(store: &Store, calendar_id: &str) -> Result<()> {
    check_calendar_id(calendar_id)?;
    let shared_with = store.get_calendar(calendar_id)?.grantees();

    store.delete_calendar(calendar_id)?;

    println!("{} {calendar_id}", "Deleted calendar".red());
    if !shared_with.is_empty() {
        println!("  Unshared from: {}", shared_with.join(", "));
    }
    Ok(())
}

pub fn show(store: &Store, calendar_id: &str) -> Result<()> {
    check_calendar_id(calendar_id)?;
    let calendar = store.get_calendar(calendar_id)?;
    println!("{}", serde_json::to_string_pretty(&calendar)?);
    Ok(())
}

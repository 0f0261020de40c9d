use anyhow::Result;
use owo_colors::OwoColorize;
use planner_core::{Permission, ShareLevel, Store};

use super::check_calendar_id;

pub fn share(store: &Store, calendar_id: &str, username: &str, level: ShareLevel) -> Result<()> {
    check_calendar_id(calendar_id)?;
    store.share(calendar_id, username, level)?;

    match level {
        ShareLevel::None => println!("{} {calendar_id} from {username}", "Unshared".yellow()),
        _ => println!("{} {calendar_id} with {username} ({level})", "Shared".green()),
    }
    Ok(())
}

pub fn associate(
    store: &Store,
    username: &str,
    calendar_id: &str,
    permission: Permission,
) -> Result<()> {
    check_calendar_id(calendar_id)?;
    store.associate(username, calendar_id, permission)?;

    println!("{} {username} to {calendar_id} ({permission})", "Linked".green());
    Ok(())
}

pub fn disassociate(store: &Store, username: &str, calendar_id: &str) -> Result<()> {
    check_calendar_id(calendar_id)?;
    store.disassociate(username, calendar_id)?;

    println!("{} {username} from {calendar_id}", "Unlinked".yellow());
    Ok(())
}

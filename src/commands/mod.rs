pub mod calendars;
pub mod config;
pub mod list;
pub mod sharing;
pub mod users;

use anyhow::{Result, anyhow};
use planner_core::Calendar;

/// Reject arguments that cannot be a calendar id before touching the store.
pub fn check_calendar_id(calendar_id: &str) -> Result<()> {
    Calendar::split_id(calendar_id)
        .map(|_| ())
        .ok_or_else(|| anyhow!("'{calendar_id}' is not a calendar id (expected owner/name)"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use planner_core::Store;
    use tempfile::TempDir;

    pub fn store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(dir.path()).unwrap();
        (dir, store)
    }
}

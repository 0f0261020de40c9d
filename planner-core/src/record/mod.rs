//! Record types persisted by the store: logins, users and calendars.

mod calendar;
mod item;

pub use calendar::{Calendar, CalendarPatch};
pub use item::{
    Appointment, AppointmentPatch, CalendarItem, Milestone, MilestonePatch, Subtask, Task,
    TaskPatch,
};

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};
use crate::permission::Permission;

/// Credentials of a user. One file per user under `auth/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Login {
    pub username: String,
    pub password_hash: String,
}

impl Login {
    pub fn new(username: &str, password_hash: &str) -> Self {
        Login {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        }
    }
}

/// A link from a user to a calendar at a given access level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarReference {
    pub calendar_id: String,
    pub permission: Permission,
}

/// A user and the calendars it can reach. One file per user under `users/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub calendar_references: Vec<CalendarReference>,
}

impl User {
    pub fn new(username: &str) -> Self {
        User {
            username: username.to_string(),
            calendar_references: Vec::new(),
        }
    }

    pub fn reference(&self, calendar_id: &str) -> Option<&CalendarReference> {
        self.calendar_references
            .iter()
            .find(|r| r.calendar_id == calendar_id)
    }

    pub fn references(&self, calendar_id: &str) -> bool {
        self.reference(calendar_id).is_some()
    }

    /// Remove the reference to `calendar_id`. Returns true if one was removed.
    pub fn remove_reference(&mut self, calendar_id: &str) -> bool {
        let before = self.calendar_references.len();
        self.calendar_references
            .retain(|r| r.calendar_id != calendar_id);
        self.calendar_references.len() != before
    }
}

/// Check that a username or calendar name only uses `[-+_A-Za-z0-9]`.
///
/// Names become file and directory names, and `/` separates owner and name
/// in calendar ids, so anything outside this set is refused.
pub fn validate_name(name: &str) -> PlannerResult<()> {
    let legal = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '_'));

    if legal {
        Ok(())
    } else {
        Err(PlannerError::InvalidName(name.to_string()))
    }
}

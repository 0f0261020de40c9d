//! Creating and deleting users.

use tracing::{info, warn};

use super::Store;
use crate::error::{PlannerError, PlannerResult, ResourceKind};
use crate::permission::Permission;
use crate::record::{Calendar, CalendarReference, Login, User, validate_name};

impl Store {
    /// Create a login, a user and the user's default calendar `<username>/<username>`.
    ///
    /// Sub-steps are not rolled back on failure; the first error is returned.
    pub fn add_user(&self, username: &str, password_hash: &str) -> PlannerResult<()> {
        validate_name(username)?;

        let user_exists = || self.get_user(username).is_ok();
        self.locks
            .with_new_lock(ResourceKind::User, username, user_exists, || {
                self.persist_login(&Login::new(username, password_hash))?;

                let calendar_id = Calendar::id_for(username, username);
                let calendar_exists = || self.get_calendar(&calendar_id).is_ok();
                self.locks.with_new_lock(
                    ResourceKind::Calendar,
                    &calendar_id,
                    calendar_exists,
                    || {
                        let mut user = User::new(username);
                        let mut calendar = Calendar::new(username, username);
                        self.link(&mut user, &mut calendar, Permission::Owner)
                    },
                )
            })?;

        info!(username, "added user");
        Ok(())
    }

    /// Delete a user together with its login and every calendar it owns.
    ///
    /// Grants the user holds on other calendars are revoked, and everyone the
    /// owned calendars were shared with loses their reference. The user's key
    /// stays reserved until the cascade has finished.
    pub fn delete_user(&self, username: &str) -> PlannerResult<()> {
        let shared_with_user = self.locks.with_lock(ResourceKind::User, username, || {
            let user = self.get_user(username)?;
            self.forget_user(username)?;
            if self.get_login(username).is_ok() {
                self.forget_login(username)?;
            }
            Ok(user.calendar_references)
        })?;

        let result = self.cascade_user_deletion(username, shared_with_user);
        self.locks.remove(username)?;
        result?;

        info!(username, "deleted user");
        Ok(())
    }

    fn cascade_user_deletion(
        &self,
        username: &str,
        references: Vec<CalendarReference>,
    ) -> PlannerResult<()> {
        for reference in references {
            let calendar_id = &reference.calendar_id;
            let revoked = self.locks.with_lock(ResourceKind::Calendar, calendar_id, || {
                let mut calendar = self.get_calendar(calendar_id)?;
                if calendar.owner != username && calendar.revoke(username) {
                    self.persist_calendar(&calendar)?;
                }
                Ok(())
            });
            match revoked {
                Err(PlannerError::NotFound { .. }) => {
                    warn!(username, calendar = %calendar_id, "deleted user referenced a missing calendar");
                }
                other => other?,
            }
        }

        for calendar_id in self.owned_calendar_ids(username)? {
            match self.delete_calendar(&calendar_id) {
                Err(PlannerError::NotFound {
                    kind: ResourceKind::Calendar,
                    ..
                }) => {}
                other => other?,
            }
        }

        let owner_dir = self.layout.owner_dir(username);
        match std::fs::remove_dir_all(&owner_dir) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(PlannerError::storage(owner_dir, e))
            }
            _ => Ok(()),
        }
    }
}

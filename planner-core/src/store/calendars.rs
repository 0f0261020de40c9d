//! Creating and deleting calendars.

use tracing::{info, warn};

use super::Store;
use crate::error::{PlannerError, PlannerResult, ResourceKind};
use crate::permission::Permission;
use crate::record::{Calendar, validate_name};

impl Store {
    /// Create the calendar `<owner>/<name>` and link it to its owner.
    pub fn add_calendar(&self, owner: &str, name: &str) -> PlannerResult<()> {
        validate_name(owner)?;
        validate_name(name)?;
        let calendar_id = Calendar::id_for(owner, name);

        self.locks.with_lock(ResourceKind::User, owner, || {
            let mut user = self.get_user(owner)?;
            let exists = || self.get_calendar(&calendar_id).is_ok();
            self.locks
                .with_new_lock(ResourceKind::Calendar, &calendar_id, exists, || {
                    let mut calendar = Calendar::new(owner, name);
                    self.link(&mut user, &mut calendar, Permission::Owner)
                })
        })?;

        info!(calendar = %calendar_id, "added calendar");
        Ok(())
    }

    /// Delete a calendar after unlinking everyone it is shared with.
    ///
    /// Grantees are unlinked one at a time, each under its own pair of
    /// locks. The record is only removed once no grants remain, so a grant
    /// made while the cascade runs is unlinked on the next pass.
    pub fn delete_calendar(&self, calendar_id: &str) -> PlannerResult<()> {
        loop {
            let calendar = self.get_calendar(calendar_id)?;
            for grantee in calendar.grantees() {
                self.revoke_grantee(&grantee, calendar_id)?;
            }
            if self.retire_calendar(&calendar.owner, calendar_id)? {
                break;
            }
        }

        info!(calendar = %calendar_id, "deleted calendar");
        Ok(())
    }

    fn revoke_grantee(&self, username: &str, calendar_id: &str) -> PlannerResult<()> {
        let unlinked = self.with_pair(username, calendar_id, |user, calendar| {
            self.unlink(user, calendar)
        });

        match unlinked {
            Err(PlannerError::NotFound {
                kind: ResourceKind::User,
                ..
            }) => {
                warn!(username, calendar = %calendar_id, "dropping grant held by missing user");
                self.locks.with_lock(ResourceKind::Calendar, calendar_id, || {
                    let mut calendar = self.get_calendar(calendar_id)?;
                    if calendar.revoke(username) {
                        self.persist_calendar(&calendar)?;
                    }
                    Ok(())
                })
            }
            other => other,
        }
    }

    /// Remove the calendar record, its lock and the owner's reference.
    /// Returns false, leaving everything in place, if grants reappeared.
    fn retire_calendar(&self, owner: &str, calendar_id: &str) -> PlannerResult<bool> {
        let retire = || {
            self.locks.with_lock(ResourceKind::Calendar, calendar_id, || {
                let calendar = self.get_calendar(calendar_id)?;
                if calendar.has_grantees() {
                    return Ok(false);
                }
                self.forget_calendar(&calendar)?;
                self.locks.remove(calendar_id)?;
                Ok(true)
            })
        };

        let retired = self.locks.with_lock(ResourceKind::User, owner, || {
            if !retire()? {
                return Ok(false);
            }
            match self.get_user(owner) {
                Ok(mut user) => {
                    if user.remove_reference(calendar_id) {
                        self.persist_user(&user)?;
                    }
                }
                // Owner is being deleted; its record is already gone.
                Err(PlannerError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
            Ok(true)
        });

        match retired {
            Err(PlannerError::NotFound {
                kind: ResourceKind::User,
                ..
            }) => {
                warn!(owner, calendar = %calendar_id, "deleting calendar of missing owner");
                retire()
            }
            other => other,
        }
    }
}

//! Linking users to calendars.
//!
//! A link lives on both sides: a reference on the user record and either
//! the owner field or a view/edit grant on the calendar. Linking writes the
//! user first and the calendar last; unlinking revokes the calendar grant
//! first and drops the user reference last. A crash between the two writes
//! can leave a stale user reference but never a grant nobody knows about.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Store;
use crate::error::{PlannerError, PlannerResult, ResourceKind};
use crate::permission::Permission;
use crate::record::{Calendar, CalendarReference, User};

/// Level a calendar is shared at with a non-owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareLevel {
    None,
    View,
    Edit,
}

impl ShareLevel {
    pub fn permission(self) -> Permission {
        match self {
            ShareLevel::None => Permission::None,
            ShareLevel::View => Permission::Read,
            ShareLevel::Edit => Permission::Edit,
        }
    }
}

impl fmt::Display for ShareLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ShareLevel::None => "none",
            ShareLevel::View => "view",
            ShareLevel::Edit => "edit",
        };
        f.write_str(name)
    }
}

impl FromStr for ShareLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ShareLevel::None),
            "view" | "read" => Ok(ShareLevel::View),
            "edit" => Ok(ShareLevel::Edit),
            other => Err(format!("Unknown share level '{other}'")),
        }
    }
}

impl Store {
    /// Run `f` on copies of a user and a calendar while holding both locks,
    /// user lock first.
    pub(super) fn with_pair<T>(
        &self,
        username: &str,
        calendar_id: &str,
        f: impl FnOnce(&mut User, &mut Calendar) -> PlannerResult<T>,
    ) -> PlannerResult<T> {
        self.locks.with_lock(ResourceKind::User, username, || {
            self.locks.with_lock(ResourceKind::Calendar, calendar_id, || {
                let mut user = self.get_user(username)?;
                let mut calendar = self.get_calendar(calendar_id)?;
                f(&mut user, &mut calendar)
            })
        })
    }

    /// Link `user` to `calendar` at `permission` and persist both sides.
    /// Both locks must be held.
    pub(super) fn link(
        &self,
        user: &mut User,
        calendar: &mut Calendar,
        permission: Permission,
    ) -> PlannerResult<()> {
        let calendar_id = calendar.id();
        if permission == Permission::None {
            return Ok(());
        }
        if user.references(&calendar_id) {
            return Err(PlannerError::already_exists(ResourceKind::Calendar, calendar_id));
        }

        let is_owner = calendar.owner == user.username;
        if (permission == Permission::Owner) != is_owner {
            // Ownership is fixed by the id; the owner holds no grants.
            return Err(PlannerError::already_exists(ResourceKind::Calendar, calendar_id));
        }

        // A grant left behind by an interrupted unlink.
        calendar.revoke(&user.username);

        user.calendar_references.push(CalendarReference {
            calendar_id: calendar_id.clone(),
            permission,
        });
        self.persist_user(user)?;

        calendar.grant(&user.username, permission);
        self.persist_calendar(calendar)?;

        debug!(username = %user.username, calendar = %calendar_id, %permission, "linked");
        Ok(())
    }

    /// Unlink a non-owner from `calendar`. Either side may already be
    /// missing its half of the link. Both locks must be held.
    pub(super) fn unlink(&self, user: &mut User, calendar: &mut Calendar) -> PlannerResult<()> {
        let calendar_id = calendar.id();

        if calendar.revoke(&user.username) {
            self.persist_calendar(calendar)?;
        }
        if user.remove_reference(&calendar_id) {
            self.persist_user(user)?;
        }

        debug!(username = %user.username, calendar = %calendar_id, "unlinked");
        Ok(())
    }

    /// Give `username` access to a calendar.
    ///
    /// Fails with `AlreadyExists` if the user already references it, or if
    /// the requested level does not fit the user's role: only the owner can
    /// be linked as `Owner`, and the owner cannot receive a view or edit
    /// grant. `Permission::None` does nothing.
    pub fn associate(
        &self,
        username: &str,
        calendar_id: &str,
        permission: Permission,
    ) -> PlannerResult<()> {
        self.with_pair(username, calendar_id, |user, calendar| {
            self.link(user, calendar, permission)
        })
    }

    /// Remove a user's link to a calendar. A no-op if they are not linked.
    ///
    /// Disassociating the owner deletes the calendar, as `delete_calendar`
    /// does.
    pub fn disassociate(&self, username: &str, calendar_id: &str) -> PlannerResult<()> {
        if self.get_calendar(calendar_id)?.owner == username {
            return self.delete_calendar(calendar_id);
        }
        self.with_pair(username, calendar_id, |user, calendar| {
            self.unlink(user, calendar)
        })
    }

    /// Change the level a calendar is shared at with `username`.
    ///
    /// The old grant is removed before the new one is made. Sharing at the
    /// level already held changes nothing.
    pub fn share(&self, calendar_id: &str, username: &str, level: ShareLevel) -> PlannerResult<()> {
        self.with_pair(username, calendar_id, |user, calendar| {
            if calendar.owner == user.username {
                return Err(PlannerError::already_exists(ResourceKind::Calendar, calendar.id()));
            }

            let target = level.permission();
            let referenced = user
                .reference(calendar_id)
                .map_or(Permission::None, |r| r.permission);
            if referenced == target && calendar.permission_for(username) == target {
                return Ok(());
            }

            self.unlink(user, calendar)?;
            self.link(user, calendar, target)
        })
    }
}

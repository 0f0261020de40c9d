//! The resource store.
//!
//! Keeps every login, user and calendar in memory and mirrors each one to
//! its own file. All mutations go through the store's operations, which
//! take the per-resource lock, write the file, then update the map.
//!
//! Lock order: when an operation holds a user lock and a calendar lock at
//! the same time, the user lock is always taken first.

mod association;
mod bootstrap;
mod calendars;
mod locks;
mod users;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::codec;
use crate::error::{PlannerError, PlannerResult, ResourceKind};
use crate::layout::DataLayout;
use crate::record::{Calendar, Login, User};
use crate::singleton::DirectoryLock;
use locks::ResourceLocks;

pub use association::ShareLevel;

type RecordMap<R> = RwLock<HashMap<String, R>>;

pub struct Store {
    layout: DataLayout,
    locks: ResourceLocks,
    logins: RecordMap<Login>,
    users: RecordMap<User>,
    calendars: RecordMap<Calendar>,
    /// Held by stores from `open_exclusive`; released on drop.
    _dir_lock: Option<DirectoryLock>,
}

fn read<'a, R>(
    map: &'a RecordMap<R>,
    name: &'static str,
) -> PlannerResult<RwLockReadGuard<'a, HashMap<String, R>>> {
    map.read().map_err(|_| PlannerError::LockPoisoned(name))
}

fn write<'a, R>(
    map: &'a RecordMap<R>,
    name: &'static str,
) -> PlannerResult<RwLockWriteGuard<'a, HashMap<String, R>>> {
    map.write().map_err(|_| PlannerError::LockPoisoned(name))
}

impl Store {
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    // READS:

    pub fn get_login(&self, username: &str) -> PlannerResult<Login> {
        read(&self.logins, "logins")?
            .get(username)
            .cloned()
            .ok_or_else(|| PlannerError::not_found(ResourceKind::Login, username))
    }

    pub fn get_user(&self, username: &str) -> PlannerResult<User> {
        read(&self.users, "users")?
            .get(username)
            .cloned()
            .ok_or_else(|| PlannerError::not_found(ResourceKind::User, username))
    }

    pub fn get_calendar(&self, calendar_id: &str) -> PlannerResult<Calendar> {
        read(&self.calendars, "calendars")?
            .get(calendar_id)
            .cloned()
            .ok_or_else(|| PlannerError::not_found(ResourceKind::Calendar, calendar_id))
    }

    /// All usernames, sorted.
    pub fn usernames(&self) -> PlannerResult<Vec<String>> {
        let mut names: Vec<String> = read(&self.users, "users")?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// All calendar ids, sorted.
    pub fn calendar_ids(&self) -> PlannerResult<Vec<String>> {
        let mut ids: Vec<String> = read(&self.calendars, "calendars")?
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Ids of the calendars owned by `username`.
    fn owned_calendar_ids(&self, username: &str) -> PlannerResult<Vec<String>> {
        let mut ids: Vec<String> = read(&self.calendars, "calendars")?
            .iter()
            .filter(|(_, calendar)| calendar.owner == username)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    // OVERWRITES:

    /// Overwrite an existing user. Never creates one; use `add_user`.
    ///
    /// The record is stored under `username` whatever its own field says.
    pub fn set_user(&self, username: &str, mut user: User) -> PlannerResult<()> {
        self.locks.with_lock(ResourceKind::User, username, || {
            self.get_user(username)?;
            user.username = username.to_string();
            self.persist_user(&user)
        })
    }

    /// Overwrite an existing calendar. Never creates one; use `add_calendar`.
    ///
    /// Name and owner make up the id and are kept from the stored record.
    pub fn set_calendar(&self, calendar_id: &str, mut calendar: Calendar) -> PlannerResult<()> {
        self.locks.with_lock(ResourceKind::Calendar, calendar_id, || {
            let current = self.get_calendar(calendar_id)?;
            calendar.name = current.name;
            calendar.owner = current.owner;
            self.persist_calendar(&calendar)
        })
    }

    /// Read-modify-write a calendar under its lock.
    ///
    /// `f` may change description and items. Identity and sharing lists are
    /// restored afterwards; sharing goes through `share`.
    pub fn modify_calendar<T>(
        &self,
        calendar_id: &str,
        f: impl FnOnce(&mut Calendar) -> PlannerResult<T>,
    ) -> PlannerResult<T> {
        self.locks.with_lock(ResourceKind::Calendar, calendar_id, || {
            let current = self.get_calendar(calendar_id)?;
            let mut next = current.clone();
            let output = f(&mut next)?;

            next.name = current.name.clone();
            next.owner = current.owner.clone();
            next.view_users = current.view_users.clone();
            next.edit_users = current.edit_users.clone();

            if next != current {
                self.persist_calendar(&next)?;
            }
            Ok(output)
        })
    }

    // WRITE-THROUGH (callers hold the resource lock):

    fn persist_login(&self, login: &Login) -> PlannerResult<()> {
        codec::write_record(&self.layout.login_path(&login.username), login)?;
        write(&self.logins, "logins")?.insert(login.username.clone(), login.clone());
        debug!(username = %login.username, "persisted login");
        Ok(())
    }

    fn persist_user(&self, user: &User) -> PlannerResult<()> {
        codec::write_record(&self.layout.user_path(&user.username), user)?;
        write(&self.users, "users")?.insert(user.username.clone(), user.clone());
        debug!(username = %user.username, references = user.calendar_references.len(), "persisted user");
        Ok(())
    }

    fn persist_calendar(&self, calendar: &Calendar) -> PlannerResult<()> {
        let path = self.layout.calendar_path(&calendar.owner, &calendar.name);
        codec::write_record(&path, calendar)?;
        let id = calendar.id();
        debug!(calendar = %id, "persisted calendar");
        write(&self.calendars, "calendars")?.insert(id, calendar.clone());
        Ok(())
    }

    fn forget_login(&self, username: &str) -> PlannerResult<()> {
        codec::remove_record(&self.layout.login_path(username))?;
        write(&self.logins, "logins")?.remove(username);
        Ok(())
    }

    fn forget_user(&self, username: &str) -> PlannerResult<()> {
        codec::remove_record(&self.layout.user_path(username))?;
        write(&self.users, "users")?.remove(username);
        Ok(())
    }

    fn forget_calendar(&self, calendar: &Calendar) -> PlannerResult<()> {
        let path = self.layout.calendar_path(&calendar.owner, &calendar.name);
        codec::remove_record(&path)?;
        write(&self.calendars, "calendars")?.remove(&calendar.id());
        Ok(())
    }
}

//! Calendar records.

use serde::{Deserialize, Serialize};

use super::item::{Appointment, CalendarItem, Milestone, Task};
use crate::error::{PlannerError, PlannerResult, ResourceKind};
use crate::permission::Permission;

/// A calendar owned by one user and shared with others.
///
/// The id is `<owner>/<name>` and is derived, never stored: it is rebuilt
/// from the file's location when the store loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Calendar {
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub view_users: Vec<String>,
    #[serde(default)]
    pub edit_users: Vec<String>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Editable calendar metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarPatch {
    pub description: Option<String>,
}

impl Calendar {
    pub fn new(owner: &str, name: &str) -> Self {
        Calendar {
            name: name.to_string(),
            owner: owner.to_string(),
            description: String::new(),
            view_users: Vec::new(),
            edit_users: Vec::new(),
            appointments: Vec::new(),
            milestones: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn id_for(owner: &str, name: &str) -> String {
        format!("{owner}/{name}")
    }

    /// Split a calendar id into `(owner, name)`.
    pub fn split_id(calendar_id: &str) -> Option<(&str, &str)> {
        calendar_id
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
    }

    pub fn id(&self) -> String {
        Self::id_for(&self.owner, &self.name)
    }

    pub fn is_default(&self) -> bool {
        self.name == self.owner
    }

    /// The access level `username` holds on this calendar.
    pub fn permission_for(&self, username: &str) -> Permission {
        if self.owner == username {
            Permission::Owner
        } else if self.edit_users.iter().any(|u| u == username) {
            Permission::Edit
        } else if self.view_users.iter().any(|u| u == username) {
            Permission::Read
        } else {
            Permission::None
        }
    }

    /// Every user holding a view or edit grant.
    pub fn grantees(&self) -> Vec<String> {
        self.view_users
            .iter()
            .chain(self.edit_users.iter())
            .cloned()
            .collect()
    }

    pub fn has_grantees(&self) -> bool {
        !self.view_users.is_empty() || !self.edit_users.is_empty()
    }

    /// Add a view (`Read`) or edit grant. Other levels are ignored.
    pub fn grant(&mut self, username: &str, permission: Permission) {
        let list = match permission {
            Permission::Read => &mut self.view_users,
            Permission::Edit => &mut self.edit_users,
            Permission::None | Permission::Owner => return,
        };
        if !list.iter().any(|u| u == username) {
            list.push(username.to_string());
        }
    }

    /// Remove `username` from the edit list, or else from the view list.
    /// Returns true if a grant was removed.
    pub fn revoke(&mut self, username: &str) -> bool {
        if let Some(pos) = self.edit_users.iter().position(|u| u == username) {
            self.edit_users.remove(pos);
            return true;
        }
        if let Some(pos) = self.view_users.iter().position(|u| u == username) {
            self.view_users.remove(pos);
            return true;
        }
        false
    }

    pub fn apply(&mut self, patch: CalendarPatch) {
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    // ITEMS:

    pub fn item<T: CalendarItem>(&self, item_id: &str) -> Option<&T> {
        T::items(self).iter().find(|item| item.id() == item_id)
    }

    pub fn add_item<T: CalendarItem>(&mut self, item: T) {
        T::items_mut(self).push(item);
    }

    /// Apply a patch to the item with `item_id` and return the updated item.
    pub fn update_item<T: CalendarItem>(&mut self, item_id: &str, patch: T::Patch) -> PlannerResult<T> {
        let item = T::items_mut(self)
            .iter_mut()
            .find(|item| item.id() == item_id)
            .ok_or_else(|| PlannerError::not_found(ResourceKind::Item, item_id))?;
        item.apply(patch);
        Ok(item.clone())
    }

    pub fn remove_item<T: CalendarItem>(&mut self, item_id: &str) -> PlannerResult<T> {
        let items = T::items_mut(self);
        let pos = items
            .iter()
            .position(|item| item.id() == item_id)
            .ok_or_else(|| PlannerError::not_found(ResourceKind::Item, item_id))?;
        Ok(items.remove(pos))
    }
}

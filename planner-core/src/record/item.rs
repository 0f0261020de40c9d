//! Items held by a calendar: appointments, milestones and tasks.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::calendar::Calendar;

fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Access to one item collection of a calendar.
///
/// Lets the calendar add, patch and remove any item kind through the
/// same code path.
pub trait CalendarItem: Clone {
    /// Partial update: only `Some` fields overwrite the item.
    type Patch;

    /// Name of the collection, used in messages and routes.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    /// Replace the id with a fresh one, for items built from client input.
    fn renew_id(&mut self);

    fn apply(&mut self, patch: Self::Patch);

    fn items(calendar: &Calendar) -> &[Self];

    fn items_mut(calendar: &mut Calendar) -> &mut Vec<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Appointment {
    #[serde(default = "new_item_id")]
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub description: String,
}

impl Appointment {
    pub fn new(
        name: &str,
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_date: NaiveDate,
        end_time: NaiveTime,
    ) -> Self {
        Appointment {
            id: new_item_id(),
            name: name.to_string(),
            start_date,
            start_time,
            end_date,
            end_time,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentPatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub description: Option<String>,
}

impl CalendarItem for Appointment {
    type Patch = AppointmentPatch;
    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> &str {
        &self.id
    }

    fn renew_id(&mut self) {
        self.id = new_item_id();
    }

    fn apply(&mut self, patch: AppointmentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    fn items(calendar: &Calendar) -> &[Self] {
        &calendar.appointments
    }

    fn items_mut(calendar: &mut Calendar) -> &mut Vec<Self> {
        &mut calendar.appointments
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Milestone {
    #[serde(default = "new_item_id")]
    pub id: String,
    pub name: String,
    pub due_date: NaiveDate,
    pub due_time: NaiveTime,
    #[serde(default)]
    pub description: String,
}

impl Milestone {
    pub fn new(name: &str, due_date: NaiveDate, due_time: NaiveTime) -> Self {
        Milestone {
            id: new_item_id(),
            name: name.to_string(),
            due_date,
            due_time,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestonePatch {
    pub name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub description: Option<String>,
}

impl CalendarItem for Milestone {
    type Patch = MilestonePatch;
    const COLLECTION: &'static str = "milestones";

    fn id(&self) -> &str {
        &self.id
    }

    fn renew_id(&mut self) {
        self.id = new_item_id();
    }

    fn apply(&mut self, patch: MilestonePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(due_time) = patch.due_time {
            self.due_time = due_time;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    fn items(calendar: &Calendar) -> &[Self] {
        &calendar.milestones
    }

    fn items_mut(calendar: &mut Calendar) -> &mut Vec<Self> {
        &mut calendar.milestones
    }
}

/// A task, optionally attached to a milestone of the same calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    #[serde(default = "new_item_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,
    pub due_date: NaiveDate,
    pub due_time: NaiveTime,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(name: &str, due_date: NaiveDate, due_time: NaiveTime) -> Self {
        Task {
            id: new_item_id(),
            name: name.to_string(),
            milestone_id: None,
            due_date,
            due_time,
            description: String::new(),
            subtasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subtask {
    #[serde(default = "new_item_id")]
    pub id: String,
    pub name: String,
    pub due_date: NaiveDate,
    pub due_time: NaiveTime,
    #[serde(default)]
    pub description: String,
}

impl Subtask {
    pub fn new(name: &str, due_date: NaiveDate, due_time: NaiveTime) -> Self {
        Subtask {
            id: new_item_id(),
            name: name.to_string(),
            due_date,
            due_time,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub milestone_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub subtasks: Option<Vec<Subtask>>,
}

impl CalendarItem for Task {
    type Patch = TaskPatch;
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }

    fn renew_id(&mut self) {
        self.id = new_item_id();
    }

    fn apply(&mut self, patch: TaskPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(milestone_id) = patch.milestone_id {
            self.milestone_id = Some(milestone_id);
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(due_time) = patch.due_time {
            self.due_time = due_time;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(subtasks) = patch.subtasks {
            self.subtasks = subtasks;
        }
    }

    fn items(calendar: &Calendar) -> &[Self] {
        &calendar.tasks
    }

    fn items_mut(calendar: &mut Calendar) -> &mut Vec<Self> {
        &mut calendar.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_new_items_get_distinct_ids() {
        let a = Milestone::new("Release", date(20), time(12));
        let b = Milestone::new("Release", date(20), time(12));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_patch_only_overwrites_present_fields() {
        let mut appointment = Appointment::new("Standup", date(20), time(9), date(20), time(10));
        let id = appointment.id.clone();

        appointment.apply(AppointmentPatch {
            end_time: Some(time(11)),
            description: Some("Moved".to_string()),
            ..Default::default()
        });

        assert_eq!(appointment.id, id);
        assert_eq!(appointment.name, "Standup");
        assert_eq!(appointment.start_time, time(9));
        assert_eq!(appointment.end_time, time(11));
        assert_eq!(appointment.description, "Moved");
    }

    #[test]
    fn test_task_patch_attaches_milestone() {
        let mut task = Task::new("Write docs", date(21), time(17));
        assert!(task.milestone_id.is_none());

        task.apply(TaskPatch {
            milestone_id: Some("m-1".to_string()),
            ..Default::default()
        });

        assert_eq!(task.milestone_id.as_deref(), Some("m-1"));
        assert_eq!(task.name, "Write docs");
    }

    #[test]
    fn test_item_without_id_gets_one() {
        let milestone: Milestone = serde_json::from_value(serde_json::json!({
            "name": "Launch",
            "due_date": "2025-03-20",
            "due_time": "12:00:00",
        }))
        .unwrap();
        assert!(!milestone.id.is_empty());

        let mut renewed = milestone.clone();
        renewed.renew_id();
        assert_ne!(renewed.id, milestone.id);
    }
}

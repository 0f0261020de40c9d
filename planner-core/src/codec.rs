//! Record codec: TOML text on disk, one record per file.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{PlannerError, PlannerResult};

/// File extension of every record file.
pub const RECORD_EXTENSION: &str = "toml";

/// Encode a record. `origin` only labels errors.
pub fn encode<R: Serialize>(origin: &Path, record: &R) -> PlannerResult<String> {
    toml::to_string_pretty(record).map_err(|e| PlannerError::CorruptRecord {
        path: origin.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Decode a record. Unknown, missing or mistyped fields are errors.
pub fn decode<R: DeserializeOwned>(origin: &Path, content: &str) -> PlannerResult<R> {
    toml::from_str(content).map_err(|e| PlannerError::CorruptRecord {
        path: origin.to_path_buf(),
        reason: e.to_string(),
    })
}

pub fn read_record<R: DeserializeOwned>(path: &Path) -> PlannerResult<R> {
    let content = std::fs::read_to_string(path).map_err(|e| PlannerError::storage(path, e))?;
    decode(path, &content)
}

/// Write a record through a temp file and rename it into place.
pub fn write_record<R: Serialize>(path: &Path, record: &R) -> PlannerResult<()> {
    let content = encode(path, record)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PlannerError::storage(parent, e))?;
    }

    let temp = path.with_extension(format!("{RECORD_EXTENSION}.tmp"));
    std::fs::write(&temp, content).map_err(|e| PlannerError::storage(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| PlannerError::storage(path, e))?;
    Ok(())
}

/// Delete a record file.
pub fn remove_record(path: &Path) -> PlannerResult<()> {
    std::fs::remove_file(path).map_err(|e| PlannerError::storage(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Permission;
    use crate::record::{
        Appointment, Calendar, CalendarReference, Login, Milestone, Subtask, Task, User,
    };
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("test.toml")
    }

    fn full_calendar() -> Calendar {
        let date = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let ten = NaiveTime::from_hms_opt(10, 30, 0).unwrap();

        let mut calendar = Calendar::new("alice", "work");
        calendar.description = "Team \"work\" calendar\nsecond line".to_string();
        calendar.view_users = vec!["bob".to_string()];
        calendar.edit_users = vec!["carol".to_string(), "dave".to_string()];

        let mut appointment = Appointment::new("Standup", date, nine, date, ten);
        appointment.description = "Daily".to_string();
        calendar.appointments.push(appointment);

        let milestone = Milestone::new("Release", date, ten);
        let mut task = Task::new("Changelog", date, nine);
        task.milestone_id = Some(milestone.id.clone());
        task.subtasks.push(Subtask::new("Draft", date, nine));
        calendar.milestones.push(milestone);
        calendar.tasks.push(task);
        calendar
    }

    #[test]
    fn test_calendar_round_trip() {
        let calendar = full_calendar();
        let encoded = encode(&origin(), &calendar).unwrap();
        let decoded: Calendar = decode(&origin(), &encoded).unwrap();
        assert_eq!(decoded, calendar);
    }

    #[test]
    fn test_empty_calendar_round_trip() {
        let calendar = Calendar::new("alice", "alice");
        let encoded = encode(&origin(), &calendar).unwrap();
        let decoded: Calendar = decode(&origin(), &encoded).unwrap();
        assert_eq!(decoded, calendar);
    }

    #[test]
    fn test_login_round_trip() {
        let login = Login::new("alice", "$argon2id$v=19$m=4096,t=3,p=1$c2FsdA$aGFzaA");
        let encoded = encode(&origin(), &login).unwrap();
        assert_eq!(decode::<Login>(&origin(), &encoded).unwrap(), login);
    }

    #[test]
    fn test_decode_truncated_input_fails() {
        let encoded = encode(&origin(), &full_calendar()).unwrap();
        let cut = encoded.find("owner = ").unwrap() + "owner = \"al".len();
        let truncated = &encoded[..cut];

        let err = decode::<Calendar>(&origin(), truncated).unwrap_err();
        assert!(matches!(err, PlannerError::CorruptRecord { .. }), "{err}");
    }

    #[test]
    fn test_decode_rejects_unknown_fields() {
        let content = "username = \"alice\"\npassword_hash = \"h\"\nadmin = true\n";
        let err = decode::<Login>(&origin(), content).unwrap_err();
        assert!(matches!(err, PlannerError::CorruptRecord { .. }));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let err = decode::<Login>(&origin(), "username = \"alice\"\n").unwrap_err();
        assert!(matches!(err, PlannerError::CorruptRecord { .. }));
    }

    #[test]
    fn test_write_record_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users").join("alice.toml");

        write_record(&path, &User::new("alice")).unwrap();

        let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("alice.toml")]);
        assert_eq!(read_record::<User>(&path).unwrap(), User::new("alice"));
    }

    fn permission() -> impl Strategy<Value = Permission> {
        prop_oneof![
            Just(Permission::None),
            Just(Permission::Read),
            Just(Permission::Edit),
            Just(Permission::Owner),
        ]
    }

    fn name() -> impl Strategy<Value = String> {
        "[-+_A-Za-z0-9]{1,16}"
    }

    fn date() -> impl Strategy<Value = NaiveDate> {
        (1970i32..2100, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn time() -> impl Strategy<Value = NaiveTime> {
        (0u32..24, 0u32..60, 0u32..60).prop_map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap())
    }

    fn appointment() -> impl Strategy<Value = Appointment> {
        (name(), date(), time(), date(), time(), "\\PC*").prop_map(
            |(name, start_date, start_time, end_date, end_time, description)| {
                let mut appointment =
                    Appointment::new(&name, start_date, start_time, end_date, end_time);
                appointment.description = description;
                appointment
            },
        )
    }

    fn milestone() -> impl Strategy<Value = Milestone> {
        (name(), date(), time(), "\\PC*").prop_map(|(name, due_date, due_time, description)| {
            let mut milestone = Milestone::new(&name, due_date, due_time);
            milestone.description = description;
            milestone
        })
    }

    fn subtask() -> impl Strategy<Value = Subtask> {
        (name(), date(), time(), "\\PC*").prop_map(|(name, due_date, due_time, description)| {
            let mut subtask = Subtask::new(&name, due_date, due_time);
            subtask.description = description;
            subtask
        })
    }

    fn task() -> impl Strategy<Value = Task> {
        (
            name(),
            date(),
            time(),
            "\\PC*",
            prop::option::of(name()),
            prop::collection::vec(subtask(), 0..4),
        )
            .prop_map(|(name, due_date, due_time, description, milestone_id, subtasks)| {
                let mut task = Task::new(&name, due_date, due_time);
                task.description = description;
                task.milestone_id = milestone_id;
                task.subtasks = subtasks;
                task
            })
    }

    fn any_calendar() -> impl Strategy<Value = Calendar> {
        (
            (name(), name(), "\\PC*"),
            prop::collection::vec(name(), 0..4),
            prop::collection::vec(name(), 0..4),
            prop::collection::vec(appointment(), 0..3),
            prop::collection::vec(milestone(), 0..3),
            prop::collection::vec(task(), 0..3),
        )
            .prop_map(
                |((owner, name, description), view_users, edit_users, appointments, milestones, tasks)| {
                    let mut calendar = Calendar::new(&owner, &name);
                    calendar.description = description;
                    calendar.view_users = view_users;
                    calendar.edit_users = edit_users;
                    calendar.appointments = appointments;
                    calendar.milestones = milestones;
                    calendar.tasks = tasks;
                    calendar
                },
            )
    }

    proptest! {
        #[test]
        fn prop_login_round_trip(username in name(), password_hash in "\\PC*") {
            let login = Login::new(&username, &password_hash);
            let encoded = encode(&origin(), &login).unwrap();
            let decoded: Login = decode(&origin(), &encoded).unwrap();
            prop_assert_eq!(decoded, login);
        }

        #[test]
        fn prop_user_round_trip(
            username in name(),
            references in prop::collection::vec(("[-+_A-Za-z0-9]{1,8}/[-+_A-Za-z0-9]{1,8}", permission()), 0..6),
        ) {
            let user = User {
                username,
                calendar_references: references
                    .into_iter()
                    .map(|(calendar_id, permission)| CalendarReference { calendar_id, permission })
                    .collect(),
            };
            let encoded = encode(&origin(), &user).unwrap();
            let decoded: User = decode(&origin(), &encoded).unwrap();
            prop_assert_eq!(decoded, user);
        }

        #[test]
        fn prop_calendar_round_trip(calendar in any_calendar()) {
            let encoded = encode(&origin(), &calendar).unwrap();
            let decoded: Calendar = decode(&origin(), &encoded).unwrap();
            prop_assert_eq!(decoded, calendar);
        }
    }
}

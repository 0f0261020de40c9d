//! Hydrating a store from its data directory.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::info;

use super::Store;
use super::locks::ResourceLocks;
use crate::codec;
use crate::error::{PlannerError, PlannerResult};
use crate::layout::{DataLayout, is_record_file};
use crate::record::{Calendar, Login, User};
use crate::singleton;

/// Paths of the record files directly inside `dir`.
fn record_files(dir: &Path) -> PlannerResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PlannerError::storage(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PlannerError::storage(dir, e))?.path();
        if is_record_file(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

fn utf8_name(path: &Path, name: Option<&OsStr>) -> PlannerResult<String> {
    name.and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| PlannerError::CorruptRecord {
            path: path.to_path_buf(),
            reason: "file name is not valid UTF-8".to_string(),
        })
}

/// Reject a record whose own name disagrees with where it is stored.
fn check_placement(path: &Path, recorded: &str, stored: &str) -> PlannerResult<()> {
    if recorded != stored {
        return Err(PlannerError::CorruptRecord {
            path: path.to_path_buf(),
            reason: format!("record describes '{recorded}' but is stored as '{stored}'"),
        });
    }
    Ok(())
}

impl Store {
    /// Open the data directory at `root`, creating it if needed, and load
    /// every record into memory.
    ///
    /// Any unreadable or undecodable file aborts the load. References between
    /// records are not cross-checked here.
    pub fn load(root: impl Into<PathBuf>) -> PlannerResult<Self> {
        let layout = DataLayout::new(root);
        layout.ensure()?;

        let locks = ResourceLocks::default();

        let mut logins = HashMap::new();
        for path in record_files(&layout.auth_dir())? {
            let login: Login = codec::read_record(&path)?;
            let stem = utf8_name(&path, path.file_stem())?;
            check_placement(&path, &login.username, &stem)?;
            logins.insert(login.username.clone(), login);
        }

        let mut users = HashMap::new();
        for path in record_files(&layout.users_dir())? {
            let user: User = codec::read_record(&path)?;
            let stem = utf8_name(&path, path.file_stem())?;
            check_placement(&path, &user.username, &stem)?;
            locks.insert(&user.username)?;
            users.insert(user.username.clone(), user);
        }

        let mut calendars = HashMap::new();
        let calendars_dir = layout.calendars_dir();
        let owners = std::fs::read_dir(&calendars_dir)
            .map_err(|e| PlannerError::storage(&calendars_dir, e))?;
        for owner_entry in owners {
            let owner_dir = owner_entry
                .map_err(|e| PlannerError::storage(&calendars_dir, e))?
                .path();
            if !owner_dir.is_dir() {
                continue;
            }
            let owner = utf8_name(&owner_dir, owner_dir.file_name())?;

            for path in record_files(&owner_dir)? {
                let calendar: Calendar = codec::read_record(&path)?;
                let key = Calendar::id_for(&owner, &utf8_name(&path, path.file_stem())?);
                check_placement(&path, &calendar.id(), &key)?;
                locks.insert(&key)?;
                calendars.insert(key, calendar);
            }
        }

        info!(
            root = %layout.root().display(),
            logins = logins.len(),
            users = users.len(),
            calendars = calendars.len(),
            "loaded planner store"
        );

        Ok(Store {
            layout,
            locks,
            logins: RwLock::new(logins),
            users: RwLock::new(users),
            calendars: RwLock::new(calendars),
            _dir_lock: None,
        })
    }

    /// Like `load`, but first take the data directory's lock and hold it
    /// until the store is dropped. Fails with `DirectoryInUse` while any
    /// other exclusive store is open on the same directory.
    pub fn open_exclusive(root: impl Into<PathBuf>) -> PlannerResult<Self> {
        let root = root.into();
        let dir_lock = singleton::acquire_lock(&root)?;

        let mut store = Store::load(root)?;
        store._dir_lock = Some(dir_lock);
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Permission;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("db");

        let store = Store::load(&root).unwrap();

        assert!(root.join("auth").is_dir());
        assert!(root.join("users").is_dir());
        assert!(root.join("calendars").is_dir());
        assert!(store.usernames().unwrap().is_empty());
        assert!(store.calendar_ids().unwrap().is_empty());
    }

    #[test]
    fn test_reload_reproduces_store() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::load(dir.path()).unwrap();
            store.add_user("alice", "h1").unwrap();
            store.add_user("bob", "h2").unwrap();
            store.add_calendar("alice", "work").unwrap();
            store.associate("bob", "alice/work", Permission::Edit).unwrap();
        }

        let store = Store::load(dir.path()).unwrap();

        assert_eq!(store.get_login("bob").unwrap().password_hash, "h2");
        assert_eq!(store.usernames().unwrap(), vec!["alice", "bob"]);
        assert_eq!(
            store.calendar_ids().unwrap(),
            vec!["alice/alice", "alice/work", "bob/bob"]
        );
        assert_eq!(store.get_calendar("alice/work").unwrap().edit_users, vec!["bob"]);
        assert!(store.get_user("bob").unwrap().references("alice/work"));

        // Locks were allocated for every loaded resource.
        let err = store.add_user("alice", "again").unwrap_err();
        assert!(err.is_already_exists());
        let err = store.add_calendar("alice", "work").unwrap_err();
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_load_fails_on_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("users")).unwrap();
        std::fs::write(dir.path().join("users/alice.toml"), "username = [").unwrap();

        let err = Store::load(dir.path()).err().unwrap();
        assert!(matches!(err, PlannerError::CorruptRecord { .. }), "{err}");
    }

    #[test]
    fn test_load_rejects_misplaced_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let owner_dir = dir.path().join("calendars/alice");
        std::fs::create_dir_all(&owner_dir).unwrap();
        let misplaced = codec::encode(Path::new("x"), &Calendar::new("bob", "work")).unwrap();
        std::fs::write(owner_dir.join("work.toml"), misplaced).unwrap();

        let err = Store::load(dir.path()).err().unwrap();
        assert!(matches!(err, PlannerError::CorruptRecord { .. }), "{err}");
    }

    #[test]
    fn test_load_rejects_misplaced_user() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = Store::load(dir.path()).unwrap();
            store.add_user("alice", "h").unwrap();
        }
        std::fs::rename(
            dir.path().join("users/alice.toml"),
            dir.path().join("users/bob.toml"),
        )
        .unwrap();

        let err = Store::load(dir.path()).err().unwrap();
        assert!(matches!(err, PlannerError::CorruptRecord { .. }), "{err}");
    }

    #[test]
    fn test_load_rejects_misplaced_login() {
        let dir = tempfile::tempdir().unwrap();
        codec::write_record(&dir.path().join("auth/bob.toml"), &Login::new("alice", "h")).unwrap();

        let err = Store::load(dir.path()).err().unwrap();
        assert!(matches!(err, PlannerError::CorruptRecord { .. }), "{err}");
    }

    #[test]
    fn test_open_exclusive_refuses_second_open() {
        let dir = tempfile::tempdir().unwrap();

        let first = Store::open_exclusive(dir.path()).unwrap();
        first.add_user("bob", "first-hash").unwrap();

        let err = Store::open_exclusive(dir.path()).err().unwrap();
        assert!(matches!(err, PlannerError::DirectoryInUse { .. }), "{err}");

        drop(first);
        let second = Store::open_exclusive(dir.path()).unwrap();
        assert_eq!(second.get_login("bob").unwrap().password_hash, "first-hash");
        assert!(second.add_user("bob", "second-hash").unwrap_err().is_already_exists());
    }

    #[test]
    fn test_load_ignores_temp_files_and_stray_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("users/nested")).unwrap();
        std::fs::create_dir_all(dir.path().join("calendars")).unwrap();
        std::fs::write(dir.path().join("users/alice.toml.tmp"), "garbage").unwrap();
        std::fs::write(dir.path().join("calendars/README"), "not a calendar").unwrap();

        let store = Store::load(dir.path()).unwrap();
        assert!(store.usernames().unwrap().is_empty());
    }

    #[test]
    fn test_load_keeps_dangling_references() {
        let dir = tempfile::tempdir().unwrap();
        let mut user = User::new("bob");
        user.calendar_references.push(crate::record::CalendarReference {
            calendar_id: "gone/gone".to_string(),
            permission: Permission::Read,
        });
        codec::write_record(&dir.path().join("users/bob.toml"), &user).unwrap();

        let store = Store::load(dir.path()).unwrap();
        assert_eq!(store.get_user("bob").unwrap(), user);
        assert!(store.get_calendar("gone/gone").unwrap_err().is_not_found());
    }
}

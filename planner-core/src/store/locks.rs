//! Per-resource locks keyed by username or calendar id.
//!
//! A key is present in the table exactly while its resource exists, so the
//! table doubles as the existence check used when creating resources.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{PlannerError, PlannerResult, ResourceKind};

type ResourceLock = Arc<Mutex<()>>;

#[derive(Default)]
pub(crate) struct ResourceLocks {
    table: Mutex<HashMap<String, ResourceLock>>,
}

impl ResourceLocks {
    fn table(&self) -> PlannerResult<MutexGuard<'_, HashMap<String, ResourceLock>>> {
        self.table
            .lock()
            .map_err(|_| PlannerError::LockPoisoned("lock table"))
    }

    /// Allocate a lock for a resource found on disk at startup.
    pub fn insert(&self, key: &str) -> PlannerResult<()> {
        self.table()?.insert(key.to_string(), ResourceLock::default());
        Ok(())
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> PlannerResult<bool> {
        Ok(self.table()?.contains_key(key))
    }

    /// Drop the lock of a deleted resource.
    pub fn remove(&self, key: &str) -> PlannerResult<()> {
        self.table()?.remove(key);
        Ok(())
    }

    fn is_current(&self, key: &str, lock: &ResourceLock) -> PlannerResult<bool> {
        Ok(self
            .table()?
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, lock)))
    }

    /// Run `f` while holding the lock of an existing resource.
    ///
    /// After acquiring, the lock is checked against the table again: a
    /// waiter whose resource was deleted gets `NotFound`, and one whose
    /// resource was deleted and recreated retries on the new lock.
    pub fn with_lock<T>(
        &self,
        kind: ResourceKind,
        key: &str,
        f: impl FnOnce() -> PlannerResult<T>,
    ) -> PlannerResult<T> {
        loop {
            let lock = self
                .table()?
                .get(key)
                .cloned()
                .ok_or_else(|| PlannerError::not_found(kind, key))?;

            let _guard = lock
                .lock()
                .map_err(|_| PlannerError::LockPoisoned("resource lock"))?;

            if self.is_current(key, &lock)? {
                return f();
            }
        }
    }

    /// Register a lock for a new resource and run `f` while holding it.
    ///
    /// Fails with `AlreadyExists` if the key is taken. If `f` fails and
    /// `created` reports that the resource never came into being, the lock
    /// is released again so the key can be reused.
    pub fn with_new_lock<T>(
        &self,
        kind: ResourceKind,
        key: &str,
        created: impl FnOnce() -> bool,
        f: impl FnOnce() -> PlannerResult<T>,
    ) -> PlannerResult<T> {
        let lock = ResourceLock::default();
        {
            let mut table = self.table()?;
            if table.contains_key(key) {
                return Err(PlannerError::already_exists(kind, key));
            }
            table.insert(key.to_string(), Arc::clone(&lock));
        }

        let _guard = lock
            .lock()
            .map_err(|_| PlannerError::LockPoisoned("resource lock"))?;

        let result = f();
        if result.is_err() && !created() {
            let mut table = self.table()?;
            if table.get(key).is_some_and(|current| Arc::ptr_eq(current, &lock)) {
                table.remove(key);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_with_lock_on_missing_key() {
        let locks = ResourceLocks::default();
        let err = locks
            .with_lock(ResourceKind::User, "ghost", || Ok(()))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_new_lock_rejects_existing_key() {
        let locks = ResourceLocks::default();
        locks.insert("alice").unwrap();

        let err = locks
            .with_new_lock(ResourceKind::User, "alice", || true, || Ok(()))
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_failed_creation_releases_key() {
        let locks = ResourceLocks::default();

        let result: PlannerResult<()> = locks.with_new_lock(
            ResourceKind::User,
            "alice",
            || false,
            || Err(PlannerError::Config("boom".into())),
        );
        assert!(result.is_err());
        assert!(!locks.contains("alice").unwrap());
    }

    #[test]
    fn test_removed_lock_reports_not_found() {
        let locks = ResourceLocks::default();
        locks.insert("alice").unwrap();

        let err = locks
            .with_lock(ResourceKind::User, "alice", || {
                locks.remove("alice")?;
                locks.with_lock(ResourceKind::User, "alice", || Ok(()))
            })
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_with_lock_serializes_same_key() {
        let locks = Arc::new(ResourceLocks::default());
        locks.insert("cal").unwrap();
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    for _ in 0..50 {
                        locks
                            .with_lock(ResourceKind::Calendar, "cal", || {
                                assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                                inside.fetch_sub(1, Ordering::SeqCst);
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

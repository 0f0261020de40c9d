use std::sync::Arc;

use planner_core::Store;

use crate::routes::AppError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }

    /// Run a store operation on the blocking pool.
    ///
    /// Store calls take resource locks and touch the disk, so they never run
    /// on the async workers.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Store) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&*store)).await?
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

pub mod boards;
pub mod habits;

pub use boards::{BoardService, BoardUpdate};
pub use habits::HabitService;

/// One async mutex per entity scope.
///
/// Writers hold the scope lock across the whole load-modify-save, so two
/// concurrent renumberings of the same board or column (or toggles of the
/// same habit) cannot lose each other's updates within this process. Locks
/// are created on first use and kept for the process lifetime.
#[derive(Default)]
pub(crate) struct ScopeLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl ScopeLocks {
    pub async fn acquire(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(key).or_default())
        };
        lock.lock_owned().await
    }
}

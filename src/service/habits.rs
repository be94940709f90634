use crate::domain::{Habit, HabitId, OwnerId};
use crate::error::Result;
use crate::service::ScopeLocks;
use crate::storage::Storage;
use chrono::{Local, NaiveDate};
use std::sync::Arc;

/// Habit operations: creation, listing, the per-day completion toggle, and
/// deletion. Writes against the same habit are serialized so concurrent
/// toggles cannot race-corrupt the completion map.
pub struct HabitService<S> {
    storage: Arc<S>,
    locks: ScopeLocks,
}

impl<S: Storage> HabitService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            locks: ScopeLocks::default(),
        }
    }

    pub async fn create(
        &self,
        owner: OwnerId,
        name: String,
        description: Option<String>,
        goal: u8,
    ) -> Result<Habit> {
        let mut habit = Habit::new(owner, name, goal)?;
        if let Some(description) = description {
            habit = habit.with_description(description);
        }
        self.storage.save_habit(&habit).await?;
        tracing::debug!(habit = %habit.id, "created habit");
        Ok(habit)
    }

    pub async fn list(&self, owner: OwnerId) -> Result<Vec<Habit>> {
        self.storage.list_habits(owner).await
    }

    pub async fn get(&self, owner: OwnerId, id: HabitId) -> Result<Habit> {
        self.storage.load_habit(owner, id).await
    }

    /// Toggles `date` for the habit, recomputing streaks against the current
    /// local calendar day, and returns the updated habit.
    pub async fn toggle_completion(
        &self,
        owner: OwnerId,
        id: HabitId,
        date: NaiveDate,
    ) -> Result<Habit> {
        self.toggle_completion_as_of(owner, id, date, Local::now().date_naive())
            .await
    }

    /// Toggle with the clock injected; the streak walk starts at `today`
    pub async fn toggle_completion_as_of(
        &self,
        owner: OwnerId,
        id: HabitId,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Habit> {
        let _guard = self.locks.acquire(*id.as_uuid()).await;
        let mut habit = self.storage.load_habit(owner, id).await?;
        habit.toggle_completion(date, today);
        self.storage.save_habit(&habit).await?;
        tracing::debug!(habit = %habit.id, %date, streak = habit.streak, "toggled completion");
        Ok(habit)
    }

    pub async fn delete(&self, owner: OwnerId, id: HabitId) -> Result<()> {
        self.storage.delete_habit(owner, id).await?;
        tracing::debug!(habit = %id, "deleted habit");
        Ok(())
    }
}

use crate::domain::ids::{HabitId, OwnerId};
use crate::error::{DayflowError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum weekly goal (days per week)
pub const MIN_GOAL: u8 = 1;
/// Maximum weekly goal (days per week)
pub const MAX_GOAL: u8 = 7;

/// A tracked habit with its per-day completion history and streak counters.
///
/// Completions are keyed by calendar day. The convention is presence-is-complete:
/// marking a day inserts `true`, unmarking removes the key entirely. Readers
/// still require present-and-true, so a stray `false` left by older data
/// counts as incomplete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub owner_id: OwnerId,
    pub name: String,
    pub description: Option<String>,
    /// Target days per week, 1..=7
    pub goal: u8,
    #[serde(default)]
    pub completions: BTreeMap<NaiveDate, bool>,
    pub streak: u32,
    pub longest_streak: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Progress against the weekly goal for one 7-day window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub completed: u32,
    pub total: u8,
    pub percentage: u32,
}

/// Lifetime summary counters for a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStats {
    pub total_days: u32,
    pub completion_rate: u32,
    pub streak: u32,
    pub longest_streak: u32,
}

impl Habit {
    /// Creates a new habit with an empty completion history
    pub fn new(owner_id: OwnerId, name: String, goal: u8) -> Result<Self> {
        validate_goal(goal)?;
        if name.trim().is_empty() {
            return Err(DayflowError::ValidationError(
                "habit name must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: HabitId::new(),
            owner_id,
            name,
            description: None,
            goal,
            completions: BTreeMap::new(),
            streak: 0,
            longest_streak: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    /// Whether `date` is marked complete (present-and-true)
    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completions.get(&date).copied().unwrap_or(false)
    }

    /// Toggles the completion mark for a calendar day, then recomputes the
    /// streak counters.
    ///
    /// Any date toggles identically; there is no future-date guard here, the
    /// UI is expected to prevent future-dating but callers are not trusted to.
    /// The streak walk starts at `today`, not at `date`, so toggling a day
    /// that is not contiguous with today leaves the current streak unchanged.
    pub fn toggle_completion(&mut self, date: NaiveDate, today: NaiveDate) {
        if self.completions.contains_key(&date) {
            self.completions.remove(&date);
        } else {
            self.completions.insert(date, true);
        }
        self.recompute_streak(today);
        self.updated_at = Utc::now();
    }

    /// Walks backward day-by-day from `today` while each day is marked,
    /// stopping at the first gap. `longest_streak` never decreases.
    fn recompute_streak(&mut self, today: NaiveDate) {
        let mut streak = 0u32;
        let mut day = today;
        while self.is_completed_on(day) {
            streak += 1;
            day = day - Duration::days(1);
        }
        self.streak = streak;
        self.longest_streak = self.longest_streak.max(streak);
    }

    /// Counts completed days among the 7 starting at `week_start`.
    ///
    /// `percentage` is measured against the weekly goal and may exceed 100
    /// when more days are completed than the goal asks for; it is not clamped.
    pub fn weekly_progress(&self, week_start: NaiveDate) -> WeeklyProgress {
        let completed = (0..7)
            .filter(|offset| self.is_completed_on(week_start + Duration::days(*offset)))
            .count() as u32;

        WeeklyProgress {
            completed,
            total: self.goal,
            percentage: percentage_of_goal(completed, self.goal),
        }
    }

    /// Lifetime counters. `completion_rate` divides total completed days by
    /// the weekly goal number, matching what the tracker has always shown.
    pub fn stats(&self) -> HabitStats {
        let total_days = self.completions.values().filter(|done| **done).count() as u32;

        HabitStats {
            total_days,
            completion_rate: percentage_of_goal(total_days, self.goal),
            streak: self.streak,
            longest_streak: self.longest_streak,
        }
    }
}

pub(crate) fn validate_goal(goal: u8) -> Result<()> {
    if !(MIN_GOAL..=MAX_GOAL).contains(&goal) {
        return Err(DayflowError::ValidationError(format!(
            "goal must be between {} and {} days per week, got {}",
            MIN_GOAL, MAX_GOAL, goal
        )));
    }
    Ok(())
}

fn percentage_of_goal(count: u32, goal: u8) -> u32 {
    ((count as f64 / goal as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(goal: u8) -> Habit {
        Habit::new(OwnerId::new(), "Read".to_string(), goal).unwrap()
    }

    #[test]
    fn test_new_habit_starts_empty() {
        let habit = habit(3);
        assert!(habit.completions.is_empty());
        assert_eq!(habit.streak, 0);
        assert_eq!(habit.longest_streak, 0);
    }

    #[test]
    fn test_goal_must_be_one_to_seven() {
        let owner = OwnerId::new();
        assert!(Habit::new(owner, "Run".to_string(), 0).is_err());
        assert!(Habit::new(owner, "Run".to_string(), 8).is_err());
        assert!(Habit::new(owner, "Run".to_string(), 1).is_ok());
        assert!(Habit::new(owner, "Run".to_string(), 7).is_ok());
    }

    #[test]
    fn test_name_must_not_be_empty() {
        assert!(Habit::new(OwnerId::new(), "  ".to_string(), 3).is_err());
    }

    #[test]
    fn test_toggle_marks_and_unmarks() {
        let mut habit = habit(3);
        let today = date(2024, 1, 3);

        habit.toggle_completion(today, today);
        assert!(habit.is_completed_on(today));

        habit.toggle_completion(today, today);
        assert!(!habit.is_completed_on(today));
        assert!(habit.completions.is_empty());
    }

    #[test]
    fn test_toggle_pair_restores_streak() {
        let mut habit = habit(3);
        let today = date(2024, 1, 3);
        habit.toggle_completion(date(2024, 1, 2), today);
        habit.toggle_completion(today, today);
        let before = habit.streak;

        habit.toggle_completion(date(2024, 1, 1), today);
        habit.toggle_completion(date(2024, 1, 1), today);

        assert_eq!(habit.streak, before);
    }

    #[test]
    fn test_streak_counts_back_from_today() {
        let mut habit = habit(3);
        let today = date(2024, 1, 3);

        habit.toggle_completion(date(2024, 1, 1), today);
        habit.toggle_completion(date(2024, 1, 2), today);
        assert_eq!(habit.streak, 0, "today itself is not yet complete");

        habit.toggle_completion(today, today);
        assert_eq!(habit.streak, 3);
        assert_eq!(habit.longest_streak, 3);
    }

    #[test]
    fn test_streak_stops_at_first_gap() {
        let mut habit = habit(7);
        let today = date(2024, 3, 10);

        habit.toggle_completion(date(2024, 3, 7), today);
        habit.toggle_completion(date(2024, 3, 9), today);
        habit.toggle_completion(today, today);

        // 03-08 is missing, so the chain is 03-10 and 03-09 only
        assert_eq!(habit.streak, 2);
    }

    #[test]
    fn test_toggling_noncontiguous_past_date_leaves_streak() {
        let mut habit = habit(3);
        let today = date(2024, 6, 15);
        habit.toggle_completion(today, today);
        assert_eq!(habit.streak, 1);

        habit.toggle_completion(date(2024, 6, 1), today);
        assert_eq!(habit.streak, 1);
    }

    #[test]
    fn test_future_date_has_no_guard_but_no_streak_effect() {
        let mut habit = habit(3);
        let today = date(2024, 6, 15);

        habit.toggle_completion(date(2024, 6, 16), today);
        assert!(habit.is_completed_on(date(2024, 6, 16)));
        assert_eq!(habit.streak, 0, "walk starts at today, which is unmarked");
    }

    #[test]
    fn test_longest_streak_never_decreases() {
        let mut habit = habit(7);
        let today = date(2024, 1, 5);
        for day in 3..=5 {
            habit.toggle_completion(date(2024, 1, day), today);
        }
        assert_eq!(habit.streak, 3);
        assert_eq!(habit.longest_streak, 3);

        // Break the chain in the middle
        habit.toggle_completion(date(2024, 1, 4), today);
        assert_eq!(habit.streak, 1);
        assert_eq!(habit.longest_streak, 3);
    }

    #[test]
    fn test_stray_false_entry_reads_as_incomplete() {
        let mut habit = habit(3);
        let today = date(2024, 1, 2);
        habit.completions.insert(date(2024, 1, 1), false);
        habit.toggle_completion(today, today);

        assert_eq!(habit.streak, 1);
        assert_eq!(habit.stats().total_days, 1);
    }

    #[test]
    fn test_weekly_progress_counts_only_the_window() {
        let mut habit = habit(3);
        let week_start = date(2024, 1, 1); // Monday
        let today = date(2024, 1, 7);

        habit.toggle_completion(date(2024, 1, 2), today);
        habit.toggle_completion(date(2024, 1, 4), today);
        habit.toggle_completion(date(2023, 12, 31), today); // previous week

        let progress = habit.weekly_progress(week_start);
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percentage, 67);
    }

    #[test]
    fn test_weekly_progress_can_exceed_one_hundred_percent() {
        let mut habit = habit(3);
        let week_start = date(2024, 1, 1);
        let today = date(2024, 1, 7);
        for day in 1..=4 {
            habit.toggle_completion(date(2024, 1, day), today);
        }

        let progress = habit.weekly_progress(week_start);
        assert_eq!(progress.completed, 4);
        assert_eq!(progress.percentage, 133);
    }

    #[test]
    fn test_weekly_progress_never_exceeds_seven_days() {
        let mut habit = habit(1);
        let week_start = date(2024, 1, 1);
        let today = date(2024, 1, 14);
        for day in 1..=14 {
            habit.toggle_completion(date(2024, 1, day), today);
        }

        let progress = habit.weekly_progress(week_start);
        assert_eq!(progress.completed, 7);
    }

    #[test]
    fn test_stats_uses_lifetime_total_over_weekly_goal() {
        let mut habit = habit(4);
        let today = date(2024, 2, 10);
        habit.toggle_completion(date(2024, 1, 1), today);
        habit.toggle_completion(date(2024, 1, 15), today);

        let stats = habit.stats();
        assert_eq!(stats.total_days, 2);
        assert_eq!(stats.completion_rate, 50);
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.longest_streak, 0);
    }

    #[test]
    fn test_streak_invariants_hold_after_many_toggles() {
        let mut habit = habit(5);
        let today = date(2024, 4, 20);
        let days = [20, 19, 18, 19, 17, 20, 20, 15];
        for day in days {
            habit.toggle_completion(date(2024, 4, day), today);
        }

        let marked = habit.completions.values().filter(|done| **done).count() as u32;
        assert!(habit.streak <= marked);
        assert!(habit.longest_streak >= habit.streak);
    }
}

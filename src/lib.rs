//! # Dayflow Core
//!
//! Core business logic and domain models for Dayflow personal productivity.
//!
//! This crate provides the fundamental types and operations for habit
//! tracking (per-day completions and streaks) and kanban boards (columns and
//! cards with positional ordering) without any dependency on specific UI
//! implementations or storage backends.

pub mod domain;
pub mod error;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use domain::{
    board::{Board, Card, Column},
    habit::{Habit, HabitStats, WeeklyProgress},
    ids::{BoardId, CardId, ColumnId, HabitId, OwnerId},
};
pub use error::{DayflowError, Result};
pub use service::{BoardService, BoardUpdate, HabitService};
pub use storage::Storage;

pub mod board;
pub mod habit;
pub mod ids;
pub mod ordering;

pub use board::{Board, Card, Column, DEFAULT_BACKGROUND, DEFAULT_COLUMNS};
pub use habit::{Habit, HabitStats, WeeklyProgress, MAX_GOAL, MIN_GOAL};
pub use ids::{BoardId, CardId, ColumnId, HabitId, OwnerId};
pub use ordering::{apply_explicit_order, move_within, next_position, shift_for_insert, Positioned};

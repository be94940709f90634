use crate::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId, Habit, HabitId, OwnerId},
    error::Result,
};
use async_trait::async_trait;

pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Storage trait for persisting habits, boards, columns and cards.
///
/// Every load and list is scoped by owner; an entity that exists but belongs
/// to someone else is reported exactly like one that does not exist. Writes
/// are atomic per entity only. Multi-entity sequences (batch saves, cascading
/// deletes) are best-effort: a crash mid-sequence can leave position gaps or
/// orphans, and readers tolerate both by re-sorting and filtering.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Saves a habit (insert or overwrite)
    async fn save_habit(&self, habit: &Habit) -> Result<()>;

    /// Loads one habit owned by `owner`
    async fn load_habit(&self, owner: OwnerId, id: HabitId) -> Result<Habit>;

    /// Lists all habits owned by `owner`
    async fn list_habits(&self, owner: OwnerId) -> Result<Vec<Habit>>;

    /// Deletes one habit owned by `owner`
    async fn delete_habit(&self, owner: OwnerId, id: HabitId) -> Result<()>;

    /// Saves a board (insert or overwrite)
    async fn save_board(&self, board: &Board) -> Result<()>;

    /// Loads one board owned by `owner`
    async fn load_board(&self, owner: OwnerId, id: BoardId) -> Result<Board>;

    /// Lists all boards owned by `owner`, unsorted
    async fn list_boards(&self, owner: OwnerId) -> Result<Vec<Board>>;

    /// Deletes one board owned by `owner`; children are the caller's problem
    async fn delete_board(&self, owner: OwnerId, id: BoardId) -> Result<()>;

    /// Saves a column (insert or overwrite)
    async fn save_column(&self, column: &Column) -> Result<()>;

    /// Saves a batch of columns as a sequence of independent writes
    async fn save_columns(&self, columns: &[Column]) -> Result<()> {
        for column in columns {
            self.save_column(column).await?;
        }
        Ok(())
    }

    /// Loads one column owned by `owner`
    async fn load_column(&self, owner: OwnerId, id: ColumnId) -> Result<Column>;

    /// Lists the columns of one board, sorted by position ascending
    async fn list_columns(&self, owner: OwnerId, board_id: BoardId) -> Result<Vec<Column>>;

    /// Deletes one column owned by `owner`; its cards are the caller's problem
    async fn delete_column(&self, owner: OwnerId, id: ColumnId) -> Result<()>;

    /// Saves a card (insert or overwrite)
    async fn save_card(&self, card: &Card) -> Result<()>;

    /// Saves a batch of cards as a sequence of independent writes
    async fn save_cards(&self, cards: &[Card]) -> Result<()> {
        for card in cards {
            self.save_card(card).await?;
        }
        Ok(())
    }

    /// Loads one card owned by `owner`
    async fn load_card(&self, owner: OwnerId, id: CardId) -> Result<Card>;

    /// Lists the cards of one column, sorted by position ascending
    async fn list_cards(&self, owner: OwnerId, column_id: ColumnId) -> Result<Vec<Card>>;

    /// Deletes one card owned by `owner`
    async fn delete_card(&self, owner: OwnerId, id: CardId) -> Result<()>;
}

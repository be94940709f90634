use crate::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId, Habit, HabitId, OwnerId},
    error::{DayflowError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage implementation.
///
/// Each entity is one pretty-printed JSON file named by its id, grouped into
/// a directory per entity kind under the `.dayflow` root. Listing is a
/// directory scan with owner filtering; files that fail to parse are skipped
/// rather than failing the whole listing.
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const DAYFLOW_DIR: &'static str = ".dayflow";
    const HABITS_DIR: &'static str = "habits";
    const BOARDS_DIR: &'static str = "boards";
    const COLUMNS_DIR: &'static str = "columns";
    const CARDS_DIR: &'static str = "cards";

    /// Creates a new FileStorage instance for the given data root
    pub fn new(data_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: data_root.as_ref().join(Self::DAYFLOW_DIR),
        }
    }

    fn habits_dir(&self) -> PathBuf {
        self.root_path.join(Self::HABITS_DIR)
    }

    fn boards_dir(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_DIR)
    }

    fn columns_dir(&self) -> PathBuf {
        self.root_path.join(Self::COLUMNS_DIR)
    }

    fn cards_dir(&self) -> PathBuf {
        self.root_path.join(Self::CARDS_DIR)
    }

    fn entity_file(dir: PathBuf, id: impl ToString) -> PathBuf {
        dir.join(format!("{}.json", id.to_string()))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_entity<T: Serialize>(&self, dir: PathBuf, id: impl ToString, entity: &T) -> Result<()> {
        self.ensure_directory_exists(&dir).await?;
        let json = serde_json::to_string_pretty(entity)?;
        fs::write(Self::entity_file(dir, id), json).await?;
        Ok(())
    }

    async fn read_entity<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).await?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn scan_entities<T: DeserializeOwned>(dir: PathBuf) -> Result<Vec<T>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await?;
        let mut entities = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(&path).await?;
            match serde_json::from_str(&contents) {
                Ok(entity) => entities.push(entity),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping unreadable entity file");
                }
            }
        }

        Ok(entities)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.habits_dir()).await?;
        self.ensure_directory_exists(&self.boards_dir()).await?;
        self.ensure_directory_exists(&self.columns_dir()).await?;
        self.ensure_directory_exists(&self.cards_dir()).await?;

        // Create .gitignore
        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "# Local caches\n*.db\n*.db-*\n").await?;
        }

        Ok(())
    }

    async fn save_habit(&self, habit: &Habit) -> Result<()> {
        self.write_entity(self.habits_dir(), habit.id, habit).await
    }

    async fn load_habit(&self, owner: OwnerId, id: HabitId) -> Result<Habit> {
        let path = Self::entity_file(self.habits_dir(), id);
        match Self::read_entity::<Habit>(&path).await? {
            Some(habit) if habit.owner_id == owner => Ok(habit),
            _ => Err(DayflowError::HabitNotFound(id.to_string())),
        }
    }

    async fn list_habits(&self, owner: OwnerId) -> Result<Vec<Habit>> {
        let mut habits: Vec<Habit> = Self::scan_entities(self.habits_dir())
            .await?
            .into_iter()
            .filter(|habit: &Habit| habit.owner_id == owner)
            .collect();
        habits.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(habits)
    }

    async fn delete_habit(&self, owner: OwnerId, id: HabitId) -> Result<()> {
        self.load_habit(owner, id).await?;
        fs::remove_file(Self::entity_file(self.habits_dir(), id)).await?;
        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        self.write_entity(self.boards_dir(), board.id, board).await
    }

    async fn load_board(&self, owner: OwnerId, id: BoardId) -> Result<Board> {
        let path = Self::entity_file(self.boards_dir(), id);
        match Self::read_entity::<Board>(&path).await? {
            Some(board) if board.owner_id == owner => Ok(board),
            _ => Err(DayflowError::BoardNotFound(id.to_string())),
        }
    }

    async fn list_boards(&self, owner: OwnerId) -> Result<Vec<Board>> {
        Ok(Self::scan_entities(self.boards_dir())
            .await?
            .into_iter()
            .filter(|board: &Board| board.owner_id == owner)
            .collect())
    }

    async fn delete_board(&self, owner: OwnerId, id: BoardId) -> Result<()> {
        self.load_board(owner, id).await?;
        fs::remove_file(Self::entity_file(self.boards_dir(), id)).await?;
        Ok(())
    }

    async fn save_column(&self, column: &Column) -> Result<()> {
        self.write_entity(self.columns_dir(), column.id, column).await
    }

    async fn load_column(&self, owner: OwnerId, id: ColumnId) -> Result<Column> {
        let path = Self::entity_file(self.columns_dir(), id);
        match Self::read_entity::<Column>(&path).await? {
            Some(column) if column.owner_id == owner => Ok(column),
            _ => Err(DayflowError::ColumnNotFound(id.to_string())),
        }
    }

    async fn list_columns(&self, owner: OwnerId, board_id: BoardId) -> Result<Vec<Column>> {
        let mut columns: Vec<Column> = Self::scan_entities(self.columns_dir())
            .await?
            .into_iter()
            .filter(|column: &Column| column.owner_id == owner && column.board_id == board_id)
            .collect();
        columns.sort_by_key(|column| column.position);
        Ok(columns)
    }

    async fn delete_column(&self, owner: OwnerId, id: ColumnId) -> Result<()> {
        self.load_column(owner, id).await?;
        fs::remove_file(Self::entity_file(self.columns_dir(), id)).await?;
        Ok(())
    }

    async fn save_card(&self, card: &Card) -> Result<()> {
        self.write_entity(self.cards_dir(), card.id, card).await
    }

    async fn load_card(&self, owner: OwnerId, id: CardId) -> Result<Card> {
        let path = Self::entity_file(self.cards_dir(), id);
        match Self::read_entity::<Card>(&path).await? {
            Some(card) if card.owner_id == owner => Ok(card),
            _ => Err(DayflowError::CardNotFound(id.to_string())),
        }
    }

    async fn list_cards(&self, owner: OwnerId, column_id: ColumnId) -> Result<Vec<Card>> {
        let mut cards: Vec<Card> = Self::scan_entities(self.cards_dir())
            .await?
            .into_iter()
            .filter(|card: &Card| card.owner_id == owner && card.column_id == column_id)
            .collect();
        cards.sort_by_key(|card| card.position);
        Ok(cards)
    }

    async fn delete_card(&self, owner: OwnerId, id: CardId) -> Result<()> {
        self.load_card(owner, id).await?;
        fs::remove_file(Self::entity_file(self.cards_dir(), id)).await?;
        Ok(())
    }
}

use crate::{
    domain::{Board, BoardId, Card, CardId, Column, ColumnId, Habit, HabitId, OwnerId},
    error::{DayflowError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// SQLite-based storage backend.
///
/// A single connection guarded by a mutex; every statement runs to completion
/// while it is held. Dates are RFC 3339 text, ids are their string forms, and
/// the habit completion map is a JSON text column.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and applies the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DayflowError::StorageError("sqlite mutex poisoned".to_string()))
    }
}

fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
}

fn timestamp_at(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .map_err(|err| conversion_error(index, err))
}

fn id_at<T: FromStr<Err = DayflowError>>(row: &Row<'_>, index: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(index)?;
    T::from_str(&raw).map_err(|err| conversion_error(index, err))
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let completions_json: String = row.get(5)?;
    let completions: BTreeMap<chrono::NaiveDate, bool> =
        serde_json::from_str(&completions_json).map_err(|err| conversion_error(5, err))?;

    Ok(Habit {
        id: id_at(row, 0)?,
        owner_id: id_at(row, 1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        goal: row.get::<_, i64>(4)? as u8,
        completions,
        streak: row.get::<_, i64>(6)? as u32,
        longest_streak: row.get::<_, i64>(7)? as u32,
        created_at: timestamp_at(row, 8)?,
        updated_at: timestamp_at(row, 9)?,
    })
}

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: id_at(row, 0)?,
        owner_id: id_at(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        background: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

fn column_from_row(row: &Row<'_>) -> rusqlite::Result<Column> {
    Ok(Column {
        id: id_at(row, 0)?,
        board_id: id_at(row, 1)?,
        owner_id: id_at(row, 2)?,
        title: row.get(3)?,
        position: row.get::<_, i64>(4)? as u32,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: id_at(row, 0)?,
        column_id: id_at(row, 1)?,
        owner_id: id_at(row, 2)?,
        content: row.get(3)?,
        position: row.get::<_, i64>(4)? as u32,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        // Schema is applied on open; nothing further to do
        Ok(())
    }

    async fn save_habit(&self, habit: &Habit) -> Result<()> {
        let completions_json = serde_json::to_string(&habit.completions)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO habits (
               id, owner_id, name, description, goal, completions_json,
               streak, longest_streak, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                habit.id.to_string(),
                habit.owner_id.to_string(),
                habit.name,
                habit.description,
                habit.goal as i64,
                completions_json,
                habit.streak as i64,
                habit.longest_streak as i64,
                habit.created_at.to_rfc3339(),
                habit.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn load_habit(&self, owner: OwnerId, id: HabitId) -> Result<Habit> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, owner_id, name, description, goal, completions_json,
                    streak, longest_streak, created_at, updated_at
             FROM habits WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
            habit_from_row,
        )
        .optional()?
        .ok_or_else(|| DayflowError::HabitNotFound(id.to_string()))
    }

    async fn list_habits(&self, owner: OwnerId) -> Result<Vec<Habit>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, name, description, goal, completions_json,
                    streak, longest_streak, created_at, updated_at
             FROM habits WHERE owner_id = ?1 ORDER BY created_at ASC",
        )?;
        let habits = stmt
            .query_map(params![owner.to_string()], habit_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(habits)
    }

    async fn delete_habit(&self, owner: OwnerId, id: HabitId) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
        )?;
        if deleted == 0 {
            return Err(DayflowError::HabitNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO boards (
               id, owner_id, title, description, background, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                board.id.to_string(),
                board.owner_id.to_string(),
                board.title,
                board.description,
                board.background,
                board.created_at.to_rfc3339(),
                board.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn load_board(&self, owner: OwnerId, id: BoardId) -> Result<Board> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, owner_id, title, description, background, created_at, updated_at
             FROM boards WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
            board_from_row,
        )
        .optional()?
        .ok_or_else(|| DayflowError::BoardNotFound(id.to_string()))
    }

    async fn list_boards(&self, owner: OwnerId) -> Result<Vec<Board>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, title, description, background, created_at, updated_at
             FROM boards WHERE owner_id = ?1",
        )?;
        let boards = stmt
            .query_map(params![owner.to_string()], board_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(boards)
    }

    async fn delete_board(&self, owner: OwnerId, id: BoardId) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM boards WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
        )?;
        if deleted == 0 {
            return Err(DayflowError::BoardNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_column(&self, column: &Column) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO columns (
               id, board_id, owner_id, title, position, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                column.id.to_string(),
                column.board_id.to_string(),
                column.owner_id.to_string(),
                column.title,
                column.position as i64,
                column.created_at.to_rfc3339(),
                column.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn load_column(&self, owner: OwnerId, id: ColumnId) -> Result<Column> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, board_id, owner_id, title, position, created_at, updated_at
             FROM columns WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
            column_from_row,
        )
        .optional()?
        .ok_or_else(|| DayflowError::ColumnNotFound(id.to_string()))
    }

    async fn list_columns(&self, owner: OwnerId, board_id: BoardId) -> Result<Vec<Column>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, board_id, owner_id, title, position, created_at, updated_at
             FROM columns WHERE owner_id = ?1 AND board_id = ?2 ORDER BY position ASC",
        )?;
        let columns = stmt
            .query_map(params![owner.to_string(), board_id.to_string()], column_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    async fn delete_column(&self, owner: OwnerId, id: ColumnId) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM columns WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
        )?;
        if deleted == 0 {
            return Err(DayflowError::ColumnNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_card(&self, card: &Card) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO cards (
               id, column_id, owner_id, content, position, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                card.id.to_string(),
                card.column_id.to_string(),
                card.owner_id.to_string(),
                card.content,
                card.position as i64,
                card.created_at.to_rfc3339(),
                card.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn load_card(&self, owner: OwnerId, id: CardId) -> Result<Card> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, column_id, owner_id, content, position, created_at, updated_at
             FROM cards WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
            card_from_row,
        )
        .optional()?
        .ok_or_else(|| DayflowError::CardNotFound(id.to_string()))
    }

    async fn list_cards(&self, owner: OwnerId, column_id: ColumnId) -> Result<Vec<Card>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, column_id, owner_id, content, position, created_at, updated_at
             FROM cards WHERE owner_id = ?1 AND column_id = ?2 ORDER BY position ASC",
        )?;
        let cards = stmt
            .query_map(params![owner.to_string(), column_id.to_string()], card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    async fn delete_card(&self, owner: OwnerId, id: CardId) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM cards WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
        )?;
        if deleted == 0 {
            return Err(DayflowError::CardNotFound(id.to_string()));
        }
        Ok(())
    }
}

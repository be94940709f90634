use crate::domain::ids::{BoardId, CardId, ColumnId, OwnerId};
use crate::domain::ordering::Positioned;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column titles seeded into every new board
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Default board background color
pub const DEFAULT_BACKGROUND: &str = "#f3f4f6";

/// A kanban board owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub owner_id: OwnerId,
    pub title: String,
    pub description: Option<String>,
    pub background: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn new(owner_id: OwnerId, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: BoardId::new(),
            owner_id,
            title,
            description: None,
            background: DEFAULT_BACKGROUND.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_background(mut self, background: String) -> Self {
        self.background = background;
        self
    }

    /// The three columns every board starts with, at positions 0, 1, 2
    pub fn default_columns(&self) -> Vec<Column> {
        DEFAULT_COLUMNS
            .iter()
            .enumerate()
            .map(|(index, title)| {
                Column::new(self.owner_id, self.id, (*title).to_string(), index as u32)
            })
            .collect()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A column within a board. Positions are dense 0..N-1 while the board is
/// only being reordered; deletes leave gaps until the next explicit reorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub owner_id: OwnerId,
    pub title: String,
    pub position: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    pub fn new(owner_id: OwnerId, board_id: BoardId, title: String, position: u32) -> Self {
        let now = Utc::now();
        Self {
            id: ColumnId::new(),
            board_id,
            owner_id,
            title,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }
}

impl Positioned for Column {
    type Id = ColumnId;

    fn entity_id(&self) -> ColumnId {
        self.id
    }

    fn position(&self) -> u32 {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = position;
        self.updated_at = Utc::now();
    }
}

/// A card within a column, same positioning rules as columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub column_id: ColumnId,
    pub owner_id: OwnerId,
    pub content: String,
    pub position: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(owner_id: OwnerId, column_id: ColumnId, content: String, position: u32) -> Self {
        let now = Utc::now();
        Self {
            id: CardId::new(),
            column_id,
            owner_id,
            content,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.updated_at = Utc::now();
    }

    /// Repoints the card at another column as part of a cross-column move
    pub fn move_to(&mut self, column_id: ColumnId, position: u32) {
        self.column_id = column_id;
        self.position = position;
        self.updated_at = Utc::now();
    }
}

impl Positioned for Card {
    type Id = CardId;

    fn entity_id(&self) -> CardId {
        self.id
    }

    fn position(&self) -> u32 {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = position;
        self.updated_at = Utc::now();
    }
}

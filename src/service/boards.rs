use crate::domain::{
    apply_explicit_order, move_within, next_position, shift_for_insert, Board, BoardId, Card,
    CardId, Column, ColumnId, OwnerId,
};
use crate::error::{DayflowError, Result};
use crate::service::ScopeLocks;
use crate::storage::Storage;
use std::sync::Arc;

/// Partial update for a board; unset fields are left alone
#[derive(Debug, Default, Clone)]
pub struct BoardUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub background: Option<String>,
}

/// Board, column and card operations, including all positional ordering.
///
/// Ordering invariants are scoped: column positions within a board, card
/// positions within a column. Moves and explicit reorders keep a scope
/// dense; deletes leave gaps that readers tolerate by sorting on position.
/// Writes that renumber a scope hold that scope's lock for the whole
/// load-modify-save.
pub struct BoardService<S> {
    storage: Arc<S>,
    locks: ScopeLocks,
}

impl<S: Storage> BoardService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            locks: ScopeLocks::default(),
        }
    }

    /// Creates a board and seeds it with the three default columns
    pub async fn create_board(
        &self,
        owner: OwnerId,
        title: String,
        description: Option<String>,
        background: Option<String>,
    ) -> Result<Board> {
        validate_text("board title", &title)?;

        let mut board = Board::new(owner, title);
        if let Some(description) = description {
            board = board.with_description(description);
        }
        if let Some(background) = background {
            board = board.with_background(background);
        }

        self.storage.save_board(&board).await?;
        for column in board.default_columns() {
            self.storage.save_column(&column).await?;
        }
        tracing::debug!(board = %board.id, "created board with default columns");
        Ok(board)
    }

    /// All boards of the owner, most recently updated first
    pub async fn list_boards(&self, owner: OwnerId) -> Result<Vec<Board>> {
        let mut boards = self.storage.list_boards(owner).await?;
        boards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(boards)
    }

    pub async fn get_board(&self, owner: OwnerId, id: BoardId) -> Result<Board> {
        self.storage.load_board(owner, id).await
    }

    pub async fn update_board(
        &self,
        owner: OwnerId,
        id: BoardId,
        update: BoardUpdate,
    ) -> Result<Board> {
        let mut board = self.storage.load_board(owner, id).await?;
        if let Some(title) = update.title {
            validate_text("board title", &title)?;
            board.title = title;
        }
        if let Some(description) = update.description {
            board.description = Some(description);
        }
        if let Some(background) = update.background {
            board.background = background;
        }
        board.touch();
        self.storage.save_board(&board).await?;
        Ok(board)
    }

    /// Deletes a board, its columns, and their cards.
    ///
    /// The cascade is a best-effort sequence of independent deletes, children
    /// first, so an interruption can only strand children that readers
    /// already filter out by parent.
    pub async fn delete_board(&self, owner: OwnerId, id: BoardId) -> Result<()> {
        let _guard = self.locks.acquire(*id.as_uuid()).await;
        let board = self.storage.load_board(owner, id).await?;

        let columns = self.storage.list_columns(owner, board.id).await?;
        for column in &columns {
            let cards = self.storage.list_cards(owner, column.id).await?;
            for card in cards {
                self.storage.delete_card(owner, card.id).await?;
            }
        }
        for column in &columns {
            self.storage.delete_column(owner, column.id).await?;
        }
        self.storage.delete_board(owner, board.id).await?;

        tracing::debug!(board = %id, columns = columns.len(), "deleted board with cascade");
        Ok(())
    }

    /// Appends a column after the board's current highest position
    pub async fn create_column(
        &self,
        owner: OwnerId,
        board_id: BoardId,
        title: String,
    ) -> Result<Column> {
        validate_text("column title", &title)?;

        let _guard = self.locks.acquire(*board_id.as_uuid()).await;
        self.storage.load_board(owner, board_id).await?;
        let columns = self.storage.list_columns(owner, board_id).await?;
        let column = Column::new(owner, board_id, title, next_position(&columns));
        self.storage.save_column(&column).await?;
        Ok(column)
    }

    pub async fn list_columns(&self, owner: OwnerId, board_id: BoardId) -> Result<Vec<Column>> {
        self.storage.list_columns(owner, board_id).await
    }

    pub async fn rename_column(
        &self,
        owner: OwnerId,
        id: ColumnId,
        title: String,
    ) -> Result<Column> {
        validate_text("column title", &title)?;
        let mut column = self.storage.load_column(owner, id).await?;
        column.set_title(title);
        self.storage.save_column(&column).await?;
        Ok(column)
    }

    /// Moves a column to `target_index` within its board and renumbers the
    /// board's columns densely. Returns the columns in their new order.
    pub async fn move_column(
        &self,
        owner: OwnerId,
        id: ColumnId,
        target_index: usize,
    ) -> Result<Vec<Column>> {
        let column = self.storage.load_column(owner, id).await?;

        let _guard = self.locks.acquire(*column.board_id.as_uuid()).await;
        let mut columns = self.storage.list_columns(owner, column.board_id).await?;
        if !move_within(&mut columns, id, target_index) {
            return Err(DayflowError::ColumnNotFound(id.to_string()));
        }
        self.storage.save_columns(&columns).await?;

        columns.sort_by_key(|column| column.position);
        Ok(columns)
    }

    /// Applies a full explicit column ordering for one board. The id list
    /// must cover exactly the board's current columns.
    pub async fn reorder_columns(
        &self,
        owner: OwnerId,
        board_id: BoardId,
        ordered_ids: &[ColumnId],
    ) -> Result<Vec<Column>> {
        let _guard = self.locks.acquire(*board_id.as_uuid()).await;
        self.storage.load_board(owner, board_id).await?;
        let mut columns = self.storage.list_columns(owner, board_id).await?;
        apply_explicit_order(&mut columns, ordered_ids)?;
        self.storage.save_columns(&columns).await?;

        columns.sort_by_key(|column| column.position);
        Ok(columns)
    }

    /// Deletes a column and all of its cards. Sibling columns keep their
    /// positions; the gap stays until the next explicit reorder.
    pub async fn delete_column(&self, owner: OwnerId, id: ColumnId) -> Result<()> {
        let column = self.storage.load_column(owner, id).await?;

        let _guard = self.locks.acquire(*column.board_id.as_uuid()).await;
        let cards = self.storage.list_cards(owner, column.id).await?;
        for card in &cards {
            self.storage.delete_card(owner, card.id).await?;
        }
        self.storage.delete_column(owner, column.id).await?;

        tracing::debug!(column = %id, cards = cards.len(), "deleted column with cascade");
        Ok(())
    }

    /// Appends a card after the column's current highest position
    pub async fn create_card(
        &self,
        owner: OwnerId,
        column_id: ColumnId,
        content: String,
    ) -> Result<Card> {
        validate_text("card content", &content)?;

        let _guard = self.locks.acquire(*column_id.as_uuid()).await;
        self.storage.load_column(owner, column_id).await?;
        let cards = self.storage.list_cards(owner, column_id).await?;
        let card = Card::new(owner, column_id, content, next_position(&cards));
        self.storage.save_card(&card).await?;
        Ok(card)
    }

    pub async fn list_cards(&self, owner: OwnerId, column_id: ColumnId) -> Result<Vec<Card>> {
        self.storage.list_cards(owner, column_id).await
    }

    pub async fn update_card_content(
        &self,
        owner: OwnerId,
        id: CardId,
        content: String,
    ) -> Result<Card> {
        validate_text("card content", &content)?;
        let mut card = self.storage.load_card(owner, id).await?;
        card.set_content(content);
        self.storage.save_card(&card).await?;
        Ok(card)
    }

    /// Moves a card either within its column or across columns.
    ///
    /// Within a column the whole scope is renumbered densely. Across columns
    /// the destination makes room by shifting entries at or after the target
    /// position, while the source column is left untouched; its gap is
    /// tolerated until the next explicit reorder there.
    pub async fn move_card(
        &self,
        owner: OwnerId,
        id: CardId,
        to_column: ColumnId,
        target_index: usize,
    ) -> Result<Card> {
        let mut card = self.storage.load_card(owner, id).await?;

        if card.column_id == to_column {
            let _guard = self.locks.acquire(*to_column.as_uuid()).await;
            let mut cards = self.storage.list_cards(owner, to_column).await?;
            if !move_within(&mut cards, id, target_index) {
                return Err(DayflowError::CardNotFound(id.to_string()));
            }
            self.storage.save_cards(&cards).await?;
            return cards
                .into_iter()
                .find(|card| card.id == id)
                .ok_or_else(|| DayflowError::CardNotFound(id.to_string()));
        }

        self.storage.load_column(owner, to_column).await?;

        let _guard = self.locks.acquire(*to_column.as_uuid()).await;
        let mut destination = self.storage.list_cards(owner, to_column).await?;
        shift_for_insert(&mut destination, target_index as u32);
        self.storage.save_cards(&destination).await?;

        card.move_to(to_column, target_index as u32);
        self.storage.save_card(&card).await?;

        tracing::debug!(card = %id, column = %to_column, position = card.position, "moved card across columns");
        Ok(card)
    }

    /// Applies a full explicit card ordering for one column
    pub async fn reorder_cards(
        &self,
        owner: OwnerId,
        column_id: ColumnId,
        ordered_ids: &[CardId],
    ) -> Result<Vec<Card>> {
        let _guard = self.locks.acquire(*column_id.as_uuid()).await;
        self.storage.load_column(owner, column_id).await?;
        let mut cards = self.storage.list_cards(owner, column_id).await?;
        apply_explicit_order(&mut cards, ordered_ids)?;
        self.storage.save_cards(&cards).await?;

        cards.sort_by_key(|card| card.position);
        Ok(cards)
    }

    /// Deletes a card; siblings keep their positions
    pub async fn delete_card(&self, owner: OwnerId, id: CardId) -> Result<()> {
        self.storage.delete_card(owner, id).await
    }
}

fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DayflowError::ValidationError(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

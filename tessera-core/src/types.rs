use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::identity;

/// A single work item. Identity is stable across moves; only the
/// containing column and position change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub content: String,
}

/// A named, ordered list of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// The full board state: ordered columns, each with ordered cards.
///
/// Snapshots arrive from the API layer as
/// `{columns: [{id, name, cards: [{id, content}]}]}`. Every column and
/// card must carry an `id` (unique per board); `name`, `content` and
/// `title` default to empty strings when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Duplicate column id: {0}")]
    DuplicateColumnId(String),

    #[error("Duplicate card id: {0}")]
    DuplicateCardId(String),

    #[error("Empty id on a {0} in board snapshot")]
    EmptyId(&'static str),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Board cannot be replaced while a drag is in progress")]
    DragInProgress,
}

impl Board {
    /// Check snapshot integrity: every column and card id present and
    /// unique across the whole board. Card ids are board-unique
    /// regardless of which column holds them.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut column_ids = HashSet::new();
        let mut card_ids = HashSet::new();
        for col in &self.columns {
            if col.id.is_empty() {
                return Err(BoardError::EmptyId("column"));
            }
            if !column_ids.insert(col.id.as_str()) {
                return Err(BoardError::DuplicateColumnId(col.id.clone()));
            }
            for card in &col.cards {
                if card.id.is_empty() {
                    return Err(BoardError::EmptyId("card"));
                }
                if !card_ids.insert(card.id.as_str()) {
                    return Err(BoardError::DuplicateCardId(card.id.clone()));
                }
            }
        }
        Ok(())
    }

    /// Index of a column by id.
    pub fn find_column(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    /// Locate a card by id: (column index, index within the column).
    pub fn find_card(&self, card_id: &str) -> Option<(usize, usize)> {
        for (col_idx, col) in self.columns.iter().enumerate() {
            if let Some(card_idx) = col.cards.iter().position(|c| c.id == card_id) {
                return Some((col_idx, card_idx));
            }
        }
        None
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    /// Total number of cards across all columns.
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }

    /// Append a new column with a freshly minted id.
    pub fn add_column(&mut self, name: &str) -> &Column {
        self.columns.push(Column {
            id: identity::generate_id(),
            name: name.to_string(),
            cards: Vec::new(),
        });
        // push above guarantees the vec is non-empty
        &self.columns[self.columns.len() - 1]
    }

    /// Append a new card (freshly minted id) to the given column.
    pub fn add_card(&mut self, column_id: &str, content: &str) -> Result<&Card, BoardError> {
        let Some(col_idx) = self.find_column(column_id) else {
            return Err(BoardError::ColumnNotFound(column_id.to_string()));
        };
        let col = &mut self.columns[col_idx];
        col.cards.push(Card {
            id: identity::generate_id(),
            content: content.to_string(),
        });
        Ok(&col.cards[col.cards.len() - 1])
    }

    /// Remove a card by id, returning it if it was present.
    pub fn remove_card(&mut self, card_id: &str) -> Option<Card> {
        let (col_idx, card_idx) = self.find_card(card_id)?;
        Some(self.columns[col_idx].cards.remove(card_idx))
    }

    /// Remove a column (and its cards) by id.
    pub fn remove_column(&mut self, column_id: &str) -> Option<Column> {
        let col_idx = self.find_column(column_id)?;
        Some(self.columns.remove(col_idx))
    }

    pub fn rename_column(&mut self, column_id: &str, name: &str) -> Result<(), BoardError> {
        let Some(col_idx) = self.find_column(column_id) else {
            return Err(BoardError::ColumnNotFound(column_id.to_string()));
        };
        self.columns[col_idx].name = name.to_string();
        Ok(())
    }
}

/// Net change computation for committed drags.
///
/// The sync layer receives one small payload per completed drag telling
/// it which card or column ended up where. Emission is at-most-once and
/// fire-and-forget; retry and backoff are the sync layer's concern.
use serde::{Deserialize, Serialize};

use crate::types::Board;

use super::DragSubject;

/// Wire payload describing a committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BoardChange {
    #[serde(rename_all = "camelCase")]
    ColumnMoved { column_id: String, to_index: usize },
    #[serde(rename_all = "camelCase")]
    CardMoved {
        card_id: String,
        from_column_id: String,
        to_column_id: String,
        to_index: usize,
    },
}

/// Compare the drag subject's position before and after the gesture.
/// Returns an empty vec when the drag was a net no-op (cancelled,
/// dropped in place, or the subject vanished from either snapshot).
pub fn net_changes(old: &Board, new: &Board, subject: &DragSubject) -> Vec<BoardChange> {
    match subject {
        DragSubject::Column { column_id } => {
            match (old.find_column(column_id), new.find_column(column_id)) {
                (Some(from), Some(to)) if from != to => vec![BoardChange::ColumnMoved {
                    column_id: column_id.clone(),
                    to_index: to,
                }],
                _ => Vec::new(),
            }
        }
        DragSubject::Card { card_id } => {
            match (old.find_card(card_id), new.find_card(card_id)) {
                (Some((from_col, from_idx)), Some((to_col, to_idx)))
                    if (from_col, from_idx) != (to_col, to_idx) =>
                {
                    vec![BoardChange::CardMoved {
                        card_id: card_id.clone(),
                        from_column_id: old.columns[from_col].id.clone(),
                        to_column_id: new.columns[to_col].id.clone(),
                        to_index: to_idx,
                    }]
                }
                _ => Vec::new(),
            }
        }
    }
}

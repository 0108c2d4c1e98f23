/// Drag-and-drop reordering.
///
/// `engine` holds the state machine that applies drag events to the
/// board; `changeset` computes the net move a committed drag produced,
/// shaped for the sync API.
pub mod changeset;
pub mod engine;

pub use changeset::{net_changes, BoardChange};
pub use engine::BoardReorderEngine;

use serde::{Deserialize, Serialize};

/// What is being moved in the current gesture. Exists only between
/// drag-start and drag-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DragSubject {
    #[serde(rename_all = "camelCase")]
    Card { card_id: String },
    #[serde(rename_all = "camelCase")]
    Column { column_id: String },
}

/// The element under the pointer at a drag-over tick. The "nothing
/// under the pointer" case is `None` at the call sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DropTarget {
    #[serde(rename_all = "camelCase")]
    Card { card_id: String },
    #[serde(rename_all = "camelCase")]
    Column { column_id: String },
}

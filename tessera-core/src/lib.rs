/// Core board state for the Tessera kanban client.
///
/// The crate owns the canonical in-memory board (ordered columns, each an
/// ordered list of cards) and the drag-and-drop reorder engine that keeps
/// it consistent while a gesture is in flight. Rendering and server sync
/// live in the frontends; they only read the board and receive change-sets.
pub mod identity;
pub mod reorder;
pub mod types;

pub use reorder::{BoardChange, BoardReorderEngine, DragSubject, DropTarget};
pub use types::{Board, BoardError, Card, Column};

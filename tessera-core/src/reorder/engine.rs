/// Drag-and-drop reorder engine.
///
/// Owns the canonical board and applies drag events in delivery order:
/// begin_drag, many update_drag_over ticks, end_drag. Cross-column card
/// moves are applied live during hover so the user sees the card land;
/// same-column ordering and column reordering resolve once, at drop, to
/// avoid visible oscillation between adjacent siblings. A pre-drag
/// snapshot is kept so cancelling restores the board in one assignment.
///
/// Drag-time failures (unknown ids, events in the wrong phase) are
/// logged no-ops: gesture libraries deliver surprising event orders
/// under fast pointer movement, and a stray event must never corrupt
/// the board or abort the interaction.
use crate::types::{Board, BoardError};

use super::changeset::{net_changes, BoardChange};
use super::{DragSubject, DropTarget};

/// Transient state for a single gesture. Created at begin_drag and
/// discarded at end_drag regardless of outcome.
#[derive(Debug)]
struct DragState {
    subject: DragSubject,
    /// Pre-drag snapshot, restored verbatim on cancel.
    original: Board,
    /// Last processed hover target. Pointer-move events arrive faster
    /// than layout changes; repeats are dropped before any board scan.
    last_target: Option<DropTarget>,
    /// Target of the last hover that actually moved the card, so the
    /// drop on that same target commits without reshuffling.
    hover_moved: Option<DropTarget>,
}

#[derive(Debug)]
pub struct BoardReorderEngine {
    board: Board,
    drag: Option<DragState>,
}

impl BoardReorderEngine {
    /// Take ownership of an initial board snapshot. Duplicate or missing
    /// ids are a collaborator contract violation and are rejected here;
    /// this is the only error that surfaces to the caller.
    pub fn new(board: Board) -> Result<Self, BoardError> {
        board.validate()?;
        Ok(Self { board, drag: None })
    }

    /// The layout the presentation layer should render right now.
    /// During a drag this includes speculative hover moves.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Mutable access for quiescent-time edits (add/remove/rename).
    pub fn board_mut(&mut self) -> Result<&mut Board, BoardError> {
        if self.drag.is_some() {
            return Err(BoardError::DragInProgress);
        }
        Ok(&mut self.board)
    }

    /// Swap in a fresh server snapshot. Rejected mid-drag so a sync
    /// refresh cannot pull the board out from under a gesture.
    pub fn replace_board(&mut self, board: Board) -> Result<(), BoardError> {
        if self.drag.is_some() {
            return Err(BoardError::DragInProgress);
        }
        board.validate()?;
        self.board = board;
        Ok(())
    }

    /// Start a drag gesture. No layout change; the current board is
    /// snapshotted for rollback. Callers must close any inline editor on
    /// the subject's container before invoking this.
    pub fn begin_drag(&mut self, subject: DragSubject) {
        if self.drag.is_some() {
            log::warn!(
                "[tessera.reorder.begin] drag already in progress, ignoring {:?}",
                subject
            );
            return;
        }
        let found = match &subject {
            DragSubject::Card { card_id } => self.board.find_card(card_id).is_some(),
            DragSubject::Column { column_id } => self.board.find_column(column_id).is_some(),
        };
        if !found {
            log::warn!(
                "[tessera.reorder.begin] subject not on board, ignoring {:?}",
                subject
            );
            return;
        }
        self.drag = Some(DragState {
            subject,
            original: self.board.clone(),
            last_target: None,
            hover_moved: None,
        });
    }

    /// Process a hover tick. `None` means the pointer is over no valid
    /// drop zone. Only cross-column card moves change the layout here.
    pub fn update_drag_over(&mut self, target: Option<DropTarget>) {
        let (subject, target) = match self.drag.as_mut() {
            Some(drag) => {
                let Some(target) = target else { return };
                if drag.last_target.as_ref() == Some(&target) {
                    return; // pointer-move burst over the same element
                }
                drag.last_target = Some(target.clone());
                (drag.subject.clone(), target)
            }
            None => {
                log::warn!("[tessera.reorder.over] hover with no drag in progress, ignoring");
                return;
            }
        };
        if self.apply_hover(&subject, &target) {
            if let Some(drag) = self.drag.as_mut() {
                drag.hover_moved = Some(target);
            }
        }
    }

    /// Commit or cancel the gesture. Always clears drag state. `None`
    /// restores the pre-drag snapshot; otherwise the final layout is
    /// resolved and the net move of the subject is returned for the sync
    /// layer (at most one emission per completed drag, fire-and-forget).
    pub fn end_drag(&mut self, final_target: Option<DropTarget>) -> Vec<BoardChange> {
        let Some(drag) = self.drag.take() else {
            log::warn!("[tessera.reorder.end] drop with no drag in progress, ignoring");
            return Vec::new();
        };
        let Some(target) = final_target else {
            // Cancelled: single assignment back to the pre-drag layout.
            self.board = drag.original;
            return Vec::new();
        };
        match &drag.subject {
            DragSubject::Column { column_id } => self.drop_column(column_id, &target),
            DragSubject::Card { card_id } => {
                self.drop_card(card_id, &target, drag.hover_moved.as_ref())
            }
        }
        net_changes(&drag.original, &self.board, &drag.subject)
    }

    /// Hover-phase layout change. Returns true when the board moved.
    fn apply_hover(&mut self, subject: &DragSubject, target: &DropTarget) -> bool {
        let DragSubject::Card { card_id } = subject else {
            return false; // column reordering resolves at drop
        };
        if let DropTarget::Card { card_id: target_id } = target {
            if target_id == card_id {
                return false; // self-over
            }
        }
        let Some((from_col, _)) = self.board.find_card(card_id) else {
            log::warn!(
                "[tessera.reorder.over] dragged card {} missing from board",
                card_id
            );
            return false;
        };
        let to_col = match target {
            DropTarget::Card { card_id: target_id } => {
                match self.board.find_card(target_id) {
                    Some((col, _)) => col,
                    None => {
                        log::warn!(
                            "[tessera.reorder.over] hover target card {} not on board",
                            target_id
                        );
                        return false;
                    }
                }
            }
            DropTarget::Column { column_id } => match self.board.find_column(column_id) {
                Some(col) => col,
                None => {
                    log::warn!(
                        "[tessera.reorder.over] hover target column {} not on board",
                        column_id
                    );
                    return false;
                }
            },
        };
        if to_col == from_col {
            return false; // same-column ordering resolves at drop
        }
        self.place_card(card_id, target)
    }

    /// Drop-phase resolution for a card subject. Cross-column placement
    /// normally already happened during hover; recomputing with the same
    /// rule covers drops whose target never produced a hover event
    /// (keyboard-driven drags).
    fn drop_card(&mut self, card_id: &str, target: &DropTarget, hover_moved: Option<&DropTarget>) {
        if let DropTarget::Card { card_id: target_id } = target {
            if target_id == card_id {
                return;
            }
        }
        let Some((from_col, _)) = self.board.find_card(card_id) else {
            log::warn!(
                "[tessera.reorder.end] dragged card {} missing from board",
                card_id
            );
            return;
        };
        match target {
            DropTarget::Card { card_id: target_id } => {
                let Some((to_col, _)) = self.board.find_card(target_id) else {
                    log::warn!(
                        "[tessera.reorder.end] drop target card {} not on board",
                        target_id
                    );
                    return;
                };
                // Hover already placed the card at this target's slot;
                // committing on the same target must not reshuffle.
                if to_col == from_col && hover_moved == Some(target) {
                    return;
                }
                self.place_card(card_id, target);
            }
            DropTarget::Column { column_id } => {
                let Some(to_col) = self.board.find_column(column_id) else {
                    log::warn!(
                        "[tessera.reorder.end] drop target column {} not on board",
                        column_id
                    );
                    return;
                };
                if to_col == from_col {
                    return; // already there; in-column order stands
                }
                self.place_card(card_id, target);
            }
        }
    }

    /// Drop-phase resolution for a column subject: a stable move of the
    /// subject to the target column's index. A drop over a card resolves
    /// to its containing column.
    fn drop_column(&mut self, column_id: &str, target: &DropTarget) {
        let target_id = match target {
            DropTarget::Column { column_id: id } => id.clone(),
            DropTarget::Card { card_id } => {
                let Some((col_idx, _)) = self.board.find_card(card_id) else {
                    log::warn!(
                        "[tessera.reorder.end] drop target card {} not on board",
                        card_id
                    );
                    return;
                };
                self.board.columns[col_idx].id.clone()
            }
        };
        if target_id == column_id {
            return; // self-over
        }
        let Some(from) = self.board.find_column(column_id) else {
            log::warn!(
                "[tessera.reorder.end] dragged column {} missing from board",
                column_id
            );
            return;
        };
        let Some(to) = self.board.find_column(&target_id) else {
            log::warn!(
                "[tessera.reorder.end] drop target column {} not on board",
                target_id
            );
            return;
        };
        // Remove-then-insert with the index captured before removal:
        // the subject ends at the target's pre-move index and every
        // other column keeps its relative order.
        let col = self.board.columns.remove(from);
        let idx = to.min(self.board.columns.len());
        self.board.columns.insert(idx, col);
    }

    /// Move a card onto a target: remove-then-insert with positions
    /// captured before removal. A card target yields its own slot
    /// (pushing it and everything after down by one); a column target
    /// appends to that column's end.
    fn place_card(&mut self, card_id: &str, target: &DropTarget) -> bool {
        let Some((from_col, from_idx)) = self.board.find_card(card_id) else {
            return false;
        };
        let (to_col, to_idx) = match target {
            DropTarget::Card { card_id: target_id } => {
                let Some(pos) = self.board.find_card(target_id) else {
                    return false;
                };
                pos
            }
            DropTarget::Column { column_id } => {
                let Some(col) = self.board.find_column(column_id) else {
                    return false;
                };
                (col, self.board.columns[col].cards.len())
            }
        };
        if (to_col, to_idx) == (from_col, from_idx) {
            return false; // already in place
        }
        let card = self.board.columns[from_col].cards.remove(from_idx);
        let cards = &mut self.board.columns[to_col].cards;
        let idx = to_idx.min(cards.len());
        cards.insert(idx, card);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Card, Column};

    fn make_card(id: &str) -> Card {
        Card {
            id: id.to_string(),
            content: format!("card {}", id),
        }
    }

    fn make_board(columns: Vec<(&str, Vec<&str>)>) -> Board {
        Board {
            title: "Test".to_string(),
            columns: columns
                .into_iter()
                .map(|(id, card_ids)| Column {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                    cards: card_ids.into_iter().map(make_card).collect(),
                })
                .collect(),
        }
    }

    fn engine(columns: Vec<(&str, Vec<&str>)>) -> BoardReorderEngine {
        BoardReorderEngine::new(make_board(columns)).unwrap()
    }

    fn card(id: &str) -> DropTarget {
        DropTarget::Card {
            card_id: id.to_string(),
        }
    }

    fn column(id: &str) -> DropTarget {
        DropTarget::Column {
            column_id: id.to_string(),
        }
    }

    fn drag_card(id: &str) -> DragSubject {
        DragSubject::Card {
            card_id: id.to_string(),
        }
    }

    fn drag_column(id: &str) -> DragSubject {
        DragSubject::Column {
            column_id: id.to_string(),
        }
    }

    fn layout(engine: &BoardReorderEngine) -> Vec<(String, Vec<String>)> {
        engine
            .board()
            .columns
            .iter()
            .map(|c| (c.id.clone(), c.cards.iter().map(|k| k.id.clone()).collect()))
            .collect()
    }

    fn sorted_card_ids(board: &Board) -> Vec<String> {
        let mut ids: Vec<String> = board
            .columns
            .iter()
            .flat_map(|c| c.cards.iter().map(|k| k.id.clone()))
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_new_rejects_duplicate_card_ids() {
        let board = make_board(vec![("a", vec!["1"]), ("b", vec!["1"])]);
        assert!(BoardReorderEngine::new(board).is_err());
    }

    #[test]
    fn test_same_column_reorder() {
        let mut e = engine(vec![("a", vec!["1", "2", "3"])]);
        e.begin_drag(drag_card("2"));
        e.update_drag_over(Some(card("1")));
        let changes = e.end_drag(Some(card("1")));
        assert_eq!(
            layout(&e),
            vec![(
                "a".to_string(),
                vec!["2".to_string(), "1".to_string(), "3".to_string()]
            )]
        );
        assert_eq!(
            changes,
            vec![BoardChange::CardMoved {
                card_id: "2".to_string(),
                from_column_id: "a".to_string(),
                to_column_id: "a".to_string(),
                to_index: 0,
            }]
        );
    }

    #[test]
    fn test_same_column_forward_move() {
        let mut e = engine(vec![("a", vec!["1", "2", "3"])]);
        e.begin_drag(drag_card("1"));
        e.end_drag(Some(card("3")));
        // the subject ends at the target's pre-move index
        assert_eq!(
            layout(&e)[0].1,
            vec!["2".to_string(), "3".to_string(), "1".to_string()]
        );
    }

    #[test]
    fn test_cross_column_move() {
        let mut e = engine(vec![("a", vec!["1", "2"]), ("b", vec!["3"])]);
        e.begin_drag(drag_card("2"));
        e.update_drag_over(Some(card("3")));
        // speculative move is visible before the drop
        assert_eq!(layout(&e)[1].1, vec!["2".to_string(), "3".to_string()]);
        let changes = e.end_drag(Some(card("3")));
        assert_eq!(
            layout(&e),
            vec![
                ("a".to_string(), vec!["1".to_string()]),
                ("b".to_string(), vec!["2".to_string(), "3".to_string()]),
            ]
        );
        assert_eq!(
            changes,
            vec![BoardChange::CardMoved {
                card_id: "2".to_string(),
                from_column_id: "a".to_string(),
                to_column_id: "b".to_string(),
                to_index: 0,
            }]
        );
    }

    #[test]
    fn test_drop_on_same_target_as_hover_does_not_swap() {
        let mut e = engine(vec![("a", vec!["1", "2"]), ("b", vec!["3"])]);
        e.begin_drag(drag_card("2"));
        e.update_drag_over(Some(card("3")));
        e.end_drag(Some(card("3")));
        // committed layout equals the hover preview, no flicker
        assert_eq!(layout(&e)[1].1, vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_column_reorder() {
        let mut e = engine(vec![("a", vec![]), ("b", vec![]), ("c", vec![])]);
        e.begin_drag(drag_column("c"));
        e.update_drag_over(Some(column("a"))); // inert during hover
        assert_eq!(
            layout(&e).iter().map(|(id, _)| id.clone()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        let changes = e.end_drag(Some(column("a")));
        assert_eq!(
            layout(&e).iter().map(|(id, _)| id.clone()).collect::<Vec<_>>(),
            vec!["c", "a", "b"]
        );
        assert_eq!(
            changes,
            vec![BoardChange::ColumnMoved {
                column_id: "c".to_string(),
                to_index: 0,
            }]
        );
    }

    #[test]
    fn test_column_drop_on_card_resolves_to_its_column() {
        let mut e = engine(vec![("a", vec!["1"]), ("b", vec![]), ("c", vec![])]);
        e.begin_drag(drag_column("c"));
        e.end_drag(Some(card("1")));
        assert_eq!(
            layout(&e).iter().map(|(id, _)| id.clone()).collect::<Vec<_>>(),
            vec!["c", "a", "b"]
        );
    }

    #[test]
    fn test_drop_on_empty_column() {
        let mut e = engine(vec![("a", vec!["1"]), ("b", vec![])]);
        e.begin_drag(drag_card("1"));
        e.update_drag_over(Some(column("b")));
        let changes = e.end_drag(Some(column("b")));
        assert_eq!(
            layout(&e),
            vec![
                ("a".to_string(), vec![]),
                ("b".to_string(), vec!["1".to_string()]),
            ]
        );
        assert_eq!(
            changes,
            vec![BoardChange::CardMoved {
                card_id: "1".to_string(),
                from_column_id: "a".to_string(),
                to_column_id: "b".to_string(),
                to_index: 0,
            }]
        );
    }

    #[test]
    fn test_keyboard_drop_without_prior_hover() {
        let mut e = engine(vec![("a", vec!["1", "2"]), ("b", vec!["3"])]);
        e.begin_drag(drag_card("2"));
        // no hover events at all, drop lands via the same rule
        e.end_drag(Some(card("3")));
        assert_eq!(layout(&e)[1].1, vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_cancel_is_true_noop() {
        let mut e = engine(vec![("a", vec!["1", "2"]), ("b", vec!["3"])]);
        let before = e.board().clone();
        e.begin_drag(drag_card("2"));
        e.update_drag_over(Some(card("3")));
        e.update_drag_over(Some(column("a")));
        e.update_drag_over(Some(card("1")));
        let changes = e.end_drag(None);
        assert_eq!(e.board(), &before);
        assert!(changes.is_empty());
        assert!(!e.is_dragging());
    }

    #[test]
    fn test_repeated_hover_is_idempotent() {
        let mut e = engine(vec![("a", vec!["1", "2"]), ("b", vec!["3"])]);
        e.begin_drag(drag_card("2"));
        e.update_drag_over(Some(card("3")));
        let after_first = e.board().clone();
        e.update_drag_over(Some(card("3")));
        e.update_drag_over(Some(card("3")));
        assert_eq!(e.board(), &after_first);
    }

    #[test]
    fn test_hover_over_none_and_self_is_inert() {
        let mut e = engine(vec![("a", vec!["1", "2"])]);
        let before = e.board().clone();
        e.begin_drag(drag_card("2"));
        e.update_drag_over(None);
        e.update_drag_over(Some(card("2")));
        e.update_drag_over(Some(column("a")));
        assert_eq!(e.board(), &before);
    }

    #[test]
    fn test_invalid_target_id_is_inert() {
        let mut e = engine(vec![("a", vec!["1", "2"]), ("b", vec!["3"])]);
        let before = e.board().clone();
        e.begin_drag(drag_card("2"));
        e.update_drag_over(Some(card("does-not-exist")));
        e.update_drag_over(Some(column("does-not-exist")));
        assert_eq!(e.board(), &before);
        let changes = e.end_drag(Some(card("also-missing")));
        assert_eq!(e.board(), &before);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_events_outside_a_drag_are_ignored() {
        let mut e = engine(vec![("a", vec!["1"])]);
        let before = e.board().clone();
        e.update_drag_over(Some(card("1")));
        let changes = e.end_drag(Some(card("1")));
        assert_eq!(e.board(), &before);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_begin_while_dragging_is_ignored() {
        let mut e = engine(vec![("a", vec!["1", "2"]), ("b", vec!["3"])]);
        e.begin_drag(drag_card("2"));
        e.begin_drag(drag_card("3")); // ignored, first drag still active
        e.update_drag_over(Some(card("3")));
        e.end_drag(Some(card("3")));
        assert_eq!(layout(&e)[1].1, vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_begin_with_unknown_subject_is_ignored() {
        let mut e = engine(vec![("a", vec!["1"])]);
        e.begin_drag(drag_card("nope"));
        assert!(!e.is_dragging());
    }

    #[test]
    fn test_conservation_across_messy_sequence() {
        let mut e = engine(vec![
            ("a", vec!["1", "2", "3"]),
            ("b", vec!["4"]),
            ("c", vec![]),
        ]);
        let before = sorted_card_ids(e.board());
        e.begin_drag(drag_card("2"));
        e.update_drag_over(Some(card("4")));
        e.update_drag_over(Some(column("c")));
        e.update_drag_over(Some(card("1")));
        e.update_drag_over(Some(card("missing")));
        e.end_drag(Some(column("b")));
        assert_eq!(sorted_card_ids(e.board()), before);
        assert_eq!(e.board().columns.len(), 3);
    }

    #[test]
    fn test_hover_then_drop_on_sibling_reorders_in_new_column() {
        let mut e = engine(vec![("a", vec!["1"]), ("b", vec!["2", "3"])]);
        e.begin_drag(drag_card("1"));
        e.update_drag_over(Some(card("2"))); // enters b at 2's slot
        e.end_drag(Some(card("3"))); // then commits on a different sibling
        // same-column resolution: the subject ends at 3's pre-move index
        assert_eq!(
            layout(&e)[1].1,
            vec!["2".to_string(), "3".to_string(), "1".to_string()]
        );
    }

    #[test]
    fn test_board_mut_blocked_during_drag() {
        let mut e = engine(vec![("a", vec!["1"])]);
        e.begin_drag(drag_card("1"));
        assert!(matches!(e.board_mut(), Err(BoardError::DragInProgress)));
        e.end_drag(None);
        assert!(e.board_mut().is_ok());
    }

    #[test]
    fn test_replace_board_validates() {
        let mut e = engine(vec![("a", vec!["1"])]);
        let bad = make_board(vec![("x", vec!["9", "9"])]);
        assert!(e.replace_board(bad).is_err());
        let good = make_board(vec![("x", vec!["9"])]);
        assert!(e.replace_board(good).is_ok());
        assert_eq!(e.board().columns[0].id, "x");
    }
}

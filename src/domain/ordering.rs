//! Positional ordering over a scope: the columns of one board, or the cards
//! of one column. Callers resolve the scope (the full ordered entity list)
//! from storage, apply one of these operations, then persist the result.

use crate::error::{DayflowError, Result};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// An entity that occupies a slot in an ordered scope
pub trait Positioned {
    type Id: Copy + Eq + Hash + fmt::Display;

    fn entity_id(&self) -> Self::Id;
    fn position(&self) -> u32;
    fn set_position(&mut self, position: u32);
}

/// Position for an entity appended to `scope`: highest position + 1, or 0
/// when the scope is empty. Existing entries are never renumbered on insert.
pub fn next_position<T: Positioned>(scope: &[T]) -> u32 {
    scope
        .iter()
        .map(|entity| entity.position() + 1)
        .max()
        .unwrap_or(0)
}

/// Moves one entity to `target_index` within its scope and renumbers the
/// whole scope densely.
///
/// The observable semantics are list-splice semantics: take the entities
/// ordered by current position, remove the moved one, insert it back at
/// `target_index` (clamped to the list bounds), then assign every entity its
/// resulting list index. Returns false, leaving all positions untouched, when
/// `entity_id` is not in the scope.
pub fn move_within<T: Positioned>(scope: &mut [T], entity_id: T::Id, target_index: usize) -> bool {
    let mut ordered: Vec<usize> = (0..scope.len()).collect();
    ordered.sort_by_key(|&index| scope[index].position());

    let from = match ordered
        .iter()
        .position(|&index| scope[index].entity_id() == entity_id)
    {
        Some(found) => found,
        None => return false,
    };

    let moved = ordered.remove(from);
    let target = target_index.min(ordered.len());
    ordered.insert(target, moved);

    for (list_index, &scope_index) in ordered.iter().enumerate() {
        scope[scope_index].set_position(list_index as u32);
    }
    true
}

/// Destination-side shift for a cross-scope move: every entity whose position
/// is at or after `target_index` steps one slot right. The moved entity is
/// not yet part of `scope`; the caller gives it `target_index` afterwards.
/// The source scope is left alone, gaps there are tolerated until the next
/// explicit reorder.
pub fn shift_for_insert<T: Positioned>(scope: &mut [T], target_index: u32) {
    for entity in scope.iter_mut() {
        if entity.position() >= target_index {
            let shifted = entity.position() + 1;
            entity.set_position(shifted);
        }
    }
}

/// Applies a full explicit ordering: `ordered_ids` must be exactly the scope
/// membership (no omissions, no unknowns, no duplicates), and each entity
/// gets its index in the list as its position.
pub fn apply_explicit_order<T: Positioned>(scope: &mut [T], ordered_ids: &[T::Id]) -> Result<()> {
    if ordered_ids.len() != scope.len() {
        return Err(DayflowError::ValidationError(format!(
            "ordering must cover the whole scope: expected {} ids, got {}",
            scope.len(),
            ordered_ids.len()
        )));
    }

    let mut seen = HashSet::with_capacity(ordered_ids.len());
    for id in ordered_ids {
        if !seen.insert(*id) {
            return Err(DayflowError::ValidationError(format!(
                "duplicate id in ordering: {}",
                id
            )));
        }
    }
    for entity in scope.iter() {
        if !seen.contains(&entity.entity_id()) {
            return Err(DayflowError::ValidationError(format!(
                "ordering is missing id: {}",
                entity.entity_id()
            )));
        }
    }

    // Equal sizes, no duplicates, and full coverage of the scope make the
    // two id sets identical, so every lookup below succeeds.
    for entity in scope.iter_mut() {
        if let Some(index) = ordered_ids.iter().position(|id| *id == entity.entity_id()) {
            entity.set_position(index as u32);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{Board, Card, Column};
    use crate::domain::ids::{CardId, ColumnId, OwnerId};

    fn columns(titles: &[&str]) -> Vec<Column> {
        let board = Board::new(OwnerId::new(), "Test".to_string());
        titles
            .iter()
            .enumerate()
            .map(|(index, title)| {
                Column::new(
                    board.owner_id,
                    board.id,
                    (*title).to_string(),
                    index as u32,
                )
            })
            .collect()
    }

    fn cards(owner: OwnerId, column_id: ColumnId, count: u32) -> Vec<Card> {
        (0..count)
            .map(|index| Card::new(owner, column_id, format!("card {}", index), index))
            .collect()
    }

    fn positions_by_title(scope: &[Column]) -> Vec<(String, u32)> {
        let mut pairs: Vec<_> = scope
            .iter()
            .map(|column| (column.title.clone(), column.position))
            .collect();
        pairs.sort_by_key(|(_, position)| *position);
        pairs
    }

    #[test]
    fn test_next_position_on_empty_scope() {
        let scope: Vec<Column> = Vec::new();
        assert_eq!(next_position(&scope), 0);
    }

    #[test]
    fn test_next_position_appends_after_highest() {
        let scope = columns(&["A", "B", "C"]);
        assert_eq!(next_position(&scope), 3);
    }

    #[test]
    fn test_next_position_respects_gaps() {
        let mut scope = columns(&["A", "B", "C"]);
        scope[2].position = 5;
        assert_eq!(next_position(&scope), 6);
    }

    #[test]
    fn test_move_last_to_front() {
        let mut scope = columns(&["A", "B", "C"]);
        let c = scope[2].id;

        assert!(move_within(&mut scope, c, 0));

        assert_eq!(
            positions_by_title(&scope),
            vec![
                ("C".to_string(), 0),
                ("A".to_string(), 1),
                ("B".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_move_clamps_target_index() {
        let mut scope = columns(&["A", "B", "C"]);
        let a = scope[0].id;

        assert!(move_within(&mut scope, a, 99));

        assert_eq!(
            positions_by_title(&scope),
            vec![
                ("B".to_string(), 0),
                ("C".to_string(), 1),
                ("A".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_move_unknown_id_leaves_scope_untouched() {
        let mut scope = columns(&["A", "B"]);
        let before: Vec<u32> = scope.iter().map(|column| column.position).collect();

        assert!(!move_within(&mut scope, ColumnId::new(), 0));

        let after: Vec<u32> = scope.iter().map(|column| column.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_move_renumbers_densely_over_gaps() {
        let mut scope = columns(&["A", "B", "C"]);
        // Simulate a prior delete: positions 0, 3, 7
        scope[1].position = 3;
        scope[2].position = 7;
        let b = scope[1].id;

        assert!(move_within(&mut scope, b, 2));

        assert_eq!(
            positions_by_title(&scope),
            vec![
                ("A".to_string(), 0),
                ("C".to_string(), 1),
                ("B".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_shift_for_insert_moves_tail_only() {
        let owner = OwnerId::new();
        let column_id = ColumnId::new();
        let mut scope = cards(owner, column_id, 2);

        shift_for_insert(&mut scope, 1);

        assert_eq!(scope[0].position, 0);
        assert_eq!(scope[1].position, 2);
    }

    #[test]
    fn test_shift_for_insert_past_end_is_a_noop() {
        let owner = OwnerId::new();
        let column_id = ColumnId::new();
        let mut scope = cards(owner, column_id, 2);

        shift_for_insert(&mut scope, 5);

        assert_eq!(scope[0].position, 0);
        assert_eq!(scope[1].position, 1);
    }

    #[test]
    fn test_explicit_order_assigns_indexes() {
        let mut scope = columns(&["A", "B", "C"]);
        let ids = [scope[2].id, scope[0].id, scope[1].id];

        apply_explicit_order(&mut scope, &ids).unwrap();

        assert_eq!(
            positions_by_title(&scope),
            vec![
                ("C".to_string(), 0),
                ("A".to_string(), 1),
                ("B".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_explicit_order_rejects_wrong_length() {
        let mut scope = columns(&["A", "B", "C"]);
        let ids = [scope[0].id, scope[1].id];

        let err = apply_explicit_order(&mut scope, &ids).unwrap_err();
        assert!(matches!(err, DayflowError::ValidationError(_)));
    }

    #[test]
    fn test_explicit_order_rejects_duplicates() {
        let mut scope = columns(&["A", "B"]);
        let ids = [scope[0].id, scope[0].id];

        let err = apply_explicit_order(&mut scope, &ids).unwrap_err();
        assert!(matches!(err, DayflowError::ValidationError(_)));
    }

    #[test]
    fn test_explicit_order_rejects_unknown_ids() {
        let mut scope = columns(&["A", "B"]);
        let ids = [scope[0].id, ColumnId::new()];

        let err = apply_explicit_order(&mut scope, &ids).unwrap_err();
        assert!(matches!(err, DayflowError::ValidationError(_)));
    }

    #[test]
    fn test_ordering_works_for_cards_too() {
        let owner = OwnerId::new();
        let column_id = ColumnId::new();
        let mut scope = cards(owner, column_id, 3);
        let last = scope[2].id;

        assert!(move_within(&mut scope, last, 0));

        let mut by_position: Vec<_> =
            scope.iter().map(|card| (card.position, card.id)).collect();
        by_position.sort_by_key(|(position, _)| *position);
        assert_eq!(by_position[0].1, last);
        assert_eq!(by_position[0].0, 0);
        assert_eq!(by_position[2].0, 2);
    }
}

//! Unit tests for the history module.

use super::DEFAULT_HISTORY_CAPACITY;
use super::snapshot::{EditorSnapshot, PolygonSnapshot};
use super::stack::HistoryStack;

/// Snapshot distinguishable by its single polygon id
fn marked(id: u64) -> EditorSnapshot {
    EditorSnapshot {
        polygons: vec![PolygonSnapshot {
            id,
            points: vec![],
            color: 0,
            active: false,
            closed: None,
            category: None,
        }],
        ..Default::default()
    }
}

fn mark(snapshot: &EditorSnapshot) -> u64 {
    snapshot.polygons[0].id
}

#[test]
fn test_history_push() {
    let mut history = HistoryStack::default();
    assert!(!history.can_undo());

    history.push(marked(1));
    assert!(history.can_undo());
    assert_eq!(history.undo_count(), 1);
}

#[test]
fn test_undo_on_empty_history_is_noop() {
    let mut history = HistoryStack::default();
    assert!(history.undo(marked(1)).is_none());
    assert!(!history.can_redo());
}

#[test]
fn test_undo_returns_most_recent_first() {
    let mut history = HistoryStack::default();
    history.push(marked(1));
    history.push(marked(2));

    assert_eq!(history.undo(marked(3)).map(|s| mark(&s)), Some(2));
    assert_eq!(history.undo(marked(2)).map(|s| mark(&s)), Some(1));
    assert!(history.undo(marked(1)).is_none());
}

#[test]
fn test_redo_restores_undone_state() {
    let mut history = HistoryStack::default();
    history.push(marked(1));

    let previous = history.undo(marked(2)).unwrap();
    assert_eq!(mark(&previous), 1);
    assert!(history.can_redo());

    let next = history.redo(previous).unwrap();
    assert_eq!(mark(&next), 2);
    assert_eq!(history.undo_count(), 1);
    assert!(!history.can_redo());
}

#[test]
fn test_push_clears_redo() {
    let mut history = HistoryStack::default();
    history.push(marked(1));
    history.push(marked(2));
    history.undo(marked(3));
    assert!(history.can_redo());

    history.push(marked(4));
    assert!(!history.can_redo());
}

#[test]
fn test_capacity_drops_oldest() {
    let mut history = HistoryStack::default();
    for id in 0..(DEFAULT_HISTORY_CAPACITY as u64 + 10) {
        history.push(marked(id));
    }

    assert_eq!(history.undo_count(), DEFAULT_HISTORY_CAPACITY);

    let mut oldest = None;
    let mut current = marked(999);
    while let Some(previous) = history.undo(current.clone()) {
        oldest = Some(mark(&previous));
        current = previous;
    }
    assert_eq!(oldest, Some(10));
}

#[test]
fn test_zero_capacity_still_keeps_one() {
    let mut history = HistoryStack::with_capacity(0);
    history.push(marked(1));
    history.push(marked(2));
    assert_eq!(history.capacity(), 1);
    assert_eq!(history.undo_count(), 1);
}

#[test]
fn test_clear() {
    let mut history = HistoryStack::default();
    history.push(marked(1));
    history.undo(marked(2));
    history.push(marked(3));
    history.clear();
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}

//! Bounded snapshot history with undo and redo.

use std::collections::VecDeque;

use super::DEFAULT_HISTORY_CAPACITY;
use super::snapshot::EditorSnapshot;

/// Undo/redo stacks of whole-editor snapshots
#[derive(Debug, Clone)]
pub struct HistoryStack {
    /// Oldest first; the front is dropped when over capacity
    undo_stack: VecDeque<EditorSnapshot>,
    /// Most recent last
    redo_stack: Vec<EditorSnapshot>,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStack {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(capacity),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    /// Record the state before a mutation
    pub fn push(&mut self, snapshot: EditorSnapshot) {
        // A new action invalidates anything that was undone
        self.redo_stack.clear();
        self.push_undo(snapshot);
    }

    /// Take the most recent snapshot, parking `current` on the redo stack.
    pub fn undo(&mut self, current: EditorSnapshot) -> Option<EditorSnapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Take the most recently undone snapshot, parking `current` on the undo stack.
    pub fn redo(&mut self, current: EditorSnapshot) -> Option<EditorSnapshot> {
        let next = self.redo_stack.pop()?;
        self.push_undo(current);
        Some(next)
    }

    fn push_undo(&mut self, snapshot: EditorSnapshot) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

//! Undo/Redo history for polygon edits.
//!
//! Every mutating editor operation records a full [`EditorSnapshot`] before it
//! runs. Undo restores the previous snapshot and rebuilds all drawable handles
//! from it; nothing is replayed.
//!
//! ## Usage
//!
//! - **Ctrl+Z**: Undo the last action
//! - **Ctrl+Y** or **Ctrl+Shift+Z**: Redo the last undone action
//!
//! ## Module Structure
//!
//! - [`snapshot`] - Serializable editor and polygon snapshots
//! - [`stack`] - HistoryStack holding the bounded undo and redo stacks

mod snapshot;
mod stack;

#[cfg(test)]
mod tests;

pub use snapshot::{EditorSnapshot, PolygonSnapshot};
pub use stack::HistoryStack;

/// Number of snapshots kept when the config does not say otherwise
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

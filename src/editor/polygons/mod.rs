//! Polygon annotation core: handle pools, polygons, hit testing and the editor state machine.
//!
//! This module does not touch the ECS beyond deriving `Resource` on
//! [`PolygonEditor`]. The shell in `editor/` converts window input into
//! [`PointerEvent`]s and draws the [`Drawables`] the editor maintains.
//!
//! ## Module Structure
//!
//! - [`pool`] - Fixed and growable handle pools
//! - [`polygon`] - A single polygon and its handle bookkeeping
//! - [`category`] - Category table and id resolution
//! - [`hit_testing`] - Nearest vertex/edge queries
//! - [`input`] - Pointer events, commands and the viewport projection seam
//! - [`editor`] - PolygonEditor state machine
//! - [`error`] - EditorError

mod category;
mod editor;
mod error;
mod hit_testing;
mod input;
mod polygon;
mod pool;


pub use category::{CategoryEntry, CategoryTable, resolve_category_id};
pub use editor::{EditorMode, PolygonEditor};
pub use error::EditorError;
pub use input::{
    CursorHint, EditorCommand, Modifiers, PointerButton, PointerEvent, PointerKind,
    ViewportProjector,
};
pub use polygon::{MIN_CLOSED_POINTS, Polygon, PolygonId, PolygonShape};

//! Input types the editor consumes, independent of the windowing backend.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

/// Normalized pointer event in screen pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub button: Option<PointerButton>,
    pub screen: Vec2,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn down(button: PointerButton, screen: Vec2) -> Self {
        Self {
            kind: PointerKind::Down,
            button: Some(button),
            screen,
            modifiers: Modifiers::default(),
        }
    }

    pub fn up(button: PointerButton, screen: Vec2) -> Self {
        Self {
            kind: PointerKind::Up,
            button: Some(button),
            screen,
            modifiers: Modifiers::default(),
        }
    }

    pub fn moved(screen: Vec2) -> Self {
        Self {
            kind: PointerKind::Move,
            button: None,
            screen,
            modifiers: Modifiers::default(),
        }
    }
}

/// Conversion between screen pixels and the annotation plane, owned by the viewport.
pub trait ViewportProjector {
    /// Intersect the pointer ray with the annotation plane.
    fn screen_to_world(&self, screen: Vec2) -> Option<Vec3>;
    /// Project a world point to screen pixels.
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2>;
}

/// Keyboard-level commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    StartCreate,
    Finish,
    DeleteSelected,
    CycleCategory(i32),
    Undo,
    Redo,
}

/// What the pointer is over, for cursor feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorHint {
    #[default]
    Default,
    /// Over a polygon that is not selected
    Pointer,
    /// Placing points
    Crosshair,
    /// Over a vertex of the selected polygon
    Grab,
    /// Over an edge of the selected polygon
    Insert,
}

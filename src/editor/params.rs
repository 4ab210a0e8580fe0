//! SystemParam bundles shared by editor systems.
//!
//! - [`CameraParams`]: camera and window access for cursor-to-world conversion
//! - [`CameraProjector`]: the editor camera as a [`ViewportProjector`]
//! - [`is_cursor_over_ui`]: check if cursor is over egui UI (for input gating)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use super::camera::EditorCamera;
use super::polygons::ViewportProjector;

/// Bundled camera and window queries for cursor-to-world calculations
#[derive(SystemParam)]
pub struct CameraParams<'w, 's> {
    pub window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    pub camera: Query<'w, 's, (&'static Camera, &'static GlobalTransform), With<EditorCamera>>,
}

impl CameraParams<'_, '_> {
    /// Cursor position in window pixels, if the cursor is inside the window
    pub fn cursor_position(&self) -> Option<Vec2> {
        self.window.single().ok()?.cursor_position()
    }

    /// Projector for the current camera state
    pub fn projector(&self) -> Option<CameraProjector<'_>> {
        let (camera, transform) = self.camera.single().ok()?;
        Some(CameraProjector { camera, transform })
    }
}

/// Maps window pixels onto the z = 0 annotation plane through the 2D camera.
pub struct CameraProjector<'a> {
    camera: &'a Camera,
    transform: &'a GlobalTransform,
}

impl ViewportProjector for CameraProjector<'_> {
    fn screen_to_world(&self, screen: Vec2) -> Option<Vec3> {
        self.camera
            .viewport_to_world_2d(self.transform, screen)
            .ok()
            .map(|point| point.extend(0.0))
    }

    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        self.camera
            .world_to_viewport(self.transform, world.truncate().extend(0.0))
            .ok()
    }
}

/// Check if the cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}

/// Check if egui is consuming keyboard input (e.g. a focused text field)
pub fn is_typing_in_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false)
}

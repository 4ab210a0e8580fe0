//! The annotation canvas: the polygon editor core plus the Bevy systems that
//! feed it input and draw it.

mod camera;
mod controls;
pub mod history;
pub mod params;
pub mod polygons;
mod rendering;

pub use rendering::CanvasSettings;

use bevy::gizmos::config::GizmoConfigStore;
use bevy::prelude::*;

use crate::config::{AppConfig, ConfigLoaded};
use crate::persistence::LoadedPointCloud;
use crate::ui::no_dialog_open;
use polygons::PolygonEditor;

/// Rebuild the editor and display settings from the loaded config
fn configure_from_config(
    config: Res<AppConfig>,
    mut editor: ResMut<PolygonEditor>,
    mut settings: ResMut<CanvasSettings>,
    mut config_store: ResMut<GizmoConfigStore>,
) {
    let editor_config = &config.data.editor;
    *editor = PolygonEditor::new(editor_config);
    settings.vertex_size = editor_config.vertex_size;
    rendering::configure_gizmos(editor_config, &mut config_store);

    info!(
        "Editor configured: {} categories, {} pools, history of {}",
        editor.categories().len(),
        if editor_config.pooled { "fixed" } else { "growable" },
        editor.history().capacity()
    );
}

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PolygonEditor>()
            .init_resource::<CanvasSettings>()
            .init_gizmo_group::<rendering::PolygonGizmoGroup>()
            .init_gizmo_group::<rendering::PointCloudGizmoGroup>()
            .add_systems(
                Startup,
                (
                    camera::spawn_camera,
                    configure_from_config.after(ConfigLoaded),
                ),
            )
            .add_systems(
                Update,
                (
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::apply_camera_zoom,
                    camera::focus_camera_on_point_cloud
                        .run_if(resource_changed::<LoadedPointCloud>),
                ),
            )
            .add_systems(
                Update,
                (
                    (
                        controls::handle_pointer_input,
                        controls::handle_editor_shortcuts,
                    )
                        .run_if(no_dialog_open),
                    controls::update_cursor_icon,
                    rendering::draw_point_cloud,
                    rendering::draw_polygons,
                )
                    .chain(),
            );
    }
}

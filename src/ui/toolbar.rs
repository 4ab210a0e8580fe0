use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::editor::CanvasSettings;
use crate::editor::polygons::{EditorCommand, EditorMode, PolygonEditor};
use crate::persistence::{AsyncDocumentOperation, CurrentDocument, LoadedPointCloud};

use super::hex_to_color32;

/// Usage hint for the status bar
pub fn mode_hint(mode: EditorMode) -> &'static str {
    match mode {
        EditorMode::Idle => "E: new polygon | Click a polygon to edit it",
        EditorMode::Create => {
            "Left click: add point | Right click near last point: remove it | Esc: finish"
        }
        EditorMode::Edit => {
            "Drag vertex: move | Click edge: insert | Right click vertex: remove | \
             Arrows: category | Del: delete | Esc: done"
        }
    }
}

fn command_button(ui: &mut egui::Ui, label: &str, hover: &str, enabled: bool) -> bool {
    let button = egui::Button::new(egui::RichText::new(label).size(14.0).strong())
        .min_size(egui::vec2(0.0, 28.0));
    ui.add_enabled(enabled, button).on_hover_text(hover).clicked()
}

/// Main toolbar with editor commands and the category selector
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut editor: ResMut<PolygonEditor>,
    mut settings: ResMut<CanvasSettings>,
    point_cloud: Res<LoadedPointCloud>,
    current_document: Res<CurrentDocument>,
) -> Result {
    let mut command = None;
    let mut category_choice = None;

    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                let creating = editor.mode() == EditorMode::Create;
                if command_button(ui, "New Polygon", "Start a polygon (E)", true) {
                    command = Some(EditorCommand::StartCreate);
                }
                if command_button(ui, "Finish", "Close the draft or leave editing (Esc)", editor.mode() != EditorMode::Idle) {
                    command = Some(EditorCommand::Finish);
                }
                if command_button(ui, "Delete", "Delete the selected polygon (Del)", editor.selected_id().is_some()) {
                    command = Some(EditorCommand::DeleteSelected);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if command_button(ui, "Undo", "Undo (Ctrl+Z)", editor.history().can_undo()) {
                    command = Some(EditorCommand::Undo);
                }
                if command_button(ui, "Redo", "Redo (Ctrl+Y)", editor.history().can_redo()) {
                    command = Some(EditorCommand::Redo);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                // Category of the selected polygon
                ui.label("Category:");
                let current = editor
                    .selected_polygon()
                    .map(|p| p.category.clone());
                ui.add_enabled_ui(current.is_some(), |ui| {
                    egui::ComboBox::from_id_salt("category_select")
                        .selected_text(current.as_deref().unwrap_or("-"))
                        .width(140.0)
                        .show_ui(ui, |ui| {
                            for category in editor.categories().iter() {
                                let is_selected = current.as_deref() == Some(category.name.as_str());
                                let label = egui::RichText::new(&category.name)
                                    .color(hex_to_color32(category.color));
                                if ui.selectable_label(is_selected, label).clicked() && !is_selected {
                                    category_choice = Some(category.name.clone());
                                }
                            }
                        });
                });

                ui.add_space(8.0);
                ui.add_enabled(
                    point_cloud.cloud.is_some(),
                    egui::Checkbox::new(&mut settings.show_point_cloud, "Point cloud"),
                );

                // Right-aligned document name
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(current_document.display_name()).strong());
                    if creating {
                        ui.colored_label(egui::Color32::from_rgb(100, 200, 100), "Drawing");
                    }
                });
            });
        });

    if let Some(command) = command {
        let _ = editor.handle_command(command);
    }
    if let Some(name) = category_choice {
        let _ = editor.set_selected_category(&name);
    }
    Ok(())
}

/// Bottom status bar: mode, hint, counts and the last refused operation
pub fn status_bar_ui(
    mut contexts: EguiContexts,
    editor: Res<PolygonEditor>,
    point_cloud: Res<LoadedPointCloud>,
    async_op: Res<AsyncDocumentOperation>,
) -> Result {
    egui::TopBottomPanel::bottom("status_bar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 4))
                .fill(egui::Color32::from_rgb(45, 45, 48)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(editor.mode().label()).strong());
                ui.separator();
                ui.label(
                    egui::RichText::new(mode_hint(editor.mode()))
                        .color(egui::Color32::GRAY)
                        .size(11.0),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(description) = &async_op.operation_description {
                        ui.spinner();
                        ui.label(description);
                        ui.separator();
                    }
                    if let Some(cloud) = &point_cloud.cloud {
                        ui.weak(format!("{} ({} pts)", cloud.name, cloud.points.len()));
                        ui.separator();
                    }
                    ui.weak(format!("{} polygons", editor.polygons().len()));
                    if let Some(error) = editor.last_error() {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(230, 160, 60), error.to_string());
                    }
                });
            });
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_mode_has_a_hint() {
        for mode in [EditorMode::Idle, EditorMode::Create, EditorMode::Edit] {
            assert!(!mode_hint(mode).is_empty());
        }
        assert!(mode_hint(EditorMode::Create).contains("Esc"));
    }
}

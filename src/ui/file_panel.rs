//! Side panel for opening, saving and exporting documents and loading point clouds.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::paths;
use crate::persistence::{
    AsyncDocumentOperation, CurrentDocument, DocumentStatus, ExportAnnotationsRequest,
    LoadPointCloudRequest, NewDocumentRequest, OpenDocumentRequest, SaveDocumentRequest,
};

const DEFAULT_DOCUMENT_NAME: &str = "annotations.json";
const DEFAULT_EXPORT_NAME: &str = "annotations_coco.json";

#[derive(Resource, Default)]
pub struct FilePanelState {
    pub document_path: String,
    pub export_path: String,
    pub point_cloud_path: String,
    pub show_new_confirmation: bool,
}

/// Parse a path field, rejecting blank input
pub fn path_from_field(field: &str) -> Option<PathBuf> {
    let trimmed = field.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Startup system filling the path fields from config
pub fn init_file_panel(config: Res<AppConfig>, mut state: ResMut<FilePanelState>) {
    let documents = paths::documents_dir();

    state.document_path = config
        .data
        .last_document_path
        .clone()
        .unwrap_or_else(|| documents.join(DEFAULT_DOCUMENT_NAME))
        .to_string_lossy()
        .into_owned();
    state.export_path = documents
        .join(DEFAULT_EXPORT_NAME)
        .to_string_lossy()
        .into_owned();
    state.point_cloud_path = config
        .data
        .point_cloud_path
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
}

/// Keep the document field in step with the file last saved or opened
pub fn sync_document_path(current: Res<CurrentDocument>, mut state: ResMut<FilePanelState>) {
    if let Some(path) = &current.path {
        state.document_path = path.to_string_lossy().into_owned();
    }
}

fn path_row(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.label(label);
    ui.add(egui::TextEdit::singleline(value).desired_width(f32::INFINITY));
}

fn wide_button(ui: &mut egui::Ui, label: &str, enabled: bool) -> bool {
    ui.add_enabled(enabled, egui::Button::new(label).min_size(egui::vec2(80.0, 24.0)))
        .clicked()
}

#[allow(clippy::too_many_arguments)]
pub fn file_panel_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<FilePanelState>,
    async_op: Res<AsyncDocumentOperation>,
    status: Res<DocumentStatus>,
    mut open_events: MessageWriter<OpenDocumentRequest>,
    mut save_events: MessageWriter<SaveDocumentRequest>,
    mut export_events: MessageWriter<ExportAnnotationsRequest>,
    mut cloud_events: MessageWriter<LoadPointCloudRequest>,
) -> Result {
    let idle = !async_op.is_busy();

    egui::SidePanel::left("file_panel")
        .default_width(260.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.heading("Document");
            ui.add_space(4.0);

            path_row(ui, "File:", &mut state.document_path);
            let document = path_from_field(&state.document_path);
            ui.horizontal(|ui| {
                if wide_button(ui, "Open", idle && document.is_some())
                    && let Some(path) = document.clone()
                {
                    open_events.write(OpenDocumentRequest { path });
                }
                if wide_button(ui, "Save", idle && document.is_some())
                    && let Some(path) = document.clone()
                {
                    save_events.write(SaveDocumentRequest { path });
                }
                if wide_button(ui, "New", idle) {
                    state.show_new_confirmation = true;
                }
            });
            ui.label(
                egui::RichText::new("Open accepts saved documents and annotation files")
                    .color(egui::Color32::GRAY)
                    .size(11.0),
            );

            ui.add_space(10.0);
            ui.separator();
            ui.heading("Export");
            path_row(ui, "Annotations:", &mut state.export_path);
            let export = path_from_field(&state.export_path);
            if wide_button(ui, "Export", idle && export.is_some())
                && let Some(path) = export
            {
                export_events.write(ExportAnnotationsRequest { path });
            }

            ui.add_space(10.0);
            ui.separator();
            ui.heading("Point Cloud");
            path_row(ui, "PCD / XYZ file:", &mut state.point_cloud_path);
            let cloud = path_from_field(&state.point_cloud_path);
            if wide_button(ui, "Load", idle && cloud.is_some())
                && let Some(path) = cloud
            {
                cloud_events.write(LoadPointCloudRequest { path });
            }

            if let Some(notice) = &status.notice {
                ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                    ui.add_space(8.0);
                    ui.colored_label(egui::Color32::from_rgb(100, 200, 100), notice);
                });
            }
        });
    Ok(())
}

/// Confirmation before discarding the current document
pub fn new_document_dialog_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<FilePanelState>,
    mut new_events: MessageWriter<NewDocumentRequest>,
) -> Result {
    if !state.show_new_confirmation {
        return Ok(());
    }

    egui::Window::new("New Document")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Clear all polygons? This can be undone with Ctrl+Z.");
            ui.horizontal(|ui| {
                if ui.button("Clear").clicked() {
                    new_events.write(NewDocumentRequest);
                    state.show_new_confirmation = false;
                }
                if ui.button("Cancel").clicked() {
                    state.show_new_confirmation = false;
                }
            });
        });
    Ok(())
}

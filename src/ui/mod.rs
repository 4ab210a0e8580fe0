mod dialogs;
mod file_panel;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::{EguiPrimaryContextPass, egui};

use crate::config::{ConfigLoaded, ConfigResetNotification, MissingDocumentWarning};
use crate::persistence::{AsyncDocumentOperation, CurrentDocument, DocumentStatus};

/// Resource that tracks whether any modal dialog is currently open.
/// Canvas input handlers check this to avoid editing behind a dialog.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block editor input
    pub any_modal_open: bool,
}

/// Aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    file_panel: Res<file_panel::FilePanelState>,
    missing_document: Res<MissingDocumentWarning>,
    config_reset: Res<ConfigResetNotification>,
    status: Res<DocumentStatus>,
    async_op: Res<AsyncDocumentOperation>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = file_panel.show_new_confirmation
        || missing_document.show
        || config_reset.show
        || status.has_error()
        || async_op.is_busy();
}

/// Run condition: true when no modal dialog is open.
pub fn no_dialog_open(dialog_state: Res<DialogState>) -> bool {
    !dialog_state.any_modal_open
}

/// `0xRRGGBB` category color for egui widgets
pub fn hex_to_color32(rgb: u32) -> egui::Color32 {
    egui::Color32::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<file_panel::FilePanelState>()
            .add_systems(Startup, file_panel::init_file_panel.after(ConfigLoaded))
            .add_systems(
                Update,
                file_panel::sync_document_path.run_if(resource_changed::<CurrentDocument>),
            )
            // Side panel first so the top and bottom bars fit beside it
            .add_systems(
                EguiPrimaryContextPass,
                (
                    file_panel::file_panel_ui,
                    toolbar::toolbar_ui,
                    toolbar::status_bar_ui,
                )
                    .chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Last: dialogs/overlays
                    file_panel::new_document_dialog_ui,
                    dialogs::document_error_dialog_ui,
                    dialogs::missing_document_warning_ui,
                    dialogs::config_reset_notification_ui,
                    dialogs::async_operation_modal_ui,
                )
                    .after(toolbar::status_bar_ui),
            )
            // Update dialog state at the start of each frame
            .add_systems(First, update_dialog_state);
    }
}

//! Document save and export systems and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::UpdateLastDocumentPathRequest;
use crate::editor::polygons::PolygonEditor;

use super::annotation_format::export_annotations;
use super::document::SnapshotDocument;
use super::messages::{ExportAnnotationsRequest, SaveDocumentRequest};
use super::resources::{
    AsyncDocumentOperation, CurrentDocument, DocumentStatus, LoadedPointCloud, SaveDocumentTask,
};
use super::results::{SaveKind, SaveResult};

pub(super) fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string()
}

/// Serialize and write `data` on the IO task pool
fn spawn_write_task<T: Serialize + Send + 'static>(
    commands: &mut Commands,
    async_op: &mut AsyncDocumentOperation,
    path: PathBuf,
    kind: SaveKind,
    data: T,
) {
    async_op.is_saving = true;
    async_op.operation_description = Some(format!("Saving {}...", file_label(&path)));

    let task = IoTaskPool::get().spawn(async move {
        let error = match serde_json::to_string_pretty(&data) {
            Ok(json) => std::fs::write(&path, json)
                .err()
                .map(|e| format!("Failed to write file: {}", e)),
            Err(e) => Some(format!("Failed to serialize document: {}", e)),
        };
        SaveResult { path, kind, error }
    });

    commands.spawn(SaveDocumentTask(task));
}

/// Starts an async save of the native snapshot document
pub fn save_document_system(
    mut commands: Commands,
    mut events: MessageReader<SaveDocumentRequest>,
    editor: Res<PolygonEditor>,
    mut async_op: ResMut<AsyncDocumentOperation>,
) {
    for event in events.read() {
        // Don't start a new save if one is already in progress
        if async_op.is_busy() {
            warn!("Save operation already in progress");
            continue;
        }

        let document = SnapshotDocument::new(editor.snapshot(), editor.categories());
        spawn_write_task(
            &mut commands,
            &mut async_op,
            event.path.clone(),
            SaveKind::Document,
            document,
        );
    }
}

/// Starts an async export in the annotation format
pub fn export_annotations_system(
    mut commands: Commands,
    mut events: MessageReader<ExportAnnotationsRequest>,
    editor: Res<PolygonEditor>,
    point_cloud: Res<LoadedPointCloud>,
    mut async_op: ResMut<AsyncDocumentOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Save operation already in progress");
            continue;
        }

        let document = export_annotations(
            editor.polygons(),
            editor.categories(),
            point_cloud.cloud.as_ref(),
        );
        info!(
            "Exporting {} of {} polygons",
            document.annotations.len(),
            editor.polygons().len()
        );
        spawn_write_task(
            &mut commands,
            &mut async_op,
            event.path.clone(),
            SaveKind::Annotations,
            document,
        );
    }
}

/// Polls save tasks and handles completion
pub fn poll_save_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut SaveDocumentTask)>,
    mut async_op: ResMut<AsyncDocumentOperation>,
    mut status: ResMut<DocumentStatus>,
    mut current_document: ResMut<CurrentDocument>,
    mut config_events: MessageWriter<UpdateLastDocumentPathRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            // Clear async state
            async_op.is_saving = false;
            async_op.operation_description = None;

            match result.error {
                None => {
                    info!("{:?} written to {:?}", result.kind, result.path);
                    status.save_error = None;

                    let label = file_label(&result.path);
                    status.notice = Some(match result.kind {
                        SaveKind::Document => format!("Saved {}", label),
                        SaveKind::Annotations => format!("Exported {}", label),
                    });

                    // Exports are not reopened as the working document
                    if result.kind == SaveKind::Document {
                        current_document.path = Some(result.path.clone());
                        config_events.write(UpdateLastDocumentPathRequest { path: result.path });
                    }
                }
                Some(error) => {
                    error!("{}", error);
                    status.save_error = Some(error);
                }
            }

            commands.entity(entity).despawn();
        }
    }
}

/// Startup system creating the default documents directory
pub fn ensure_documents_directory() {
    let documents_dir = crate::paths::documents_dir();
    if !documents_dir.exists()
        && let Err(e) = std::fs::create_dir_all(&documents_dir)
    {
        warn!("Failed to create documents directory: {}", e);
    }
}

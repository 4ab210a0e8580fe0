//! Document and point cloud load systems and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::config::{AppConfig, UpdateLastDocumentPathRequest, UpdatePointCloudPathRequest};
use crate::editor::polygons::{EditorError, PolygonEditor};

use super::annotation_format::import_annotations;
use super::document::{Document, parse_document};
use super::messages::{LoadPointCloudRequest, NewDocumentRequest, OpenDocumentRequest};
use super::point_cloud::parse_point_cloud;
use super::resources::{
    AsyncDocumentOperation, CurrentDocument, DocumentStatus, LoadDocumentTask,
    LoadPointCloudTask, LoadedPointCloud,
};
use super::results::{LoadResult, PointCloudResult};
use super::save::file_label;

/// What opening a document did to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedDocument {
    Snapshot { polygons: usize },
    Annotations { imported: usize, skipped: usize },
}

impl AppliedDocument {
    fn notice(&self, label: &str) -> String {
        match self {
            AppliedDocument::Snapshot { polygons } => {
                format!("Opened {} ({} polygons)", label, polygons)
            }
            AppliedDocument::Annotations { imported, skipped: 0 } => {
                format!("Imported {} polygons from {}", imported, label)
            }
            AppliedDocument::Annotations { imported, skipped } => format!(
                "Imported {} polygons from {} ({} skipped)",
                imported, label, skipped
            ),
        }
    }
}

/// Apply a parsed document to the editor as one history step.
/// A malformed annotation file leaves the editor untouched.
pub fn apply_document(
    editor: &mut PolygonEditor,
    document: Document,
    cloud_name: Option<&str>,
) -> Result<AppliedDocument, EditorError> {
    match document {
        Document::Snapshot(snapshot) => {
            let categories = snapshot.category_table();
            editor.load_snapshot(&snapshot.state, categories);
            Ok(AppliedDocument::Snapshot {
                polygons: editor.polygons().len(),
            })
        }
        Document::Annotations(value) => {
            let import = import_annotations(&value, editor.categories(), cloud_name)?;
            let skipped = import.skipped;
            let imported = editor.replace_polygons(import.shapes, import.categories);
            Ok(AppliedDocument::Annotations { imported, skipped })
        }
    }
}

/// Starts an async document read (file I/O and JSON parsing only)
pub fn open_document_system(
    mut commands: Commands,
    mut events: MessageReader<OpenDocumentRequest>,
    mut async_op: ResMut<AsyncDocumentOperation>,
) {
    for event in events.read() {
        // Don't start a new load if one is already in progress
        if async_op.is_busy() {
            warn!("Load operation already in progress");
            continue;
        }

        let path = event.path.clone();
        async_op.is_loading = true;
        async_op.operation_description = Some(format!("Opening {}...", file_label(&path)));

        let task = IoTaskPool::get().spawn(async move {
            let json = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    return LoadResult {
                        path,
                        document: None,
                        error: Some(format!("Failed to read file: {}", e)),
                    };
                }
            };

            match parse_document(&json) {
                Ok(document) => LoadResult {
                    path,
                    document: Some(document),
                    error: None,
                },
                Err(e) => LoadResult {
                    path,
                    document: None,
                    error: Some(format!("Failed to open document: {}", e)),
                },
            }
        });

        commands.spawn(LoadDocumentTask(task));
    }
}

/// Polls document load tasks and applies the result to the editor
#[allow(clippy::too_many_arguments)]
pub fn poll_load_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadDocumentTask)>,
    mut async_op: ResMut<AsyncDocumentOperation>,
    mut editor: ResMut<PolygonEditor>,
    point_cloud: Res<LoadedPointCloud>,
    mut status: ResMut<DocumentStatus>,
    mut current_document: ResMut<CurrentDocument>,
    mut config_events: MessageWriter<UpdateLastDocumentPathRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            // Clear async state
            async_op.is_loading = false;
            async_op.operation_description = None;
            status.load_error = None;

            if let Some(error) = result.error {
                error!("{}", error);
                status.load_error = Some(error);
                commands.entity(entity).despawn();
                continue;
            }

            let Some(document) = result.document else {
                commands.entity(entity).despawn();
                continue;
            };

            match apply_document(&mut editor, document, point_cloud.name()) {
                Ok(applied) => {
                    info!("Opened {:?}: {:?}", result.path, applied);
                    status.notice = Some(applied.notice(&file_label(&result.path)));

                    if matches!(applied, AppliedDocument::Snapshot { .. }) {
                        current_document.path = Some(result.path.clone());
                    }
                    config_events.write(UpdateLastDocumentPathRequest { path: result.path });
                }
                Err(e) => {
                    let message = format!("Failed to import annotations: {}", e);
                    error!("{}", message);
                    status.load_error = Some(message);
                }
            }

            commands.entity(entity).despawn();
        }
    }
}

/// Starts an async point cloud read and parse
pub fn load_point_cloud_system(
    mut commands: Commands,
    mut events: MessageReader<LoadPointCloudRequest>,
    mut async_op: ResMut<AsyncDocumentOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Load operation already in progress");
            continue;
        }

        let path = event.path.clone();
        async_op.is_loading = true;
        async_op.operation_description = Some(format!("Loading {}...", file_label(&path)));

        let task = IoTaskPool::get().spawn(async move {
            // Binary PCD payloads are not UTF-8; the parser reports them by header
            let text = match std::fs::read(&path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    return PointCloudResult {
                        path,
                        cloud: None,
                        error: Some(format!("Failed to read point cloud: {}", e)),
                    };
                }
            };

            match parse_point_cloud(&path.to_string_lossy(), &text) {
                Ok(cloud) => PointCloudResult {
                    path,
                    cloud: Some(cloud),
                    error: None,
                },
                Err(e) => PointCloudResult {
                    path,
                    cloud: None,
                    error: Some(format!("Failed to load point cloud: {}", e)),
                },
            }
        });

        commands.spawn(LoadPointCloudTask(task));
    }
}

/// Polls point cloud tasks and stores the loaded cloud
pub fn poll_point_cloud_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadPointCloudTask)>,
    mut async_op: ResMut<AsyncDocumentOperation>,
    mut point_cloud: ResMut<LoadedPointCloud>,
    mut status: ResMut<DocumentStatus>,
    mut config_events: MessageWriter<UpdatePointCloudPathRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            async_op.is_loading = false;
            async_op.operation_description = None;

            match (result.cloud, result.error) {
                (Some(cloud), _) => {
                    info!("Loaded {} points from {:?}", cloud.points.len(), result.path);
                    status.load_error = None;
                    status.notice = Some(format!(
                        "Loaded {} ({} points)",
                        cloud.name,
                        cloud.points.len()
                    ));
                    point_cloud.cloud = Some(cloud);
                    config_events.write(UpdatePointCloudPathRequest { path: result.path });
                }
                (None, error) => {
                    let message = error.unwrap_or_else(|| "Failed to load point cloud".into());
                    error!("{}", message);
                    status.load_error = Some(message);
                }
            }

            commands.entity(entity).despawn();
        }
    }
}

/// Startup system reloading the point cloud remembered in config
pub fn restore_point_cloud_from_config(
    config: Res<AppConfig>,
    mut events: MessageWriter<LoadPointCloudRequest>,
) {
    if let Some(path) = &config.data.point_cloud_path {
        if path.exists() {
            events.write(LoadPointCloudRequest { path: path.clone() });
        } else {
            info!("Remembered point cloud no longer exists: {:?}", path);
        }
    }
}

/// Clears the editor for a fresh document
pub fn new_document_system(
    mut events: MessageReader<NewDocumentRequest>,
    mut editor: ResMut<PolygonEditor>,
    mut current_document: ResMut<CurrentDocument>,
    mut status: ResMut<DocumentStatus>,
) {
    for _ in events.read() {
        editor.clear();
        current_document.path = None;
        status.clear_errors();
        status.notice = Some("New document".to_string());
        info!("Started a new document");
    }
}

//! Resource types for document persistence state tracking.

use bevy::prelude::*;
use bevy::tasks::Task;
use std::path::PathBuf;

use super::point_cloud::PointCloud;
use super::results::{LoadResult, PointCloudResult, SaveResult};

/// Outcome of the last I/O operations, for display to the user
#[derive(Resource, Default)]
pub struct DocumentStatus {
    pub load_error: Option<String>,
    pub save_error: Option<String>,
    /// Short confirmation of the last successful operation
    pub notice: Option<String>,
}

impl DocumentStatus {
    pub fn has_error(&self) -> bool {
        self.load_error.is_some() || self.save_error.is_some()
    }

    pub fn clear_errors(&mut self) {
        self.load_error = None;
        self.save_error = None;
    }
}

/// Resource tracking async document I/O for the busy indicator
#[derive(Resource, Default)]
pub struct AsyncDocumentOperation {
    pub is_saving: bool,
    pub is_loading: bool,
    /// Description of the current operation
    pub operation_description: Option<String>,
}

impl AsyncDocumentOperation {
    pub fn is_busy(&self) -> bool {
        self.is_saving || self.is_loading
    }
}

/// Native document the editor state was last opened from or saved to
#[derive(Resource, Default)]
pub struct CurrentDocument {
    pub path: Option<PathBuf>,
}

impl CurrentDocument {
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled")
            .to_string()
    }
}

/// Point cloud shown under the polygons and used for export grid parameters
#[derive(Resource, Default)]
pub struct LoadedPointCloud {
    pub cloud: Option<PointCloud>,
}

impl LoadedPointCloud {
    pub fn name(&self) -> Option<&str> {
        self.cloud.as_ref().map(|c| c.name.as_str())
    }
}

/// Component for save task
#[derive(Component)]
pub struct SaveDocumentTask(pub Task<SaveResult>);

/// Component for load task
#[derive(Component)]
pub struct LoadDocumentTask(pub Task<LoadResult>);

/// Component for point cloud load task
#[derive(Component)]
pub struct LoadPointCloudTask(pub Task<PointCloudResult>);

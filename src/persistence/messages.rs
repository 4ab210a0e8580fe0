//! Message types for document persistence operations.

use bevy::prelude::*;
use std::path::PathBuf;

/// Save the editor state in the native snapshot format
#[derive(Message)]
pub struct SaveDocumentRequest {
    pub path: PathBuf,
}

/// Write closed polygons in the annotation format
#[derive(Message)]
pub struct ExportAnnotationsRequest {
    pub path: PathBuf,
}

/// Open a snapshot or annotation file, detecting which one it is
#[derive(Message)]
pub struct OpenDocumentRequest {
    pub path: PathBuf,
}

#[derive(Message)]
pub struct LoadPointCloudRequest {
    pub path: PathBuf,
}

#[derive(Message)]
pub struct NewDocumentRequest;

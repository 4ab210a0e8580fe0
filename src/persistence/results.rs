//! Result types for async document operations.

use std::path::PathBuf;

use super::document::Document;
use super::point_cloud::PointCloud;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Document,
    Annotations,
}

/// Result of an async save or export
pub struct SaveResult {
    pub path: PathBuf,
    pub kind: SaveKind,
    pub error: Option<String>,
}

/// Result of an async document read
pub struct LoadResult {
    pub path: PathBuf,
    pub document: Option<Document>,
    pub error: Option<String>,
}

/// Result of an async point cloud read
pub struct PointCloudResult {
    pub path: PathBuf,
    pub cloud: Option<PointCloud>,
    pub error: Option<String>,
}

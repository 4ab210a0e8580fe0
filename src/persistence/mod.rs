//! Document persistence: the native snapshot format, the annotation
//! interchange format and point cloud loading.
//!
//! File I/O runs on the IO task pool; the editor is only touched when a
//! task completes, so a failed read never leaves it half updated.
//!
//! ## Module Structure
//!
//! - [`document`] - Native document format and format detection
//! - [`annotation_format`] - Annotation export and lenient import
//! - [`point_cloud`] - PCD / xyz parsing
//! - [`grid`] - Raster grid parameters written with exported images
//! - [`save`] / [`load`] - Systems and task polling

pub mod annotation_format;
pub mod document;
pub mod grid;
mod load;
mod messages;
pub mod point_cloud;
mod resources;
mod results;
mod save;

#[cfg(test)]
mod tests;

use bevy::prelude::*;

use crate::config::ConfigLoaded;

// Re-exports - Messages
pub use messages::{
    ExportAnnotationsRequest, LoadPointCloudRequest, NewDocumentRequest, OpenDocumentRequest,
    SaveDocumentRequest,
};

// Re-exports - Resources
pub use resources::{AsyncDocumentOperation, CurrentDocument, DocumentStatus, LoadedPointCloud};


pub struct PersistencePlugin;

impl Plugin for PersistencePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DocumentStatus>()
            .init_resource::<AsyncDocumentOperation>()
            .init_resource::<CurrentDocument>()
            .init_resource::<LoadedPointCloud>()
            .add_message::<SaveDocumentRequest>()
            .add_message::<ExportAnnotationsRequest>()
            .add_message::<OpenDocumentRequest>()
            .add_message::<LoadPointCloudRequest>()
            .add_message::<NewDocumentRequest>()
            .add_systems(
                Startup,
                (
                    save::ensure_documents_directory,
                    load::restore_point_cloud_from_config.after(ConfigLoaded),
                ),
            )
            .add_systems(
                Update,
                (
                    save::save_document_system.run_if(on_message::<SaveDocumentRequest>),
                    save::export_annotations_system
                        .run_if(on_message::<ExportAnnotationsRequest>),
                    load::open_document_system.run_if(on_message::<OpenDocumentRequest>),
                    load::load_point_cloud_system.run_if(on_message::<LoadPointCloudRequest>),
                    load::new_document_system.run_if(on_message::<NewDocumentRequest>),
                    save::poll_save_tasks,
                    load::poll_load_tasks,
                    load::poll_point_cloud_tasks,
                ),
            );
    }
}

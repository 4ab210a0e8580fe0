use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::editor::polygons::CategoryEntry;

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Tuning for the polygon editor core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// World distance under which a vertex is hit
    pub vertex_threshold: f32,
    /// World distance under which an edge is hit
    pub edge_threshold: f32,
    /// Screen distance (pixels) for removing the last point with a secondary click
    pub undo_threshold_px: f32,
    /// Radius of drawn vertex markers in world units
    pub vertex_size: f32,
    pub line_thickness: f32,
    /// Fixed-capacity handle pools instead of growing ones
    pub pooled: bool,
    pub vertex_pool_capacity: usize,
    pub edge_pool_capacity: usize,
    pub history_capacity: usize,
    /// Empty means the built-in category list
    pub categories: Vec<CategoryEntry>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            vertex_threshold: 0.5,
            edge_threshold: 0.3,
            undo_threshold_px: 10.0,
            vertex_size: 0.15,
            line_thickness: 2.0,
            pooled: true,
            vertex_pool_capacity: 1000,
            edge_pool_capacity: 1000,
            history_capacity: crate::editor::history::DEFAULT_HISTORY_CAPACITY,
            categories: Vec::new(),
        }
    }
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfigData {
    #[serde(default)]
    pub editor: EditorConfig,

    /// Last opened or saved document (not auto-loaded, just remembered for quick access)
    #[serde(default)]
    pub last_document_path: Option<PathBuf>,

    /// Point cloud shown under the annotations
    #[serde(default)]
    pub point_cloud_path: Option<PathBuf>,
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: get_config_path(),
            dirty: false,
        }
    }
}

/// Resource for the "document file missing" warning dialog
#[derive(Resource, Default)]
pub struct MissingDocumentWarning {
    pub show: bool,
    pub path: Option<PathBuf>,
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to update the last document path in config
#[derive(Message)]
pub struct UpdateLastDocumentPathRequest {
    pub path: PathBuf,
}

/// Message to remember the loaded point cloud in config
#[derive(Message)]
pub struct UpdatePointCloudPathRequest {
    pub path: PathBuf,
}

/// Get the path to the config file (platform-appropriate location)
fn get_config_path() -> PathBuf {
    crate::paths::config_file()
}

/// Parse config JSON, returning the reset reason on failure
fn parse_config(json: &str) -> Result<AppConfigData, String> {
    serde_json::from_str(json).map_err(|e| format!("Configuration file was corrupted: {}", e))
}

/// Result of loading config from disk
struct LoadConfigResult {
    config: AppConfig,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Load configuration from disk
fn load_config() -> LoadConfigResult {
    let config_path = get_config_path();

    let (data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match parse_config(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    (data, None)
                }
                Err(reason) => {
                    warn!("Failed to parse config file: {}", reason);
                    (AppConfigData::default(), Some(reason))
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    LoadConfigResult {
        config: AppConfig {
            data,
            config_path,
            dirty: false,
        },
        reset_reason,
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config();
    config.data = result.config.data;
    config.config_path = result.config.config_path;
    config.dirty = result.config.dirty;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// Startup system to check if the last document exists
fn check_last_document_exists(
    config: Res<AppConfig>,
    mut warning: ResMut<MissingDocumentWarning>,
) {
    if let Some(ref path) = config.data.last_document_path
        && !path.exists()
    {
        warning.show = true;
        warning.path = Some(path.clone());
        info!("Last opened document no longer exists: {:?}", path);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to update last document path
fn update_last_document_path_system(
    mut events: MessageReader<UpdateLastDocumentPathRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.last_document_path.as_ref() == Some(&event.path) {
            continue;
        }
        config.data.last_document_path = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

/// System to update the remembered point cloud path
fn update_point_cloud_path_system(
    mut events: MessageReader<UpdatePointCloudPathRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.point_cloud_path.as_ref() == Some(&event.path) {
            continue;
        }
        config.data.point_cloud_path = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<MissingDocumentWarning>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<UpdateLastDocumentPathRequest>()
            .add_message::<UpdatePointCloudPathRequest>()
            .add_systems(
                Startup,
                (load_config_system, check_last_document_exists)
                    .chain()
                    .in_set(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                    update_last_document_path_system
                        .run_if(on_message::<UpdateLastDocumentPathRequest>),
                    update_point_cloud_path_system
                        .run_if(on_message::<UpdatePointCloudPathRequest>),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert!(data.last_document_path.is_none());
        assert!(data.point_cloud_path.is_none());
        assert_eq!(data.editor, EditorConfig::default());
    }

    #[test]
    fn test_editor_config_defaults() {
        let editor = EditorConfig::default();
        assert_eq!(editor.vertex_threshold, 0.5);
        assert_eq!(editor.edge_threshold, 0.3);
        assert_eq!(editor.undo_threshold_px, 10.0);
        assert!(editor.pooled);
        assert_eq!(editor.vertex_pool_capacity, 1000);
        assert_eq!(editor.edge_pool_capacity, 1000);
        assert_eq!(editor.history_capacity, 50);
        assert!(editor.categories.is_empty());
    }

    #[test]
    fn test_app_config_data_serialization() {
        let mut data = AppConfigData {
            last_document_path: Some(PathBuf::from("/path/to/scene.json")),
            point_cloud_path: Some(PathBuf::from("/path/to/cloud.pcd")),
            ..Default::default()
        };
        data.editor.pooled = false;
        data.editor.categories = vec![CategoryEntry {
            id: 7,
            name: "curb".into(),
            color: Some(0x00ff00),
        }];

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.last_document_path, data.last_document_path);
        assert_eq!(parsed.point_cloud_path, data.point_cloud_path);
        assert_eq!(parsed.editor, data.editor);
    }

    #[test]
    fn test_partial_editor_config_fills_defaults() {
        let parsed = parse_config(r#"{"editor": {"vertex_threshold": 1.25}}"#).unwrap();
        assert_eq!(parsed.editor.vertex_threshold, 1.25);
        assert_eq!(parsed.editor.edge_threshold, 0.3);
        assert_eq!(parsed.editor.history_capacity, 50);
    }

    #[test]
    fn test_corrupt_config_reports_reason() {
        let reason = parse_config("{not json").unwrap_err();
        assert!(reason.starts_with("Configuration file was corrupted"));
    }

    #[test]
    fn test_missing_document_warning_default() {
        let warning = MissingDocumentWarning::default();
        assert!(!warning.show);
        assert!(warning.path.is_none());
    }
}

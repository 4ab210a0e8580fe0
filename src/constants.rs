//! Centralized constants used across the application.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Upper bound on point cloud points drawn per frame; larger clouds are sampled.
pub const MAX_DRAWN_CLOUD_POINTS: usize = 50_000;

/// Initial orthographic scale in world units (meters) per pixel
pub const DEFAULT_CAMERA_SCALE: f32 = 0.05;

/// Zoom limits in world units per pixel
pub const MIN_CAMERA_SCALE: f32 = 0.001;
pub const MAX_CAMERA_SCALE: f32 = 5.0;

/// Dash and gap length of the create preview, in world units
pub const PREVIEW_DASH_LENGTH: f32 = 0.5;
pub const PREVIEW_GAP_LENGTH: f32 = 0.3;

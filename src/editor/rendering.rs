//! Gizmo rendering of the handle pools, the create preview and the point cloud.

use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;

use crate::config::EditorConfig;
use crate::constants::{MAX_DRAWN_CLOUD_POINTS, PREVIEW_DASH_LENGTH, PREVIEW_GAP_LENGTH};
use crate::persistence::LoadedPointCloud;

use super::polygons::PolygonEditor;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct PolygonGizmoGroup;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct PointCloudGizmoGroup;

/// Display options for the canvas
#[derive(Resource)]
pub struct CanvasSettings {
    /// Radius of vertex markers in world units
    pub vertex_size: f32,
    /// Half size of the cross drawn per cloud point
    pub point_size: f32,
    pub show_point_cloud: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            vertex_size: EditorConfig::default().vertex_size,
            point_size: 0.03,
            show_point_cloud: true,
        }
    }
}

/// `0xRRGGBB` to an opaque color
pub fn hex_color(rgb: u32) -> Color {
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Split a polyline into dash segments of `dash` length separated by `gap`.
/// The pattern carries over from one segment to the next.
pub fn dash_segments(points: &[Vec2], dash: f32, gap: f32) -> Vec<(Vec2, Vec2)> {
    let mut segments = Vec::new();
    if dash <= 0.0 {
        return segments;
    }
    let period = dash + gap.max(0.0);
    let mut phase = 0.0_f32;

    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let length = start.distance(end);
        if length <= f32::EPSILON {
            continue;
        }
        let direction = (end - start) / length;

        let mut travelled = 0.0;
        while length - travelled > 1e-5 {
            let step = if phase < dash {
                // Inside a dash: draw up to its end or the segment end
                let step = (dash - phase).min(length - travelled);
                let from = start + direction * travelled;
                segments.push((from, from + direction * step));
                step
            } else {
                (period - phase).min(length - travelled)
            };
            travelled += step;
            phase = (phase + step) % period;
        }
    }
    segments
}

/// Apply the line thickness from config to the gizmo groups
pub fn configure_gizmos(config: &EditorConfig, config_store: &mut GizmoConfigStore) {
    let (polygon_config, _) = config_store.config_mut::<PolygonGizmoGroup>();
    polygon_config.line.width = config.line_thickness;

    let (cloud_config, _) = config_store.config_mut::<PointCloudGizmoGroup>();
    cloud_config.line.width = 1.0;
}

pub fn draw_polygons(
    mut gizmos: Gizmos<PolygonGizmoGroup>,
    editor: Res<PolygonEditor>,
    settings: Res<CanvasSettings>,
) {
    let drawables = editor.drawables();

    for (_, edge) in drawables.edges.iter_in_use() {
        if edge.visible {
            gizmos.line_2d(edge.start.truncate(), edge.end.truncate(), hex_color(edge.color));
        }
    }

    for (_, vertex) in drawables.vertices.iter_in_use() {
        if vertex.visible {
            gizmos.circle_2d(
                vertex.position.truncate(),
                settings.vertex_size,
                hex_color(vertex.color),
            );
        }
    }

    let preview = &drawables.preview;
    if preview.visible {
        let points: Vec<Vec2> = preview.points.iter().map(|p| p.truncate()).collect();
        let color = hex_color(preview.color).with_alpha(0.8);
        for (start, end) in dash_segments(&points, PREVIEW_DASH_LENGTH, PREVIEW_GAP_LENGTH) {
            gizmos.line_2d(start, end, color);
        }
    }
}

pub fn draw_point_cloud(
    mut gizmos: Gizmos<PointCloudGizmoGroup>,
    point_cloud: Res<LoadedPointCloud>,
    settings: Res<CanvasSettings>,
) {
    if !settings.show_point_cloud {
        return;
    }
    let Some(cloud) = &point_cloud.cloud else {
        return;
    };

    let step = cloud.points.len().div_ceil(MAX_DRAWN_CLOUD_POINTS).max(1);
    let color = Color::srgba(0.7, 0.75, 0.8, 0.6);
    let size = settings.point_size;

    for point in cloud.points.iter().step_by(step) {
        let center = point.truncate();
        gizmos.line_2d(center - Vec2::X * size, center + Vec2::X * size, color);
        gizmos.line_2d(center - Vec2::Y * size, center + Vec2::Y * size, color);
    }
}

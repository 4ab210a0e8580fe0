use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::constants::{DEFAULT_CAMERA_SCALE, MAX_CAMERA_SCALE, MIN_CAMERA_SCALE};
use crate::persistence::LoadedPointCloud;

#[derive(Component)]
pub struct EditorCamera;

/// World units (meters) per screen pixel
#[derive(Component)]
pub struct CameraZoom {
    pub scale: f32,
}

impl Default for CameraZoom {
    fn default() -> Self {
        Self {
            scale: DEFAULT_CAMERA_SCALE,
        }
    }
}

impl CameraZoom {
    /// Zoom by scroll steps; positive zooms in. Scaling is multiplicative
    /// so a step feels the same at any zoom level.
    pub fn apply_scroll(&mut self, steps: f32) {
        let factor = (1.0 - steps * 0.1).clamp(0.5, 1.5);
        self.scale = (self.scale * factor).clamp(MIN_CAMERA_SCALE, MAX_CAMERA_SCALE);
    }

    /// Scale that fits `extent` into a viewport of `viewport` pixels with a margin.
    pub fn fit(extent: Vec2, viewport: Vec2) -> f32 {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return DEFAULT_CAMERA_SCALE;
        }
        let scale = (extent / viewport).max_element() * 1.1;
        if scale.is_finite() && scale > 0.0 {
            scale.clamp(MIN_CAMERA_SCALE, MAX_CAMERA_SCALE)
        } else {
            DEFAULT_CAMERA_SCALE
        }
    }
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        EditorCamera,
        CameraZoom::default(),
        Projection::Orthographic(OrthographicProjection {
            scale: DEFAULT_CAMERA_SCALE,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_translation(Vec3::new(0.0, 0.0, 1000.0)),
    ));
}

pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut camera_query: Query<(&mut Transform, &CameraZoom), With<EditorCamera>>,
) {
    if !mouse_button.pressed(MouseButton::Middle) {
        mouse_motion.clear();
        return;
    }

    let Ok((mut transform, zoom)) = camera_query.single_mut() else {
        return;
    };

    for event in mouse_motion.read() {
        let delta = event.delta * zoom.scale;
        transform.translation.x -= delta.x;
        transform.translation.y += delta.y;
    }
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut CameraZoom, With<EditorCamera>>,
) {
    let Ok(mut zoom) = camera_query.single_mut() else {
        return;
    };

    for event in scroll_events.read() {
        let steps = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y * 0.01,
        };
        zoom.apply_scroll(steps);
    }
}

pub fn apply_camera_zoom(
    mut camera_query: Query<(&CameraZoom, &mut Projection), (With<EditorCamera>, Changed<CameraZoom>)>,
) {
    for (zoom, mut projection) in camera_query.iter_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = zoom.scale;
        }
    }
}

/// Center and fit the camera on a newly loaded point cloud
pub fn focus_camera_on_point_cloud(
    point_cloud: Res<LoadedPointCloud>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut camera_query: Query<(&mut Transform, &mut CameraZoom), With<EditorCamera>>,
) {
    let Some((min, max)) = point_cloud.cloud.as_ref().and_then(|c| c.bounds()) else {
        return;
    };
    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((mut transform, mut zoom)) = camera_query.single_mut() else {
        return;
    };

    let center = (min + max).truncate() / 2.0;
    transform.translation.x = center.x;
    transform.translation.y = center.y;
    zoom.scale = CameraZoom::fit((max - min).truncate(), window.size());
    debug!("Focused camera on point cloud at {:?}, scale {}", center, zoom.scale);
}

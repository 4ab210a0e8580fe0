//! Raster grid parameters derived from a point cloud's footprint.

use bevy::prelude::*;

/// Margin added around the cloud's bounding box, in world units
pub const GRID_PADDING: f64 = 10.0;
/// World units per grid cell
pub const GRID_RESOLUTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub width: u32,
    pub height: u32,
}

impl GridParams {
    /// Padded XY bounding box of the finite points, or `None` when there are none.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let mut finite = points.iter().filter(|p| p.is_finite());
        let first = finite.next()?;
        let (mut min, mut max) = (first.truncate(), first.truncate());
        for point in finite {
            min = min.min(point.truncate());
            max = max.max(point.truncate());
        }

        let x_range = [min.x as f64 - GRID_PADDING, max.x as f64 + GRID_PADDING];
        let y_range = [min.y as f64 - GRID_PADDING, max.y as f64 + GRID_PADDING];

        Some(Self {
            x_range,
            y_range,
            width: cells(x_range),
            height: cells(y_range),
        })
    }
}

fn cells(range: [f64; 2]) -> u32 {
    ((range[1] - range[0]) / GRID_RESOLUTION).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_pads_bounding_box() {
        let points = [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(10.0, 5.0, -1.0),
            Vec3::new(4.0, -5.0, 0.0),
        ];
        let grid = GridParams::from_points(&points).unwrap();
        assert_eq!(grid.x_range, [-10.0, 20.0]);
        assert_eq!(grid.y_range, [-15.0, 15.0]);
        assert_eq!(grid.width, 300);
        assert_eq!(grid.height, 300);
    }

    #[test]
    fn test_grid_ignores_non_finite_points() {
        let points = [Vec3::new(f32::NAN, 100.0, 0.0), Vec3::new(1.0, 1.0, 0.0)];
        let grid = GridParams::from_points(&points).unwrap();
        assert_eq!(grid.x_range, [-9.0, 11.0]);
        assert_eq!(grid.width, 200);
    }

    #[test]
    fn test_grid_needs_points() {
        assert!(GridParams::from_points(&[]).is_none());
    }
}

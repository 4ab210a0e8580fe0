//! Point cloud loading for the annotation canvas.
//!
//! Supports ASCII PCD files and plain `x y z` text files. Binary PCD payloads
//! are rejected with a readable error instead of being misparsed.

use bevy::prelude::*;

use crate::editor::polygons::EditorError;

/// A loaded point cloud
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    /// File name without directories, used to match `images[].file_name`
    pub name: String,
    pub points: Vec<Vec3>,
}

impl PointCloud {
    /// Axis-aligned bounds as `(min, max)`
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
        )
    }
}

fn malformed(reason: impl Into<String>) -> EditorError {
    EditorError::MalformedInput(reason.into())
}

/// File name component of a path, accepting both separators.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Parse a cloud from its text; the format is chosen by the file extension.
pub fn parse_point_cloud(file_name: &str, text: &str) -> Result<PointCloud, EditorError> {
    let name = basename(file_name).to_string();
    let points = if name.to_ascii_lowercase().ends_with(".pcd") {
        parse_pcd(text)?
    } else {
        parse_xyz(text)
    };

    if points.is_empty() {
        return Err(malformed(format!("{} contains no finite points", name)));
    }
    Ok(PointCloud { name, points })
}

fn parse_pcd(text: &str) -> Result<Vec<Vec3>, EditorError> {
    let mut lines = text.lines();
    let mut fields: Vec<String> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut encoding = None;

    for line in lines.by_ref() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let key = parts.next().unwrap_or_default().to_ascii_uppercase();
        match key.as_str() {
            "FIELDS" => fields = parts.map(str::to_ascii_lowercase).collect(),
            "COUNT" => counts = parts.map(|c| c.parse().unwrap_or(1)).collect(),
            "DATA" => {
                encoding = Some(parts.next().unwrap_or_default().to_ascii_lowercase());
                break;
            }
            _ => {}
        }
    }

    let encoding = encoding.ok_or_else(|| malformed("PCD header has no DATA line"))?;
    if encoding != "ascii" {
        return Err(malformed(format!(
            "unsupported PCD data encoding: {}",
            encoding
        )));
    }

    // Column of a field, accounting for multi-count fields before it
    let column = |name: &str| -> Option<usize> {
        let index = fields.iter().position(|f| f == name)?;
        Some((0..index).map(|i| counts.get(i).copied().unwrap_or(1)).sum())
    };
    let x = column("x").ok_or_else(|| malformed("PCD has no x field"))?;
    let y = column("y").ok_or_else(|| malformed("PCD has no y field"))?;
    let z = column("z");

    let points = lines
        .filter_map(|line| {
            let values: Vec<&str> = line.split_whitespace().collect();
            let value = |col: usize| values.get(col).and_then(|v| v.parse::<f32>().ok());
            let point = Vec3::new(value(x)?, value(y)?, z.and_then(value).unwrap_or(0.0));
            point.is_finite().then_some(point)
        })
        .collect();
    Ok(points)
}

/// Whitespace or comma separated `x y [z]` rows; anything else is skipped.
fn parse_xyz(text: &str) -> Vec<Vec3> {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| {
            let mut values = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<f32>().ok());
            let x = values.next()??;
            let y = values.next()??;
            let z = values.next().flatten().unwrap_or(0.0);
            let point = Vec3::new(x, y, z);
            point.is_finite().then_some(point)
        })
        .collect()
}

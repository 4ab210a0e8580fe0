//! COCO-like annotation format.
//!
//! Export writes every closed polygon as one `"3D"` polygon annotation. Import
//! is lenient: entries that cannot be used are counted and skipped, and bad
//! coordinates only drop the point they belong to.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::editor::polygons::{
    CategoryEntry, CategoryTable, EditorError, MIN_CLOSED_POINTS, Polygon, PolygonShape,
    resolve_category_id,
};

use super::grid::GridParams;
use super::point_cloud::{PointCloud, basename};

pub const POLYGON_SHAPE: &str = "polygon";
pub const ANNOTATION_TYPE: &str = "3D";
/// Image id given to the loaded point cloud on export
const EXPORT_IMAGE_ID: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Vec3> for Location {
    fn from(point: Vec3) -> Self {
        Self {
            x: point.x as f64,
            y: point.y as f64,
            z: point.z as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub category_id: i64,
    pub shape: String,
    pub location: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<i64>,
}

/// Image (point cloud) entry with its raster grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id: i64,
    pub file_name: String,
    #[serde(default)]
    pub x_range: [f64; 2],
    #[serde(default)]
    pub y_range: [f64; 2],
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl ImageEntry {
    pub fn for_cloud(cloud: &PointCloud) -> Option<Self> {
        let grid = GridParams::from_points(&cloud.points)?;
        Some(Self {
            id: EXPORT_IMAGE_ID,
            file_name: cloud.name.clone(),
            x_range: grid.x_range,
            y_range: grid.y_range,
            width: grid.width,
            height: grid.height,
        })
    }

    fn is_point_cloud(&self) -> bool {
        self.file_name.to_ascii_lowercase().ends_with(".pcd")
    }
}

/// Exported annotation file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageEntry>,
    pub annotations: Vec<AnnotationRecord>,
    pub categories: Vec<CategoryEntry>,
}

/// Build the export document. Open polygons and polygons under 3 points are left out.
pub fn export_annotations(
    polygons: &[Polygon],
    categories: &CategoryTable,
    cloud: Option<&PointCloud>,
) -> AnnotationDocument {
    let image = cloud.and_then(ImageEntry::for_cloud);
    let image_id = image.as_ref().map(|image| image.id);
    let fallback_id = categories.first().id;

    let annotations = polygons
        .iter()
        .filter(|polygon| polygon.closed && polygon.len() >= MIN_CLOSED_POINTS)
        .enumerate()
        .map(|(index, polygon)| AnnotationRecord {
            id: index as u64 + 1,
            kind: ANNOTATION_TYPE.to_string(),
            category_id: categories
                .id_for_name(&polygon.category)
                .unwrap_or(fallback_id),
            shape: POLYGON_SHAPE.to_string(),
            location: polygon.points.iter().map(|p| Location::from(*p)).collect(),
            image_id,
        })
        .collect();

    AnnotationDocument {
        images: image.into_iter().collect(),
        annotations,
        categories: categories.entries(),
    }
}

/// Result of reading an annotation file
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationImport {
    pub shapes: Vec<PolygonShape>,
    /// Replacement category table, when the file carries a non-empty one
    pub categories: Option<CategoryTable>,
    pub skipped: usize,
}

/// Annotation entry as found in the wild; every field is optional.
#[derive(Deserialize)]
struct IncomingAnnotation {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    category_id: Option<i64>,
    #[serde(default)]
    shape: Option<String>,
    #[serde(default)]
    location: Vec<Value>,
    /// `[[x, y, z], ...]`, used when `location` is absent
    #[serde(default)]
    points: Vec<Value>,
    #[serde(default)]
    image_id: Option<i64>,
}

/// Parse an annotation document.
///
/// `cloud_name` is the file name of the loaded point cloud; it picks which
/// image's annotations are kept when the file lists several clouds.
pub fn import_annotations(
    document: &Value,
    current: &CategoryTable,
    cloud_name: Option<&str>,
) -> Result<AnnotationImport, EditorError> {
    let object = document.as_object().ok_or_else(|| {
        EditorError::MalformedInput("annotation document is not a JSON object".into())
    })?;
    let annotations = object
        .get("annotations")
        .and_then(Value::as_array)
        .ok_or_else(|| EditorError::MalformedInput("missing \"annotations\" array".into()))?;

    let provided: Vec<CategoryEntry> = lenient_list(object.get("categories"));
    let images: Vec<ImageEntry> = lenient_list(object.get("images"));
    let target_image = pick_image_id(&images, cloud_name);

    let categories = (!provided.is_empty()).then(|| CategoryTable::from_entries(&provided));
    let fallback = categories
        .as_ref()
        .unwrap_or(current)
        .default_name()
        .to_string();

    let mut shapes = Vec::new();
    let mut skipped = 0;
    for value in annotations {
        match parse_annotation(value, target_image) {
            Some((category_id, points)) => {
                let category = category_id
                    .and_then(|id| resolve_category_id(id, &provided))
                    .unwrap_or_else(|| fallback.clone());
                shapes.push(PolygonShape { category, points });
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} unusable annotations", skipped);
    }

    Ok(AnnotationImport {
        shapes,
        categories,
        skipped,
    })
}

/// Deserialize each array element on its own, dropping the ones that fail
fn lenient_list<T: for<'de> Deserialize<'de>>(value: Option<&Value>) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Image whose annotations should be imported: the `.pcd` entry matching the
/// loaded cloud by file name, else the first `.pcd` entry.
pub fn pick_image_id(images: &[ImageEntry], cloud_name: Option<&str>) -> Option<i64> {
    let mut clouds = images.iter().filter(|image| image.is_point_cloud()).peekable();
    let first = clouds.peek().map(|image| image.id)?;

    let matched = cloud_name.and_then(|name| {
        let name = basename(name);
        clouds
            .find(|image| basename(&image.file_name).eq_ignore_ascii_case(name))
            .map(|image| image.id)
    });
    Some(matched.unwrap_or(first))
}

fn parse_annotation(value: &Value, target_image: Option<i64>) -> Option<(Option<i64>, Vec<Vec3>)> {
    let annotation = IncomingAnnotation::deserialize(value).ok()?;

    if annotation.shape.as_deref() != Some(POLYGON_SHAPE) {
        return None;
    }
    if annotation
        .kind
        .as_deref()
        .is_some_and(|kind| kind != ANNOTATION_TYPE)
    {
        return None;
    }
    if let (Some(target), Some(image)) = (target_image, annotation.image_id)
        && image != target
    {
        return None;
    }

    let points: Vec<Vec3> = if annotation.location.is_empty() {
        annotation.points.iter().filter_map(array_point).collect()
    } else {
        annotation.location.iter().filter_map(object_point).collect()
    };
    if points.len() < MIN_CLOSED_POINTS {
        return None;
    }

    Some((annotation.category_id, points))
}

/// `{x, y, z}` with a missing or null `z` read as 0
fn object_point(value: &Value) -> Option<Vec3> {
    let coord = |key: &str| value.get(key).and_then(Value::as_f64);
    finite_point(coord("x")?, coord("y")?, coord("z").unwrap_or(0.0))
}

/// `[x, y, z]` with an optional `z`
fn array_point(value: &Value) -> Option<Vec3> {
    let items = value.as_array()?;
    let coord = |index: usize| items.get(index).and_then(Value::as_f64);
    finite_point(coord(0)?, coord(1)?, coord(2).unwrap_or(0.0))
}

fn finite_point(x: f64, y: f64, z: f64) -> Option<Vec3> {
    let point = Vec3::new(x as f32, y as f32, z as f32);
    point.is_finite().then_some(point)
}

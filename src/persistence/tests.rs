//! Unit tests for the persistence module.

use bevy::prelude::*;
use serde_json::{Value, json};

use super::annotation_format::{ImageEntry, export_annotations, import_annotations, pick_image_id};
use super::document::{Document, SnapshotDocument, parse_document};
use super::load::{AppliedDocument, apply_document};
use super::point_cloud::PointCloud;
use crate::config::EditorConfig;
use crate::editor::polygons::{
    CategoryEntry, CategoryTable, EditorError, PolygonEditor, PolygonShape,
};

fn p(x: f32, y: f32) -> Vec3 {
    Vec3::new(x, y, 0.0)
}

fn editor() -> PolygonEditor {
    PolygonEditor::new(&EditorConfig::default())
}

fn draw(editor: &mut PolygonEditor, points: &[Vec3]) {
    editor.start();
    for point in points {
        editor.append_point(*point).unwrap();
    }
    editor.finish();
}

fn square(offset: f32) -> Vec<Vec3> {
    vec![
        p(offset, 0.0),
        p(offset + 1.0, 0.0),
        p(offset + 1.0, 1.0),
        p(offset, 1.0),
    ]
}

fn polygon_annotation(category_id: i64, image_id: Option<i64>) -> Value {
    let mut value = json!({
        "type": "3D",
        "shape": "polygon",
        "category_id": category_id,
        "location": [
            {"x": 0.0, "y": 0.0, "z": 0.0},
            {"x": 2.0, "y": 0.0, "z": 0.0},
            {"x": 2.0, "y": 2.0, "z": 1.0}
        ]
    });
    if let Some(id) = image_id {
        value["image_id"] = json!(id);
    }
    value
}

// Export

#[test]
fn test_export_skips_open_polygons_and_numbers_from_one() {
    let mut editor = editor();
    draw(&mut editor, &square(0.0));
    draw(&mut editor, &square(5.0));

    // Open draft left in create mode
    editor.start();
    editor.append_point(p(20.0, 20.0)).unwrap();
    editor.append_point(p(21.0, 20.0)).unwrap();

    let document = export_annotations(editor.polygons(), editor.categories(), None);

    assert_eq!(document.annotations.len(), 2);
    assert_eq!(
        document.annotations.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(document.images.is_empty());
    assert_eq!(document.categories.len(), 4);

    let first = &document.annotations[0];
    assert_eq!(first.kind, "3D");
    assert_eq!(first.shape, "polygon");
    assert_eq!(first.category_id, 205340);
    assert_eq!(first.location.len(), 4);
    assert_eq!(first.image_id, None);
}

#[test]
fn test_export_json_field_names() {
    let mut editor = editor();
    draw(&mut editor, &square(0.0));

    let document = export_annotations(editor.polygons(), editor.categories(), None);
    let value = serde_json::to_value(&document).unwrap();

    assert!(value.get("images").is_none());
    assert_eq!(value["annotations"][0]["type"], "3D");
    assert_eq!(value["annotations"][0]["location"][1]["x"], 1.0);
    assert_eq!(value["categories"][0]["name"], "undrivable");
    assert!(value["categories"][0].get("color").is_none());
}

#[test]
fn test_export_unknown_category_uses_first_id() {
    let mut editor = editor();
    editor.replace_polygons(
        vec![PolygonShape {
            category: "mystery".into(),
            points: square(0.0),
        }],
        None,
    );

    let document = export_annotations(editor.polygons(), editor.categories(), None);
    assert_eq!(document.annotations[0].category_id, 205340);
}

#[test]
fn test_export_with_cloud_writes_image_entry() {
    let mut editor = editor();
    draw(&mut editor, &square(0.0));
    let cloud = PointCloud {
        name: "scan_04.pcd".into(),
        points: vec![p(0.0, 0.0), p(10.0, 10.0)],
    };

    let document = export_annotations(editor.polygons(), editor.categories(), Some(&cloud));

    assert_eq!(document.images.len(), 1);
    let image = &document.images[0];
    assert_eq!(image.id, 1);
    assert_eq!(image.file_name, "scan_04.pcd");
    assert_eq!(image.x_range, [-10.0, 20.0]);
    assert_eq!(image.width, 300);
    assert_eq!(document.annotations[0].image_id, Some(1));
}

// Import

#[test]
fn test_import_skips_unusable_annotations() {
    let document = json!({
        "annotations": [
            polygon_annotation(205341, None),
            {"type": "3D", "shape": "bbox", "category_id": 205341, "location": []},
            {"type": "2D", "shape": "polygon", "category_id": 205341,
             "location": [{"x": 0, "y": 0}, {"x": 1, "y": 0}, {"x": 1, "y": 1}]},
            {"type": "3D", "shape": "polygon", "category_id": 205341,
             "location": [{"x": 0, "y": 0}, {"x": 1, "y": 0}]},
            42,
            {"type": "3D", "shape": "polygon", "category_id": 205341,
             "location": [{"x": 0, "y": 0}, {"x": null, "y": 3}, {"x": 1, "y": 0}, {"x": 1, "y": 1, "z": null}]}
        ]
    });

    let import = import_annotations(&document, &CategoryTable::defaults(), None).unwrap();

    assert_eq!(import.shapes.len(), 2);
    assert_eq!(import.skipped, 4);
    assert!(import.categories.is_none());
    assert_eq!(import.shapes[0].category, "things");
    assert_eq!(import.shapes[0].points[2], Vec3::new(2.0, 2.0, 1.0));
    assert_eq!(
        import.shapes[1].points,
        vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]
    );
}

#[test]
fn test_import_accepts_missing_type_and_point_arrays() {
    let document = json!({
        "annotations": [
            {"shape": "polygon", "category_id": 205343, "points": [[0, 0], [1, 0, 2], [1, 1]]}
        ]
    });

    let import = import_annotations(&document, &CategoryTable::defaults(), None).unwrap();

    assert_eq!(import.skipped, 0);
    assert_eq!(import.shapes[0].category, "uneven");
    assert_eq!(
        import.shapes[0].points,
        vec![p(0.0, 0.0), Vec3::new(1.0, 0.0, 2.0), p(1.0, 1.0)]
    );
}

#[test]
fn test_import_category_fallback_chain() {
    let document = json!({
        "categories": [{"id": 1, "name": "car"}, {"id": 2, "name": "tree"}, "junk"],
        "annotations": [
            polygon_annotation(2, None),
            polygon_annotation(205342, None),
            polygon_annotation(999, None),
            {"shape": "polygon", "location": [{"x": 0, "y": 0}, {"x": 1, "y": 0}, {"x": 1, "y": 1}]}
        ]
    });

    let import = import_annotations(&document, &CategoryTable::defaults(), None).unwrap();

    let names: Vec<&str> = import.shapes.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(names, vec!["tree", "construction", "car", "car"]);

    let table = import.categories.unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.default_name(), "car");
}

#[test]
fn test_import_without_categories_falls_back_to_current_table() {
    let current = CategoryTable::from_entries(&[CategoryEntry {
        id: 7,
        name: "lane".into(),
        color: Some(0x00ff00),
    }]);
    let document = json!({"annotations": [polygon_annotation(999, None)]});

    let import = import_annotations(&document, &current, None).unwrap();
    assert_eq!(import.shapes[0].category, "lane");
}

#[test]
fn test_import_filters_by_matching_cloud_image() {
    let document = json!({
        "images": [
            {"id": 3, "file_name": "preview.png"},
            {"id": 7, "file_name": "a.pcd"},
            {"id": 9, "file_name": "dir/b.pcd"}
        ],
        "annotations": [
            polygon_annotation(205340, Some(7)),
            polygon_annotation(205340, Some(9)),
            polygon_annotation(205340, Some(3)),
            polygon_annotation(205340, None)
        ]
    });

    let matched = import_annotations(&document, &CategoryTable::defaults(), Some("B.PCD")).unwrap();
    assert_eq!(matched.shapes.len(), 2);
    assert_eq!(matched.skipped, 2);

    // No loaded cloud: the first point cloud image wins
    let first = import_annotations(&document, &CategoryTable::defaults(), None).unwrap();
    assert_eq!(first.shapes.len(), 2);
}

#[test]
fn test_pick_image_id_ignores_non_cloud_images() {
    let image = |id: i64, name: &str| ImageEntry {
        id,
        file_name: name.into(),
        x_range: [0.0, 0.0],
        y_range: [0.0, 0.0],
        width: 0,
        height: 0,
    };

    assert_eq!(pick_image_id(&[image(1, "a.png")], None), None);
    assert_eq!(
        pick_image_id(&[image(1, "a.png"), image(2, "x.pcd")], Some("missing.pcd")),
        Some(2)
    );
    assert_eq!(pick_image_id(&[], Some("x.pcd")), None);
}

#[test]
fn test_import_rejects_malformed_documents() {
    let table = CategoryTable::defaults();
    assert!(matches!(
        import_annotations(&json!([1, 2]), &table, None),
        Err(EditorError::MalformedInput(_))
    ));
    assert!(matches!(
        import_annotations(&json!({"images": []}), &table, None),
        Err(EditorError::MalformedInput(_))
    ));
}

// Documents

#[test]
fn test_parse_document_detects_format() {
    let snapshot = parse_document(r#"{"polygons": [], "mode": "IDLE"}"#).unwrap();
    assert!(matches!(snapshot, Document::Snapshot(_)));

    let annotations = parse_document(r#"{"annotations": []}"#).unwrap();
    assert!(matches!(annotations, Document::Annotations(_)));

    assert!(parse_document("[1, 2, 3]").is_err());
    assert!(parse_document("{ not json").is_err());
    assert!(parse_document(r#"{"polygons": [{"id": "x"}]}"#).is_err());
}

#[test]
fn test_snapshot_document_is_flat() {
    let mut editor = editor();
    draw(&mut editor, &square(0.0));

    let document = SnapshotDocument::new(editor.snapshot(), editor.categories());
    let value = serde_json::to_value(&document).unwrap();

    assert!(value["polygons"].is_array());
    assert!(value.get("selectedId").is_some());
    assert_eq!(value["mode"], "IDLE");
    assert_eq!(value["categories"].as_array().unwrap().len(), 4);

    let parsed = parse_document(&value.to_string()).unwrap();
    assert_eq!(parsed, Document::Snapshot(document));
}

#[test]
fn test_apply_snapshot_document_replaces_state() {
    let mut source = editor();
    draw(&mut source, &square(0.0));
    draw(&mut source, &square(3.0));
    let json = serde_json::to_string(&SnapshotDocument::new(
        source.snapshot(),
        source.categories(),
    ))
    .unwrap();

    let mut target = editor();
    draw(&mut target, &square(10.0));
    let before = target.snapshot();

    let applied = apply_document(&mut target, parse_document(&json).unwrap(), None).unwrap();
    assert_eq!(applied, AppliedDocument::Snapshot { polygons: 2 });
    assert_eq!(target.polygons()[1].points, square(3.0));

    // Opening is a single undo step
    assert!(target.undo());
    assert_eq!(target.snapshot().polygons, before.polygons);
}

#[test]
fn test_snapshot_document_keeps_custom_category_colors() {
    let config = EditorConfig {
        categories: vec![CategoryEntry {
            id: 3,
            name: "custom".into(),
            color: Some(0x123456),
        }],
        ..Default::default()
    };
    let mut source = PolygonEditor::new(&config);
    draw(&mut source, &square(0.0));
    let json = serde_json::to_string(&SnapshotDocument::new(
        source.snapshot(),
        source.categories(),
    ))
    .unwrap();

    let mut target = editor();
    apply_document(&mut target, parse_document(&json).unwrap(), None).unwrap();

    assert_eq!(target.categories().color_for("custom"), 0x123456);
    let polygon = &target.polygons()[0];
    assert_eq!(polygon.category, "custom");
    assert_eq!(target.color_of(polygon), 0x123456);
}

#[test]
fn test_export_then_import_through_editor() {
    let mut source = editor();
    draw(&mut source, &square(0.0));
    source.start();
    source.append_point(p(4.0, 4.0)).unwrap();
    source.append_point(p(6.0, 4.0)).unwrap();
    source.append_point(p(5.0, 6.0)).unwrap();
    source.cycle_category(1).unwrap();
    source.finish();

    let exported = export_annotations(source.polygons(), source.categories(), None);
    let json = serde_json::to_string(&exported).unwrap();

    let mut target = editor();
    let applied = apply_document(&mut target, parse_document(&json).unwrap(), None).unwrap();

    assert_eq!(
        applied,
        AppliedDocument::Annotations {
            imported: 2,
            skipped: 0
        }
    );
    assert!(target.polygons().iter().all(|p| p.closed));
    assert_eq!(target.polygons()[0].points, square(0.0));
    assert_eq!(target.polygons()[1].category, "things");
}

#[test]
fn test_malformed_annotations_leave_editor_untouched() {
    let mut editor = editor();
    draw(&mut editor, &square(0.0));
    let before = editor.snapshot();
    let undo_count = editor.history().undo_count();

    let result = apply_document(&mut editor, Document::Annotations(json!({"nope": 1})), None);

    assert!(matches!(result, Err(EditorError::MalformedInput(_))));
    assert_eq!(editor.snapshot(), before);
    assert_eq!(editor.history().undo_count(), undo_count);
}

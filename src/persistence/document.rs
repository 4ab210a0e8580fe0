//! Native document format and format detection for opened files.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::editor::history::EditorSnapshot;
use crate::editor::polygons::{CategoryEntry, CategoryTable, EditorError};

/// Saved editor state: the snapshot fields at the top level plus the category table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(flatten)]
    pub state: EditorSnapshot,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryEntry>,
}

impl SnapshotDocument {
    pub fn new(state: EditorSnapshot, categories: &CategoryTable) -> Self {
        Self {
            state,
            categories: categories.colored_entries(),
        }
    }

    /// Category table carried by the file, if any
    pub fn category_table(&self) -> Option<CategoryTable> {
        (!self.categories.is_empty()).then(|| CategoryTable::from_entries(&self.categories))
    }
}

/// An opened file, classified by shape
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Snapshot(SnapshotDocument),
    /// Annotation format; interpreted against the editor's categories when applied
    Annotations(Value),
}

/// Parse and classify a document. An object with a `polygons` array is a
/// snapshot; any other object is treated as the annotation format.
pub fn parse_document(json: &str) -> Result<Document, EditorError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| EditorError::MalformedInput(format!("invalid JSON: {}", e)))?;

    let Some(object) = value.as_object() else {
        return Err(EditorError::MalformedInput(
            "top level is not a JSON object".into(),
        ));
    };

    if object.get("polygons").is_some_and(Value::is_array) {
        let document = serde_json::from_value(value)
            .map_err(|e| EditorError::MalformedInput(format!("invalid snapshot: {}", e)))?;
        return Ok(Document::Snapshot(document));
    }

    Ok(Document::Annotations(value))
}

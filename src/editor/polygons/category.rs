//! Category table: the id/name/color triples a polygon can be labeled with.

use serde::{Deserialize, Serialize};

/// Built-in categories, used when no table is configured and as the
/// fallback for id and color resolution.
pub const DEFAULT_CATEGORIES: [(i64, &str, u32); 4] = [
    (205340, "undrivable", 0xff0000),
    (205341, "things", 0xffff00),
    (205342, "construction", 0x800080),
    (205343, "uneven", 0xffffff),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// 0xRRGGBB
    pub color: u32,
}

/// `{id, name}` pair as it appears in annotation files and the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

/// Ordered, never-empty list of categories.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::defaults()
    }
}

impl CategoryTable {
    pub fn defaults() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(id, name, color)| Category {
                    id: *id,
                    name: (*name).to_string(),
                    color: *color,
                })
                .collect(),
        }
    }

    /// Build a table from external entries. Colors come from the entry itself,
    /// then a default category with the same name, then one with the same id.
    /// An empty list yields the built-in defaults.
    pub fn from_entries(entries: &[CategoryEntry]) -> Self {
        if entries.is_empty() {
            return Self::defaults();
        }

        let categories = entries
            .iter()
            .map(|entry| Category {
                id: entry.id,
                name: entry.name.clone(),
                color: entry
                    .color
                    .unwrap_or_else(|| default_color_for(&entry.name, entry.id)),
            })
            .collect();

        Self { categories }
    }

    /// `{id, name}` entries, as written to annotation exports.
    pub fn entries(&self) -> Vec<CategoryEntry> {
        self.categories
            .iter()
            .map(|c| CategoryEntry {
                id: c.id,
                name: c.name.clone(),
                color: None,
            })
            .collect()
    }

    /// Entries carrying their resolved colors, so `from_entries` rebuilds the same table.
    pub fn colored_entries(&self) -> Vec<CategoryEntry> {
        self.categories
            .iter()
            .map(|c| CategoryEntry {
                id: c.id,
                name: c.name.clone(),
                color: Some(c.color),
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn first(&self) -> &Category {
        &self.categories[0]
    }

    pub fn default_name(&self) -> &str {
        &self.first().name
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn id_for_name(&self, name: &str) -> Option<i64> {
        self.get(name).map(|c| c.id)
    }

    pub fn name_for_id(&self, id: i64) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    /// Color for a category name, falling back to the first default color.
    pub fn color_for(&self, name: &str) -> u32 {
        self.get(name)
            .map(|c| c.color)
            .unwrap_or(DEFAULT_CATEGORIES[0].2)
    }

    /// Name of the first category with the given color.
    pub fn name_for_color(&self, color: u32) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.color == color)
            .map(|c| c.name.as_str())
    }

    /// Step `direction` entries from `current`, wrapping at both ends.
    /// An unknown `current` lands on the first category.
    pub fn cycle(&self, current: &str, direction: i32) -> &str {
        let len = self.categories.len() as i64;
        let next = match self.position(current) {
            Some(index) => (index as i64 + direction as i64).rem_euclid(len) as usize,
            None => 0,
        };
        &self.categories[next].name
    }
}

fn default_color_for(name: &str, id: i64) -> u32 {
    DEFAULT_CATEGORIES
        .iter()
        .find(|(_, default_name, _)| *default_name == name)
        .or_else(|| DEFAULT_CATEGORIES.iter().find(|(default_id, _, _)| *default_id == id))
        .map(|(_, _, color)| *color)
        .unwrap_or(DEFAULT_CATEGORIES[0].2)
}

/// Resolve an annotation's category id to a name: provided table first, then
/// the built-in defaults.
pub fn resolve_category_id(id: i64, provided: &[CategoryEntry]) -> Option<String> {
    provided
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.clone())
        .or_else(|| {
            DEFAULT_CATEGORIES
                .iter()
                .find(|(default_id, _, _)| *default_id == id)
                .map(|(_, name, _)| (*name).to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab_table() -> CategoryTable {
        CategoryTable::from_entries(&[
            CategoryEntry { id: 1, name: "a".into(), color: None },
            CategoryEntry { id: 2, name: "b".into(), color: None },
        ])
    }

    #[test]
    fn test_defaults_are_never_empty() {
        let table = CategoryTable::from_entries(&[]);
        assert_eq!(table.len(), 4);
        assert_eq!(table.default_name(), "undrivable");
    }

    #[test]
    fn test_name_id_round_trip() {
        let table = CategoryTable::defaults();
        for category in table.iter() {
            let id = table.id_for_name(&category.name).unwrap();
            assert_eq!(table.name_for_id(id), Some(category.name.as_str()));
        }
    }

    #[test]
    fn test_cycle_wraps_forward_and_back() {
        let table = ab_table();
        assert_eq!(table.cycle("a", 1), "b");
        assert_eq!(table.cycle("b", 1), "a");
        assert_eq!(table.cycle("a", -1), "b");
    }

    #[test]
    fn test_cycle_unknown_lands_on_first() {
        let table = ab_table();
        assert_eq!(table.cycle("missing", 1), "a");
    }

    #[test]
    fn test_colors_by_name_then_id() {
        let table = CategoryTable::from_entries(&[
            CategoryEntry { id: 1, name: "things".into(), color: None },
            CategoryEntry { id: 205342, name: "renamed".into(), color: None },
            CategoryEntry { id: 3, name: "custom".into(), color: Some(0x123456) },
        ]);
        assert_eq!(table.color_for("things"), 0xffff00);
        assert_eq!(table.color_for("renamed"), 0x800080);
        assert_eq!(table.color_for("custom"), 0x123456);
        assert_eq!(table.color_for("unknown"), 0xff0000);
    }

    #[test]
    fn test_colored_entries_rebuild_the_same_table() {
        let table = CategoryTable::from_entries(&[
            CategoryEntry { id: 3, name: "custom".into(), color: Some(0x123456) },
            CategoryEntry { id: 205341, name: "things".into(), color: None },
        ]);
        assert_eq!(CategoryTable::from_entries(&table.colored_entries()), table);
        assert!(table.entries().iter().all(|entry| entry.color.is_none()));
    }

    #[test]
    fn test_resolve_category_id_fallbacks() {
        let provided = vec![CategoryEntry { id: 9, name: "nine".into(), color: None }];
        assert_eq!(resolve_category_id(9, &provided).as_deref(), Some("nine"));
        assert_eq!(resolve_category_id(205343, &provided).as_deref(), Some("uneven"));
        assert_eq!(resolve_category_id(42, &provided), None);
    }
}

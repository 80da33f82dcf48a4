// src/inventory.rs
use crate::errors::InventoryError;
use crate::models::{ClothingColors, ClothingItem, ColorAnalysisResult};
use chrono::Utc;
use uuid::Uuid;

pub const CATEGORIES: [&str; 5] = ["hat", "shirt", "t-shirt", "pants", "shoes"];

impl From<&ColorAnalysisResult> for ClothingColors {
    fn from(result: &ColorAnalysisResult) -> Self {
        Self {
            primary: result.primary.clone(),
            secondary: result.secondary.clone(),
            tertiary: result.tertiary.clone(),
            quaternary: result.quaternary.clone(),
        }
    }
}

impl ClothingItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        image_uri: Option<String>,
        colors: ClothingColors,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            category: category.into(),
            image_uri,
            colors,
            date_added: Utc::now(),
        }
    }

    /// Builds a catalog entry from an analysis outcome. Nothing in the
    /// analysis flow calls this on its own; saving is a separate user step.
    pub fn from_analysis(
        name: impl Into<String>,
        category: impl Into<String>,
        image_uri: Option<String>,
        result: &ColorAnalysisResult,
    ) -> Self {
        Self::new(name, category, image_uri, ClothingColors::from(result))
    }
}

/// In-memory closet. Nothing is persisted.
#[derive(Debug, Default)]
pub struct ClothingStore {
    items: Vec<ClothingItem>,
}

impl ClothingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> &'static [&'static str] {
        &CATEGORIES
    }

    pub fn items(&self) -> &[ClothingItem] {
        &self.items
    }

    pub fn add(&mut self, item: ClothingItem) -> Result<(), InventoryError> {
        if item.name.trim().is_empty() {
            return Err(InventoryError::MissingName);
        }
        if !CATEGORIES.contains(&item.category.as_str()) {
            return Err(InventoryError::UnknownCategory(item.category));
        }
        self.items.push(item);
        Ok(())
    }

    /// Returns whether an item with `id` was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a ClothingItem> {
        self.items.iter().filter(move |item| item.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn analysis() -> ColorAnalysisResult {
        ColorAnalysisResult {
            primary: "#112233".to_string(),
            secondary: Some("#445566".to_string()),
            tertiary: None,
            quaternary: None,
            percentages: BTreeMap::from([("#112233".to_string(), 90.0)]),
            description: Some("navy shirt".to_string()),
        }
    }

    #[test]
    fn analysis_colors_carry_over() {
        let item = ClothingItem::from_analysis("Oxford", "shirt", None, &analysis());
        assert_eq!(item.colors.primary, "#112233");
        assert_eq!(item.colors.secondary.as_deref(), Some("#445566"));
        assert_eq!(item.colors.tertiary, None);
    }

    #[test]
    fn item_serializes_camel_case() {
        let item = ClothingItem::from_analysis("Cap", "hat", Some("file:///cap.jpg".into()), &analysis());
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["imageUri"], "file:///cap.jpg");
        assert!(value.get("dateAdded").is_some());
        assert!(value["colors"].get("tertiary").is_none());
    }

    #[test]
    fn add_filter_delete() {
        let mut store = ClothingStore::new();
        let shirt = ClothingItem::from_analysis("Oxford", "shirt", None, &analysis());
        let shirt_id = shirt.id.clone();
        store.add(shirt).unwrap();
        store
            .add(ClothingItem::from_analysis("Boots", "shoes", None, &analysis()))
            .unwrap();

        assert_eq!(store.by_category("shirt").count(), 1);
        assert_eq!(store.by_category("pants").count(), 0);
        assert!(store.delete(&shirt_id));
        assert!(!store.delete(&shirt_id));
        assert_eq!(store.items().len(), 1);

        store.clear();
        assert!(store.items().is_empty());
    }

    #[test]
    fn add_rejects_nameless_and_unknown_category() {
        let mut store = ClothingStore::new();
        assert_eq!(
            store.add(ClothingItem::from_analysis(" ", "shirt", None, &analysis())),
            Err(InventoryError::MissingName)
        );
        assert_eq!(
            store.add(ClothingItem::from_analysis("Scarf", "scarf", None, &analysis())),
            Err(InventoryError::UnknownCategory("scarf".to_string()))
        );
    }
}

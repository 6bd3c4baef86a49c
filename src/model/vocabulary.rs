//! Speakable items, categories and the seed vocabulary shipped for first run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::settings::AppSettings;

// ---------------------------------------------------------------------------
// VocabularyError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VocabularyError {
    #[error("item text must not be empty")]
    EmptyText,

    #[error("item id must not be empty")]
    EmptyId,

    #[error("no item with id {0:?}")]
    UnknownItem(String),
}

// ---------------------------------------------------------------------------
// VocabularyItem
// ---------------------------------------------------------------------------

/// Relative button size in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Small,
    Medium,
    Large,
}

/// A speakable button.
///
/// `text` is never empty.  `message` and `two_word` are overlays that are
/// spoken in sentence and two-word mode respectively; when absent or empty
/// the label is spoken instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ButtonSize>,
}

impl VocabularyItem {
    /// Create an item with only a label.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Result<Self, VocabularyError> {
        let item = Self {
            id: id.into(),
            text: text.into(),
            message: None,
            two_word: None,
            category: None,
            is_favorite: false,
            image: None,
            color: None,
            size: None,
        };
        item.validate()?;
        Ok(item)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_two_word(mut self, two_word: impl Into<String>) -> Self {
        self.two_word = Some(two_word.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Check the item invariants (non-empty id and label).
    pub fn validate(&self) -> Result<(), VocabularyError> {
        if self.id.trim().is_empty() {
            return Err(VocabularyError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(VocabularyError::EmptyText);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Category {
    fn seed(id: &str, name: &str, color: &str, icon: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            icon: Some(icon.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Categories available on first run.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::seed("greetings", "Greetings", "#FF6B9D", "hand-left"),
        Category::seed("food", "Food & Drink", "#FFB347", "restaurant"),
        Category::seed("needs", "Basic Needs", "#5DADE2", "medical"),
        Category::seed("feelings", "Feelings", "#F4D03F", "happy"),
        Category::seed("activities", "Activities", "#58D68D", "play"),
    ]
}

/// Items available on first run.
pub fn default_vocabulary() -> Vec<VocabularyItem> {
    // (id, text, two-word, message, category, colour)
    const SEED: &[(&str, &str, &str, &str, &str, &str)] = &[
        ("hello", "Hello", "Hello there", "Hello, how are you?", "greetings", "#FF6B9D"),
        ("goodbye", "Goodbye", "Bye bye", "Goodbye, see you later.", "greetings", "#FF6B9D"),
        ("thank-you", "Thank you", "Thank you", "Thank you very much.", "greetings", "#FF6B9D"),
        ("water", "Water", "Want water", "I want water.", "food", "#FFB347"),
        ("hungry", "Hungry", "Am hungry", "I am hungry.", "food", "#FFB347"),
        ("bathroom", "Bathroom", "Need bathroom", "I need to go to the bathroom.", "needs", "#5DADE2"),
        ("help", "Help", "Help me", "Can you help me, please?", "needs", "#5DADE2"),
        ("happy", "Happy", "Feel happy", "I feel happy.", "feelings", "#F4D03F"),
        ("sad", "Sad", "Feel sad", "I feel sad.", "feelings", "#F4D03F"),
        ("play", "Play", "Let's play", "I want to play.", "activities", "#58D68D"),
        ("more", "More", "More please", "I want more, please.", "activities", "#58D68D"),
        ("all-done", "All done", "All done", "I am all done.", "activities", "#58D68D"),
    ];

    SEED.iter()
        .map(|&(id, text, two_word, message, category, color)| VocabularyItem {
            id: id.into(),
            text: text.into(),
            message: Some(message.into()),
            two_word: Some(two_word.into()),
            category: Some(category.into()),
            is_favorite: false,
            image: None,
            color: Some(color.into()),
            size: None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Collection helpers
// ---------------------------------------------------------------------------

/// Flip the favourite flag of the item with `id`; returns the new value.
pub fn toggle_favorite(items: &mut [VocabularyItem], id: &str) -> Result<bool, VocabularyError> {
    let item = items
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(|| VocabularyError::UnknownItem(id.to_string()))?;
    item.is_favorite = !item.is_favorite;
    Ok(item.is_favorite)
}

/// Insert `item`, replacing any existing item with the same id.
pub fn upsert_item(items: &mut Vec<VocabularyItem>, item: VocabularyItem) -> Result<(), VocabularyError> {
    item.validate()?;
    match items.iter_mut().find(|i| i.id == item.id) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
    Ok(())
}

/// Remove the item with `id`, returning it.
pub fn remove_item(items: &mut Vec<VocabularyItem>, id: &str) -> Result<VocabularyItem, VocabularyError> {
    let pos = items
        .iter()
        .position(|i| i.id == id)
        .ok_or_else(|| VocabularyError::UnknownItem(id.to_string()))?;
    Ok(items.remove(pos))
}

/// Items currently marked as favourite.
pub fn favorites(items: &[VocabularyItem]) -> Vec<VocabularyItem> {
    items.iter().filter(|i| i.is_favorite).cloned().collect()
}

/// Items whose category is not hidden by `settings`.
pub fn visible_items<'a>(items: &'a [VocabularyItem], settings: &AppSettings) -> Vec<&'a VocabularyItem> {
    items
        .iter()
        .filter(|i| settings.is_category_visible(i.category.as_deref()))
        .collect()
}

/// Find an item by id, or failing that by case-insensitive label.
pub fn find_item<'a>(items: &'a [VocabularyItem], query: &str) -> Option<&'a VocabularyItem> {
    let query = query.trim();
    items
        .iter()
        .find(|i| i.id == query)
        .or_else(|| items.iter().find(|i| i.text.eq_ignore_ascii_case(query)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_categories_filter_items() {
        let items = default_vocabulary();
        let mut settings = AppSettings::default();
        settings.hidden_categories.insert("food".into());

        let visible = visible_items(&items, &settings);
        assert!(visible.len() < items.len());
        assert!(visible.iter().all(|i| i.category.as_deref() != Some("food")));
        assert!(visible.iter().any(|i| i.id == "hello"));
    }

    #[test]
    fn new_rejects_empty_text() {
        assert_eq!(VocabularyItem::new("x", "  ").unwrap_err(), VocabularyError::EmptyText);
        assert_eq!(VocabularyItem::new("", "Water").unwrap_err(), VocabularyError::EmptyId);
    }

    #[test]
    fn seed_vocabulary_is_valid_and_unique() {
        let items = default_vocabulary();
        assert!(!items.is_empty());
        for item in &items {
            item.validate().expect("seed item must be valid");
        }
        let mut ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), items.len());
    }

    #[test]
    fn seed_items_reference_seed_categories() {
        let categories = default_categories();
        for item in default_vocabulary() {
            let cat = item.category.expect("seed items are categorised");
            assert!(categories.iter().any(|c| c.id == cat), "missing category {cat}");
        }
    }

    #[test]
    fn toggle_favorite_flips_flag() {
        let mut items = default_vocabulary();
        assert!(toggle_favorite(&mut items, "water").unwrap());
        assert_eq!(favorites(&items).len(), 1);
        assert!(!toggle_favorite(&mut items, "water").unwrap());
        assert!(favorites(&items).is_empty());
    }

    #[test]
    fn toggle_unknown_item_errors() {
        let mut items = default_vocabulary();
        assert!(matches!(
            toggle_favorite(&mut items, "nope"),
            Err(VocabularyError::UnknownItem(_))
        ));
    }

    #[test]
    fn upsert_replaces_existing_item() {
        let mut items = default_vocabulary();
        let before = items.len();
        let edited = VocabularyItem::new("water", "Juice").unwrap();
        upsert_item(&mut items, edited).unwrap();
        assert_eq!(items.len(), before);
        assert_eq!(find_item(&items, "water").unwrap().text, "Juice");
    }

    #[test]
    fn remove_item_returns_removed() {
        let mut items = default_vocabulary();
        let removed = remove_item(&mut items, "sad").unwrap();
        assert_eq!(removed.text, "Sad");
        assert!(find_item(&items, "sad").is_none());
    }

    #[test]
    fn find_item_by_label_is_case_insensitive() {
        let items = default_vocabulary();
        assert_eq!(find_item(&items, "WATER").unwrap().id, "water");
        assert_eq!(find_item(&items, "all-done").unwrap().text, "All done");
    }

    #[test]
    fn two_word_is_persisted_as_camel_case() {
        let item = VocabularyItem::new("water", "Water").unwrap().with_two_word("Want water");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["twoWord"], "Want water");
        assert_eq!(json["isFavorite"], false);
        assert!(json.get("message").is_none());
    }
}

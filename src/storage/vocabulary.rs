//! Vocabulary, favourites and category persistence.
//!
//! | Key                    | Value                  | Default on miss     |
//! |------------------------|------------------------|---------------------|
//! | `echo_kids_vocabulary` | `Vec<VocabularyItem>`  | seed vocabulary     |
//! | `echo_kids_favorites`  | `Vec<VocabularyItem>`  | empty               |
//! | `echo_kids_categories` | `Vec<Category>`        | seed categories     |

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{default_categories, default_vocabulary, Category, VocabularyItem};

use super::{KeyValueStore, KEY_CATEGORIES, KEY_FAVORITES, KEY_VOCABULARY};

#[derive(Clone)]
pub struct VocabularyStore {
    kv: Arc<dyn KeyValueStore>,
}

impl VocabularyStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    // -----------------------------------------------------------------------
    // Vocabulary
    // -----------------------------------------------------------------------

    /// Load the item list.  Items violating the non-empty label invariant
    /// are dropped.
    pub async fn load(&self) -> Vec<VocabularyItem> {
        let items = self.load_or(KEY_VOCABULARY, default_vocabulary).await;
        retain_valid(items)
    }

    pub async fn save(&self, items: &[VocabularyItem]) {
        self.save_value(KEY_VOCABULARY, items).await;
    }

    // -----------------------------------------------------------------------
    // Favourites
    // -----------------------------------------------------------------------

    pub async fn load_favorites(&self) -> Vec<VocabularyItem> {
        let items = self.load_or(KEY_FAVORITES, Vec::new).await;
        retain_valid(items)
    }

    pub async fn save_favorites(&self, favorites: &[VocabularyItem]) {
        self.save_value(KEY_FAVORITES, favorites).await;
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub async fn load_categories(&self) -> Vec<Category> {
        self.load_or(KEY_CATEGORIES, default_categories).await
    }

    pub async fn save_categories(&self, categories: &[Category]) {
        self.save_value(KEY_CATEGORIES, categories).await;
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn load_or<T, F>(&self, key: &str, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.kv.get_item(key).await {
            Ok(Some(data)) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("storage: {key} is corrupted ({e}), using defaults");
                default()
            }),
            Ok(None) => default(),
            Err(e) => {
                log::error!("storage: error loading {key}: {e}");
                default()
            }
        }
    }

    async fn save_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                log::error!("storage: could not encode {key}: {e}");
                return;
            }
        };
        if let Err(e) = self.kv.set_item(key, &data).await {
            log::error!("storage: error saving {key}: {e}");
        }
    }
}

/// Drop items with an empty label, and every item after the first with a
/// given id.
fn retain_valid(mut items: Vec<VocabularyItem>) -> Vec<VocabularyItem> {
    let mut seen = HashSet::new();
    items.retain(|item| {
        if let Err(e) = item.validate() {
            log::warn!("storage: dropping item {:?}: {e}", item.id);
            return false;
        }
        if !seen.insert(item.id.clone()) {
            log::warn!("storage: dropping duplicate item id {:?} ({:?})", item.id, item.text);
            return false;
        }
        true
    });
    items
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::toggle_favorite;
    use crate::storage::memory::FailingStore;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::tempdir;

    fn memory() -> (VocabularyStore, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        (VocabularyStore::new(kv.clone()), kv)
    }

    #[tokio::test]
    async fn duplicate_ids_keep_first_item() {
        let (store, kv) = memory();
        kv.set_item(
            KEY_VOCABULARY,
            r#"[{"id":"a","text":"Apple"},{"id":"b","text":"Ball"},{"id":"a","text":"Avocado"}]"#,
        )
        .await
        .unwrap();

        let items = store.load().await;
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(items[0].text, "Apple");
    }

    #[tokio::test]
    async fn first_run_loads_seed_vocabulary() {
        let (store, _kv) = memory();
        assert_eq!(store.load().await, default_vocabulary());
        assert_eq!(store.load_categories().await, default_categories());
        assert!(store.load_favorites().await.is_empty());
    }

    #[tokio::test]
    async fn corrupted_vocabulary_loads_seed() {
        let (store, kv) = memory();
        kv.set_item(KEY_VOCABULARY, "{{{").await.unwrap();
        assert_eq!(store.load().await, default_vocabulary());
    }

    #[tokio::test]
    async fn read_failure_loads_seed() {
        let store = VocabularyStore::new(Arc::new(FailingStore));
        assert_eq!(store.load().await, default_vocabulary());
        assert!(store.load_favorites().await.is_empty());
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let store = VocabularyStore::new(Arc::new(FailingStore));
        store.save(&default_vocabulary()).await;
        store.save_favorites(&[]).await;
        store.save_categories(&default_categories()).await;
    }

    #[tokio::test]
    async fn empty_label_items_are_dropped_on_load() {
        let (store, kv) = memory();
        let json = r#"[
            {"id":"a","text":"Apple","isFavorite":false},
            {"id":"b","text":"","isFavorite":false}
        ]"#;
        kv.set_item(KEY_VOCABULARY, json).await.unwrap();

        let items = store.load().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
    }

    #[tokio::test]
    async fn favourite_toggle_survives_reload() {
        let dir = tempdir().expect("temp dir");
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
        let store = VocabularyStore::new(kv.clone());

        let mut items = store.load().await;
        toggle_favorite(&mut items, "hello").unwrap();
        store.save(&items).await;

        let reloaded = VocabularyStore::new(kv).load().await;
        let hello = reloaded.iter().find(|i| i.id == "hello").unwrap();
        assert!(hello.is_favorite);
    }

    #[tokio::test]
    async fn categories_round_trip() {
        let (store, _kv) = memory();
        let cats = vec![Category {
            id: "toys".into(),
            name: "Toys".into(),
            color: "#123456".into(),
            icon: None,
        }];
        store.save_categories(&cats).await;
        assert_eq!(store.load_categories().await, cats);
    }
}

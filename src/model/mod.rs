//! Plain data shared by the stores, the press handler and the front end.
//!
//! * [`AppSettings`] / [`ButtonMode`]: persisted user settings.
//! * [`VocabularyItem`] / [`Category`]: speakable buttons and their groups.

pub mod settings;
pub mod vocabulary;

pub use settings::{AppSettings, ButtonMode, TextSize, Theme};
pub use vocabulary::{
    default_categories, default_vocabulary, favorites, find_item, remove_item, toggle_favorite,
    upsert_item, visible_items, ButtonSize, Category, VocabularyError, VocabularyItem,
};

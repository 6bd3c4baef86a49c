//! Settings persistence under [`KEY_SETTINGS`].

use std::sync::Arc;

use crate::model::AppSettings;

use super::{KeyValueStore, KEY_SETTINGS};

/// Loads and saves [`AppSettings`] as JSON.
///
/// `load` never fails: a missing, unreadable or undecodable value yields
/// `AppSettings::default()`.  `save` logs failures and returns normally.
#[derive(Clone)]
pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn load(&self) -> AppSettings {
        let data = match self.kv.get_item(KEY_SETTINGS).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                log::debug!("settings: nothing stored yet, using defaults");
                return AppSettings::default();
            }
            Err(e) => {
                log::error!("settings: error loading settings: {e}");
                return AppSettings::default();
            }
        };

        match serde_json::from_str::<AppSettings>(&data) {
            Ok(settings) => {
                log::debug!("settings: loaded {settings:?}");
                settings
            }
            Err(e) => {
                log::warn!("settings: stored value is corrupted ({e}), using defaults");
                AppSettings::default()
            }
        }
    }

    pub async fn save(&self, settings: &AppSettings) {
        let data = match serde_json::to_string(settings) {
            Ok(data) => data,
            Err(e) => {
                log::error!("settings: could not encode settings: {e}");
                return;
            }
        };
        match self.kv.set_item(KEY_SETTINGS, &data).await {
            Ok(()) => log::debug!("settings: saved"),
            Err(e) => log::error!("settings: error saving settings: {e}"),
        }
    }

    /// Apply `change` to the stored settings and persist the result
    /// immediately.  Returns the updated settings.
    pub async fn update<F>(&self, change: F) -> AppSettings
    where
        F: FnOnce(&mut AppSettings),
    {
        let mut settings = self.load().await;
        change(&mut settings);
        self.save(&settings).await;
        settings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Host process configuration.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.
//!
//! User-facing preferences (button mode, volume, voice) are not here; they
//! live in [`crate::model::AppSettings`] and are persisted by the storage
//! layer.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, HapticsConfig, PressConfig, SpeechBackend, SpeechConfig, StorageConfig, ToneConfig,
};

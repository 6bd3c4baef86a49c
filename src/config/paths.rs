//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (`config.toml`):
//!   Windows: %APPDATA%\echo-kids\
//!   macOS:   ~/Library/Application Support/echo-kids/
//!   Linux:   ~/.config/echo-kids/
//!
//! Data dir (settings, vocabulary, favourites, categories):
//!   Windows: %LOCALAPPDATA%\echo-kids\
//!   macOS:   ~/Library/Application Support/echo-kids/
//!   Linux:   ~/.local/share/echo-kids/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    /// Full path to `config.toml`.
    pub config_file: PathBuf,
    /// Directory holding one JSON file per storage key.
    pub data_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "echo-kids";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let config_file = config_dir.join("config.toml");

        Self {
            config_dir,
            config_file,
            data_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

//! Host configuration structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Every section is
//! `#[serde(default)]`: a file that names only a few keys is valid.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::platform::{SoundSource, VibrationPattern};

// ---------------------------------------------------------------------------
// SpeechBackend
// ---------------------------------------------------------------------------

/// Selects which command-line engine speaks utterances.
///
/// | Variant   | Engine                                          |
/// |-----------|-------------------------------------------------|
/// | Auto      | `say` on macOS, `espeak-ng` everywhere else     |
/// | Say       | macOS `say`                                     |
/// | EspeakNg  | `espeak-ng`                                     |
/// | Disabled  | No engine; feedback starts at the tone stage    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeechBackend {
    #[default]
    Auto,
    Say,
    EspeakNg,
    Disabled,
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub backend: SpeechBackend,
    /// Language used when the configured voice does not name one.
    pub default_language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            backend: SpeechBackend::default(),
            default_language: crate::voice::DEFAULT_LANGUAGE.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ToneConfig
// ---------------------------------------------------------------------------

/// The fallback tone played when speech is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    pub frequency_hz: f32,
    pub duration_ms: u64,
    /// Multiplied with the user's volume setting.
    pub volume: f32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 880.0,
            duration_ms: 300,
            volume: 1.0,
        }
    }
}

impl ToneConfig {
    pub fn source(&self) -> SoundSource {
        SoundSource::Tone {
            frequency_hz: self.frequency_hz,
            duration_ms: self.duration_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// HapticsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticsConfig {
    pub enabled: bool,
    /// Fired on every press, in milliseconds.
    pub press_pattern: Vec<u64>,
    /// Fired when no audio could be produced.
    pub fallback_pattern: Vec<u64>,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            press_pattern: VibrationPattern::press().0,
            fallback_pattern: VibrationPattern::fallback().0,
        }
    }
}

impl HapticsConfig {
    pub fn press(&self) -> VibrationPattern {
        VibrationPattern(self.press_pattern.clone())
    }

    pub fn fallback(&self) -> VibrationPattern {
        VibrationPattern(self.fallback_pattern.clone())
    }
}

// ---------------------------------------------------------------------------
// PressConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PressConfig {
    /// How long a pressed button stays highlighted.
    pub highlight_ms: u64,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self { highlight_ms: 200 }
    }
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides [`AppPaths::data_dir`] when set.
    pub data_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level host configuration, serialised as `config.toml`.
///
/// ```rust,no_run
/// use echo_kids::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub speech: SpeechConfig,
    pub tone: ToneConfig,
    pub haptics: HapticsConfig,
    pub press: PressConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `config.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().config_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `config.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().config_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory the file store writes to.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| AppPaths::new().data_dir)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

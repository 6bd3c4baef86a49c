//! Persisted user settings.
//!
//! [`AppSettings`] is what the parent/carer edits on the settings surface.  It
//! is stored as camelCase JSON under the `echo_kids_settings` key so every
//! field is tolerant of being absent: missing fields take their default.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ButtonMode
// ---------------------------------------------------------------------------

/// Selects which of an item's utterances is spoken per press.
///
/// | Variant    | Spoken field              |
/// |------------|---------------------------|
/// | `OneWord`  | `text`                    |
/// | `TwoWord`  | `twoWord`, else `text`    |
/// | `Sentence` | `message`, else `text`    |
///
/// Persisted as `"one-word"`, `"two-word"` or `"sentence"`.  Any other
/// persisted value deserialises as [`ButtonMode::OneWord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ButtonMode {
    OneWord,
    TwoWord,
    Sentence,
}

impl ButtonMode {
    pub const ALL: [ButtonMode; 3] = [ButtonMode::OneWord, ButtonMode::TwoWord, ButtonMode::Sentence];

    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonMode::OneWord => "one-word",
            ButtonMode::TwoWord => "two-word",
            ButtonMode::Sentence => "sentence",
        }
    }

    /// Lenient parse used for persisted data: unknown values become
    /// `OneWord`, which always speaks the item label.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            log::warn!("settings: unrecognised button mode {value:?}, using one-word");
            ButtonMode::OneWord
        })
    }
}

impl Default for ButtonMode {
    fn default() -> Self {
        ButtonMode::Sentence
    }
}

impl fmt::Display for ButtonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "one-word" => Ok(ButtonMode::OneWord),
            "two-word" => Ok(ButtonMode::TwoWord),
            "sentence" => Ok(ButtonMode::Sentence),
            other => Err(format!("unknown button mode: {other}")),
        }
    }
}

impl From<String> for ButtonMode {
    fn from(value: String) -> Self {
        ButtonMode::parse_lenient(&value)
    }
}

impl From<ButtonMode> for String {
    fn from(mode: ButtonMode) -> Self {
        mode.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Display enums
// ---------------------------------------------------------------------------

/// Colour scheme of the button grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Default,
    Colorful,
    Minimal,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Colorful
    }
}

/// Label size used by the grid and by item buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Small,
    Medium,
    Large,
}

impl Default for TextSize {
    fn default() -> Self {
        TextSize::Medium
    }
}

// ---------------------------------------------------------------------------
// AppSettings
// ---------------------------------------------------------------------------

/// Default voice selector: a bare language tag, so the platform picks its
/// own default voice for that language.
pub const DEFAULT_TTS_VOICE: &str = "en-US";
pub const DEFAULT_VOLUME: f32 = 1.0;
pub const DEFAULT_SPEECH_RATE: f32 = 0.8;
pub const DEFAULT_GRID_SIZE: u8 = 3;

/// User-facing configuration, loaded at the start of each screen and saved
/// on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Which utterance is spoken per press.
    pub button_mode: ButtonMode,
    /// Playback volume in `[0.0, 1.0]`.
    pub volume: f32,
    /// Speech rate multiplier; `1.0` is the engine's normal rate.
    pub speech_rate: f32,
    /// Platform voice identifier or bare language tag (e.g. `"en-US"`).
    pub tts_voice: String,
    /// Category ids excluded from display.  Has no effect on audio.
    pub hidden_categories: BTreeSet<String>,
    /// Number of buttons per grid row (1–5).
    pub grid_size: u8,
    pub show_text: bool,
    pub theme: Theme,
    pub enable_child_filter: bool,
    pub text_size: TextSize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            button_mode: ButtonMode::default(),
            volume: DEFAULT_VOLUME,
            speech_rate: DEFAULT_SPEECH_RATE,
            tts_voice: DEFAULT_TTS_VOICE.into(),
            hidden_categories: BTreeSet::new(),
            grid_size: DEFAULT_GRID_SIZE,
            show_text: true,
            theme: Theme::default(),
            enable_child_filter: false,
            text_size: TextSize::default(),
        }
    }
}

impl AppSettings {
    /// Returns `true` when items of `category` should be shown.
    pub fn is_category_visible(&self, category: Option<&str>) -> bool {
        match category {
            Some(id) => !self.hidden_categories.contains(id),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run_values() {
        let s = AppSettings::default();
        assert_eq!(s.button_mode, ButtonMode::Sentence);
        assert_eq!(s.volume, 1.0);
        assert_eq!(s.speech_rate, 0.8);
        assert_eq!(s.tts_voice, "en-US");
        assert!(s.hidden_categories.is_empty());
        assert_eq!(s.grid_size, 3);
        assert_eq!(s.theme, Theme::Colorful);
        assert_eq!(s.text_size, TextSize::Medium);
    }

    #[test]
    fn button_mode_serialises_kebab_case() {
        let json = serde_json::to_string(&ButtonMode::TwoWord).unwrap();
        assert_eq!(json, "\"two-word\"");
    }

    #[test]
    fn unknown_button_mode_deserialises_as_one_word() {
        let mode: ButtonMode = serde_json::from_str("\"shouting\"").unwrap();
        assert_eq!(mode, ButtonMode::OneWord);
    }

    #[test]
    fn partial_json_fills_missing_fields_with_defaults() {
        let json = r#"{"volume":0.5,"speechRate":1.0,"buttonMode":"one-word"}"#;
        let s: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(s.volume, 0.5);
        assert_eq!(s.speech_rate, 1.0);
        assert_eq!(s.button_mode, ButtonMode::OneWord);
        assert_eq!(s.tts_voice, DEFAULT_TTS_VOICE);
        assert!(s.show_text);
    }

    #[test]
    fn camel_case_keys_on_disk() {
        let json = serde_json::to_value(AppSettings::default()).unwrap();
        assert!(json.get("buttonMode").is_some());
        assert!(json.get("speechRate").is_some());
        assert!(json.get("ttsVoice").is_some());
        assert!(json.get("hiddenCategories").is_some());
    }

    #[test]
    fn hidden_category_is_not_visible() {
        let mut s = AppSettings::default();
        s.hidden_categories.insert("food".into());
        assert!(!s.is_category_visible(Some("food")));
        assert!(s.is_category_visible(Some("people")));
        assert!(s.is_category_visible(None));
    }

    #[test]
    fn button_mode_parses_with_whitespace() {
        assert_eq!(" sentence ".parse::<ButtonMode>().unwrap(), ButtonMode::Sentence);
        assert!("loud".parse::<ButtonMode>().is_err());
    }
}

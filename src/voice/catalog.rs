//! Voice options shown on the settings surface.
//!
//! [`classify_voice`] is a best-effort heuristic over voice *names*.  It is
//! English-centric and will misfile voices it does not recognise; those land
//! in the documented fallback category, [`VoiceCategory::AdultFemale`].

use std::cmp::Ordering;

use crate::platform::{PlatformVoice, SpeechPlatform};

/// Used when the engine reports no voices at all.
pub const FALLBACK_DEFAULT_VOICE: &str = "com.apple.voice.compact.en-US.Samantha";

/// Tried in order by [`default_voice`]; matched against identifier or
/// language.
const PREFERRED_VOICES: [&str; 5] = [
    "com.apple.ttsbundle.Samantha-compact",
    "com.apple.ttsbundle.Alex-compact",
    "com.apple.ttsbundle.Karen-compact",
    "en-US",
    "en-GB",
];

const FEMALE_HINTS: [&str; 4] = ["female", "samantha", "karen", "martha"];
const MALE_HINTS: [&str; 4] = ["male", "alex", "david", "james"];

// ---------------------------------------------------------------------------
// VoiceCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCategory {
    AdultFemale,
    AdultMale,
}

impl VoiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceCategory::AdultFemale => "adult-female",
            VoiceCategory::AdultMale => "adult-male",
        }
    }
}

/// Filter selected in the voice picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceFilter {
    All,
    Only(VoiceCategory),
}

/// Guess a voice's category from its display name.
///
/// Female hints are checked first because `"female"` contains `"male"`.
pub fn classify_voice(name: &str) -> VoiceCategory {
    let lower = name.to_lowercase();
    if FEMALE_HINTS.iter().any(|h| lower.contains(h)) {
        VoiceCategory::AdultFemale
    } else if MALE_HINTS.iter().any(|h| lower.contains(h)) {
        VoiceCategory::AdultMale
    } else {
        VoiceCategory::AdultFemale
    }
}

// ---------------------------------------------------------------------------
// VoiceOption
// ---------------------------------------------------------------------------

/// One row of the voice picker.  `id` is what gets stored in the
/// `voice` setting.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceOption {
    pub id: String,
    pub name: String,
    pub language: String,
    pub category: VoiceCategory,
}

fn fallback_options() -> Vec<VoiceOption> {
    [
        ("en-US", "English (US)"),
        ("en-GB", "English (UK)"),
        ("en-AU", "English (Australia)"),
    ]
    .into_iter()
    .map(|(tag, name)| VoiceOption {
        id: tag.into(),
        name: name.into(),
        language: tag.into(),
        category: VoiceCategory::AdultFemale,
    })
    .collect()
}

/// Convert engine voices into picker options, sorted by language then name.
///
/// An empty input yields basic language options so the picker is never
/// empty.
pub fn build_voice_options(voices: &[PlatformVoice]) -> Vec<VoiceOption> {
    if voices.is_empty() {
        return fallback_options();
    }

    let mut options: Vec<VoiceOption> = voices
        .iter()
        .map(|v| {
            let name = if v.name.is_empty() {
                v.identifier.clone()
            } else {
                v.name.clone()
            };
            let language = if v.language.is_empty() {
                super::DEFAULT_LANGUAGE.to_string()
            } else {
                v.language.clone()
            };
            let category = classify_voice(&name);
            log::debug!("voice: {name} -> {}", category.as_str());
            VoiceOption {
                id: v.identifier.clone(),
                name,
                language,
                category,
            }
        })
        .collect();

    options.sort_by(|a, b| match a.language.cmp(&b.language) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
    options
}

pub fn filter_voices(options: &[VoiceOption], filter: VoiceFilter) -> Vec<VoiceOption> {
    options
        .iter()
        .filter(|o| match filter {
            VoiceFilter::All => true,
            VoiceFilter::Only(category) => o.category == category,
        })
        .cloned()
        .collect()
}

/// Pick a default voice identifier from what the engine offers.
pub fn default_voice(voices: &[PlatformVoice]) -> String {
    let Some(first) = voices.first() else {
        return FALLBACK_DEFAULT_VOICE.to_string();
    };

    PREFERRED_VOICES
        .iter()
        .find_map(|preferred| {
            voices
                .iter()
                .find(|v| v.identifier == *preferred || v.language == *preferred)
        })
        .unwrap_or(first)
        .identifier
        .clone()
}

/// Query the engine for voices.  Failures are logged and yield an empty
/// list.
pub async fn available_voices(speech: &dyn SpeechPlatform) -> Vec<PlatformVoice> {
    match speech.available_voices().await {
        Ok(voices) => {
            log::info!("voice: {} available", voices.len());
            voices
        }
        Err(e) => {
            log::warn!("voice: could not list voices: {e}");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

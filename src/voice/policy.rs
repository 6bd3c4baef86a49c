//! Which configured voice identifiers are safe to hand to the speech engine.
//!
//! Stale or opaque identifiers are a frequent cause of speech failures, so
//! only two shapes are forwarded:
//!
//! * platform bundle identifiers (`com.apple.ttsbundle.*`, `com.apple.voice.*`,
//!   `com.apple.speech.synthesis.voice.*`), and
//! * bare language tags (`en`, `en-US`, `es-419`, `zh-Hant-TW`).
//!
//! Anything else means "use the engine's default voice".

/// Language used when the configured voice does not name one.
pub const DEFAULT_LANGUAGE: &str = "en-US";

const BUNDLE_PREFIXES: [&str; 3] = [
    "com.apple.ttsbundle.",
    "com.apple.voice.",
    "com.apple.speech.synthesis.voice.",
];

/// How a configured voice identifier was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelector {
    /// A platform voice identifier.
    Bundle(String),
    /// A bare language tag; also selects the speech language.
    Language(String),
    /// Not forwarded; the engine picks its default voice.
    Default,
}

impl VoiceSelector {
    pub fn classify(configured: &str) -> Self {
        let id = configured.trim();
        if is_bundle_identifier(id) {
            VoiceSelector::Bundle(id.to_string())
        } else if is_language_tag(id) {
            VoiceSelector::Language(id.to_string())
        } else {
            VoiceSelector::Default
        }
    }

    /// The identifier to forward to the engine, if any.
    pub fn voice(&self) -> Option<&str> {
        match self {
            VoiceSelector::Bundle(id) | VoiceSelector::Language(id) => Some(id),
            VoiceSelector::Default => None,
        }
    }

    /// The speech language implied by the selector, or `fallback` when the
    /// selector does not name one.
    pub fn language_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            VoiceSelector::Language(tag) => tag,
            _ => fallback,
        }
    }
}

pub fn is_bundle_identifier(id: &str) -> bool {
    BUNDLE_PREFIXES
        .iter()
        .any(|prefix| id.len() > prefix.len() && id.starts_with(prefix))
}

/// A simplified BCP-47 check: a 2–3 letter primary subtag followed by
/// optional script (4 letters) and region (2 letters or 3 digits) subtags.
pub fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary = match parts.next() {
        Some(p) => p,
        None => return false,
    };
    if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    let mut seen_script = false;
    let mut seen_region = false;
    for part in parts {
        let is_script = part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic());
        let is_region = (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
            || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()));

        if is_script && !seen_script && !seen_region {
            seen_script = true;
        } else if is_region && !seen_region {
            seen_region = true;
        } else {
            return false;
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

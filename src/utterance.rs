//! Utterance resolution: which string is spoken for a pressed item.

use crate::model::{ButtonMode, VocabularyItem};

/// Select the string to speak for `item` under `mode`.
///
/// Sentence mode speaks `message` and two-word mode speaks `two_word`; either
/// falls back to the label when the overlay is missing or blank.  One-word
/// mode always speaks the label.
pub fn resolve(item: &VocabularyItem, mode: ButtonMode) -> String {
    let overlay = match mode {
        ButtonMode::Sentence => item.message.as_deref(),
        ButtonMode::TwoWord => item.two_word.as_deref(),
        ButtonMode::OneWord => None,
    };

    overlay
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&item.text)
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> VocabularyItem {
        VocabularyItem::new("water", "Water")
            .unwrap()
            .with_message("I want water.")
            .with_two_word("Want water")
    }

    #[test]
    fn sentence_mode_speaks_message() {
        assert_eq!(resolve(&water(), ButtonMode::Sentence), "I want water.");
    }

    #[test]
    fn sentence_mode_without_message_speaks_text() {
        let item = VocabularyItem::new("water", "Water").unwrap().with_two_word("Want water");
        assert_eq!(resolve(&item, ButtonMode::Sentence), "Water");
    }

    #[test]
    fn sentence_mode_with_blank_message_speaks_text() {
        let item = VocabularyItem::new("water", "Water").unwrap().with_message("");
        assert_eq!(resolve(&item, ButtonMode::Sentence), "Water");
    }

    #[test]
    fn two_word_mode_speaks_two_word() {
        assert_eq!(resolve(&water(), ButtonMode::TwoWord), "Want water");
    }

    #[test]
    fn two_word_mode_without_two_word_speaks_text() {
        let item = VocabularyItem::new("hungry", "Hungry").unwrap();
        assert_eq!(resolve(&item, ButtonMode::TwoWord), "Hungry");
    }

    #[test]
    fn one_word_mode_ignores_overlays() {
        assert_eq!(resolve(&water(), ButtonMode::OneWord), "Water");
    }

    #[test]
    fn unrecognised_persisted_mode_speaks_text() {
        let mode = ButtonMode::parse_lenient("whisper");
        assert_eq!(resolve(&water(), mode), "Water");
    }

    #[test]
    fn never_empty_for_seed_vocabulary() {
        for item in crate::model::default_vocabulary() {
            for mode in ButtonMode::ALL {
                assert!(!resolve(&item, mode).is_empty(), "{} / {mode}", item.id);
            }
        }
    }
}

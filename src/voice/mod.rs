//! Voice selection: the forwarding policy for configured voices and the
//! catalogue shown in the voice picker.

pub mod catalog;
pub mod policy;

pub use catalog::{
    available_voices, build_voice_options, classify_voice, default_voice, filter_voices,
    VoiceCategory, VoiceFilter, VoiceOption,
};
pub use policy::{is_language_tag, VoiceSelector, DEFAULT_LANGUAGE};

//! The settings subset the feedback pipeline needs.

use crate::model::AppSettings;
use crate::model::settings::DEFAULT_SPEECH_RATE;

/// Rate multipliers outside this range are clamped.
pub const RATE_RANGE: (f32, f32) = (0.5, 1.5);

/// Volume, rate and voice for a single press.
///
/// Built fresh from [`AppSettings`] on every press so a settings change takes
/// effect on the next tap.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechParams {
    /// `[0.0, 1.0]`.
    pub volume: f32,
    pub rate: f32,
    /// Configured voice identifier, unfiltered.
    pub voice: String,
}

impl SpeechParams {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let volume = if settings.volume.is_finite() {
            settings.volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let rate = if settings.speech_rate.is_finite() {
            settings.speech_rate.clamp(RATE_RANGE.0, RATE_RANGE.1)
        } else {
            DEFAULT_SPEECH_RATE
        };
        Self {
            volume,
            rate,
            voice: settings.tts_voice.clone(),
        }
    }
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self::from_settings(&AppSettings::default())
    }
}

//! The fallback order and the record of what each stage did.

use crate::platform::PlatformError;

use super::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStage {
    /// Speak with the configured voice, when it passes the voice policy.
    SpeakWithVoice,
    /// Speak with the engine's default voice.
    SpeakWithoutVoice,
    /// Play the fallback tone.
    Tone,
    /// Fire the fallback vibration pattern.
    Vibration,
}

impl FallbackStage {
    /// Stable kebab-case name, used in logs and the front end.
    pub fn label(&self) -> &'static str {
        match self {
            FallbackStage::SpeakWithVoice => "speak-with-voice",
            FallbackStage::SpeakWithoutVoice => "speak-without-voice",
            FallbackStage::Tone => "tone",
            FallbackStage::Vibration => "vibration",
        }
    }

    /// `true` for the stages that produce speech.
    pub fn is_speech(&self) -> bool {
        matches!(
            self,
            FallbackStage::SpeakWithVoice | FallbackStage::SpeakWithoutVoice
        )
    }
}

/// Stages tried in order until one succeeds.
pub const DEFAULT_CHAIN: [FallbackStage; 4] = [
    FallbackStage::SpeakWithVoice,
    FallbackStage::SpeakWithoutVoice,
    FallbackStage::Tone,
    FallbackStage::Vibration,
];

#[derive(Debug, Clone, PartialEq)]
pub enum StageResult {
    /// The stage produced feedback; the chain stops here.
    Delivered,
    /// The platform call failed; the next stage runs.
    Failed(PlatformError),
    /// The stage had nothing to do (e.g. no eligible voice).
    Skipped,
}

/// What happened during one run of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackOutcome {
    pub session: SessionState,
    /// Stages in the order they ran.  Stages after the delivering one are
    /// absent.
    pub stages: Vec<(FallbackStage, StageResult)>,
}

impl FeedbackOutcome {
    pub fn delivered_by(&self) -> Option<FallbackStage> {
        self.stages
            .iter()
            .find(|(_, result)| *result == StageResult::Delivered)
            .map(|(stage, _)| *stage)
    }

    pub fn result_of(&self, stage: FallbackStage) -> Option<&StageResult> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, result)| result)
    }

    pub fn was_spoken(&self) -> bool {
        self.delivered_by().is_some_and(|s| s.is_speech())
    }
}

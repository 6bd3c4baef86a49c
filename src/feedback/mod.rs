//! Audio feedback pipeline: turns an utterance into *some* perceptible
//! feedback.
//!
//! # Flow
//!
//! ```text
//! deliver(text, params)
//!   └─▶ AudioSession::ensure_initialized      (memoised; never blocks speech)
//!   └─▶ speech.stop()                          (best effort)
//!   └─▶ for stage in chain:
//!         SpeakWithVoice     ── Ok ─▶ done      (Skipped without eligible voice)
//!         SpeakWithoutVoice  ── Ok ─▶ done
//!         Tone               ── Ok ─▶ done
//!         Vibration                              (last resort)
//! ```
//!
//! [`FeedbackPipeline::deliver`] never fails.  Every stage error is logged
//! and recorded in the returned [`FeedbackOutcome`].

pub mod chain;
pub mod params;
pub mod session;

pub use chain::{FallbackStage, FeedbackOutcome, StageResult, DEFAULT_CHAIN};
pub use params::SpeechParams;
pub use session::{AudioSession, SessionState};

use std::sync::Arc;

use crate::platform::{
    AudioPlatform, HapticsPlatform, SoundSource, SpeechPlatform, SpeechRequest, VibrationPattern,
};
use crate::voice::{VoiceSelector, DEFAULT_LANGUAGE};

/// Tone played when neither speech stage succeeds.
pub const DEFAULT_TONE: SoundSource = SoundSource::Tone {
    frequency_hz: 880.0,
    duration_ms: 300,
};

// ---------------------------------------------------------------------------
// FeedbackPipeline
// ---------------------------------------------------------------------------

/// Owns the platform handles, the memoised [`AudioSession`] and the fallback
/// chain.  One instance is shared by every press.
pub struct FeedbackPipeline {
    speech: Arc<dyn SpeechPlatform>,
    audio: Arc<dyn AudioPlatform>,
    haptics: Arc<dyn HapticsPlatform>,
    session: AudioSession,
    chain: Vec<FallbackStage>,
    tone: SoundSource,
    tone_volume: f32,
    fallback_pattern: VibrationPattern,
    default_language: String,
}

impl FeedbackPipeline {
    pub fn new(
        speech: Arc<dyn SpeechPlatform>,
        audio: Arc<dyn AudioPlatform>,
        haptics: Arc<dyn HapticsPlatform>,
    ) -> Self {
        Self {
            speech,
            audio,
            haptics,
            session: AudioSession::new(),
            chain: DEFAULT_CHAIN.to_vec(),
            tone: DEFAULT_TONE,
            tone_volume: 1.0,
            fallback_pattern: VibrationPattern::fallback(),
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// `volume` scales the user's volume setting for the tone stage.
    pub fn with_tone(mut self, tone: SoundSource, volume: f32) -> Self {
        self.tone = tone;
        self.tone_volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn with_fallback_pattern(mut self, pattern: VibrationPattern) -> Self {
        self.fallback_pattern = pattern;
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn with_chain(mut self, chain: Vec<FallbackStage>) -> Self {
        self.chain = chain;
        self
    }

    pub fn session(&self) -> &AudioSession {
        &self.session
    }

    pub fn speech(&self) -> &Arc<dyn SpeechPlatform> {
        &self.speech
    }

    pub fn audio(&self) -> &Arc<dyn AudioPlatform> {
        &self.audio
    }

    pub fn haptics(&self) -> &Arc<dyn HapticsPlatform> {
        &self.haptics
    }

    pub fn tone(&self) -> &SoundSource {
        &self.tone
    }

    pub fn fallback_pattern(&self) -> &VibrationPattern {
        &self.fallback_pattern
    }

    /// Produce feedback for `text`, trying each stage until one succeeds.
    pub async fn deliver(&self, text: &str, params: &SpeechParams) -> FeedbackOutcome {
        let session = self.session.ensure_initialized(self.audio.as_ref()).await;

        if let Err(e) = self.speech.stop().await {
            log::debug!("feedback: stop before speaking failed: {e}");
        }

        let selector = VoiceSelector::classify(&params.voice);
        let mut stages = Vec::with_capacity(self.chain.len());

        for &stage in &self.chain {
            let result = self.run_stage(stage, text, params, &selector).await;
            match &result {
                StageResult::Delivered => log::debug!("feedback: {} delivered", stage.label()),
                StageResult::Skipped => log::debug!("feedback: {} skipped", stage.label()),
                StageResult::Failed(e) => log::warn!("feedback: {} failed: {e}", stage.label()),
            }
            let delivered = result == StageResult::Delivered;
            stages.push((stage, result));
            if delivered {
                return FeedbackOutcome { session, stages };
            }
        }

        log::error!("feedback: every stage failed for {text:?}");
        FeedbackOutcome { session, stages }
    }

    async fn run_stage(
        &self,
        stage: FallbackStage,
        text: &str,
        params: &SpeechParams,
        selector: &VoiceSelector,
    ) -> StageResult {
        let outcome = match stage {
            FallbackStage::SpeakWithVoice => {
                let Some(voice) = selector.voice() else {
                    return StageResult::Skipped;
                };
                let language = selector.language_or(&self.default_language).to_string();
                self.speech
                    .speak(&self.request(text, params, language, Some(voice.to_string())))
                    .await
            }
            FallbackStage::SpeakWithoutVoice => {
                self.speech
                    .speak(&self.request(text, params, self.default_language.clone(), None))
                    .await
            }
            FallbackStage::Tone => {
                self.audio
                    .play_sound(&self.tone, params.volume * self.tone_volume)
                    .await
            }
            FallbackStage::Vibration => self.haptics.vibrate(&self.fallback_pattern),
        };

        match outcome {
            Ok(()) => StageResult::Delivered,
            Err(e) => StageResult::Failed(e),
        }
    }

    fn request(
        &self,
        text: &str,
        params: &SpeechParams,
        language: String,
        voice: Option<String>,
    ) -> SpeechRequest {
        SpeechRequest {
            text: text.to_string(),
            language,
            volume: params.volume,
            rate: params.rate,
            voice,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! On-demand capability check behind the settings screen's "test audio"
//! action.
//!
//! Unlike the feedback pipeline, each capability is exercised on its own and
//! every failure is reported.  The memoised session state is left alone.

use std::fmt;

use crate::feedback::{FeedbackPipeline, SpeechParams};
use crate::platform::{PlatformError, SessionMode, SpeechRequest};
use crate::voice::DEFAULT_LANGUAGE;

pub const TEST_PHRASE: &str = "Hello, this is a speech test";

/// Outcome of one capability check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    Pass,
    Fail(PlatformError),
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        matches!(self, CheckResult::Pass)
    }
}

impl From<Result<(), PlatformError>> for CheckResult {
    fn from(result: Result<(), PlatformError>) -> Self {
        match result {
            Ok(()) => CheckResult::Pass,
            Err(e) => CheckResult::Fail(e),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Pass => write!(f, "pass"),
            CheckResult::Fail(e) => write!(f, "FAIL ({e})"),
        }
    }
}

/// One [`CheckResult`] per capability, in the order they were run.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticReport {
    pub session: CheckResult,
    pub audio: CheckResult,
    pub tts: CheckResult,
    pub vibration: CheckResult,
}

impl DiagnosticReport {
    pub fn all_passed(&self) -> bool {
        self.checks().iter().all(|(_, r)| r.passed())
    }

    pub fn checks(&self) -> [(&'static str, &CheckResult); 4] {
        [
            ("audio session", &self.session),
            ("device audio", &self.audio),
            ("text-to-speech", &self.tts),
            ("vibration", &self.vibration),
        ]
    }
}

/// Exercise session configuration, tone playback, speech and vibration in
/// turn.  Never fails; each result is in the report.
pub async fn run_diagnostics(pipeline: &FeedbackPipeline) -> DiagnosticReport {
    let session = pipeline
        .audio()
        .set_session_mode(&SessionMode::preferred())
        .await
        .into();

    let defaults = SpeechParams::default();
    let audio = pipeline
        .audio()
        .play_sound(pipeline.tone(), defaults.volume)
        .await
        .into();

    let request = SpeechRequest {
        text: TEST_PHRASE.to_string(),
        language: DEFAULT_LANGUAGE.to_string(),
        volume: defaults.volume,
        rate: defaults.rate,
        voice: None,
    };
    let tts = pipeline.speech().speak(&request).await.into();

    let vibration = pipeline.haptics().vibrate(pipeline.fallback_pattern()).into();

    let report = DiagnosticReport {
        session,
        audio,
        tts,
        vibration,
    };
    for (name, result) in report.checks() {
        match result {
            CheckResult::Pass => log::info!("diagnostics: {name}: pass"),
            CheckResult::Fail(e) => log::warn!("diagnostics: {name}: {e}"),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockAudio, MockHaptics, MockSpeech};
    use crate::platform::VibrationPattern;
    use std::sync::Arc;

    #[tokio::test]
    async fn all_capabilities_pass() {
        let speech = Arc::new(MockSpeech::ok());
        let haptics = Arc::new(MockHaptics::ok());
        let pipeline = FeedbackPipeline::new(speech.clone(), Arc::new(MockAudio::ok()), haptics.clone());

        let report = run_diagnostics(&pipeline).await;
        assert!(report.all_passed());
        assert_eq!(speech.spoken()[0].text, TEST_PHRASE);
        assert!(speech.spoken()[0].voice.is_none());
        assert_eq!(haptics.vibrations(), vec![VibrationPattern(vec![100, 200, 100])]);
    }

    #[tokio::test]
    async fn failures_are_reported_per_capability() {
        let pipeline = FeedbackPipeline::new(
            Arc::new(MockSpeech::ok()),
            Arc::new(MockAudio::failing()),
            Arc::new(MockHaptics::failing()),
        );

        let report = run_diagnostics(&pipeline).await;
        assert!(!report.all_passed());
        assert!(!report.session.passed());
        assert!(!report.audio.passed());
        assert!(report.tts.passed());
        assert!(!report.vibration.passed());
    }

    #[tokio::test]
    async fn memoised_session_untouched() {
        let pipeline = FeedbackPipeline::new(
            Arc::new(MockSpeech::ok()),
            Arc::new(MockAudio::ok()),
            Arc::new(MockHaptics::ok()),
        );
        run_diagnostics(&pipeline).await;
        assert!(!pipeline.session().is_initialized().await);
    }

    #[test]
    fn check_result_display() {
        assert_eq!(CheckResult::Pass.to_string(), "pass");
        let fail = CheckResult::Fail(PlatformError::Unavailable("vibration"));
        assert!(fail.to_string().starts_with("FAIL"));
    }
}

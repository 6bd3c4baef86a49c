//! Platform capabilities the feedback pipeline drives.
//!
//! # Overview
//!
//! | Trait             | Operations                                   | Desktop impl       |
//! |-------------------|----------------------------------------------|--------------------|
//! | [`SpeechPlatform`]| `speak`, `stop`, `available_voices`          | [`SystemSpeech`]   |
//! | [`AudioPlatform`] | `set_session_mode`, `play_sound`             | [`CpalAudio`]      |
//! | [`HapticsPlatform`]| `vibrate` (synchronous)                     | [`TerminalHaptics`]|
//!
//! Every trait is object safe and `Send + Sync` so the pipeline can hold
//! `Arc<dyn …>` handles.  Any inability to produce output is reported as
//! `Err(PlatformError)`; callers decide what to do next.
//!
//! [`mock`] (test-only) provides scripted doubles that record every call.

pub mod haptics;
pub mod speech;
pub mod tone;

#[cfg(test)]
pub mod mock;

pub use haptics::TerminalHaptics;
pub use speech::SystemSpeech;
pub use tone::CpalAudio;

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// PlatformError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlatformError {
    /// The capability does not exist on this device (no engine, no device).
    #[error("{0} is unavailable on this device")]
    Unavailable(&'static str),

    /// The speech engine rejected or failed the utterance.
    #[error("speech failed: {0}")]
    Speech(String),

    /// The audio stack refused the session configuration.
    #[error("audio session configuration failed: {0}")]
    Session(String),

    /// Sound playback failed.
    #[error("sound playback failed: {0}")]
    Playback(String),

    /// The vibration call failed.
    #[error("vibration failed: {0}")]
    Haptics(String),
}

// ---------------------------------------------------------------------------
// Speech
// ---------------------------------------------------------------------------

/// A single utterance request.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    /// BCP-47 language tag (e.g. `"en-US"`).
    pub language: String,
    /// `[0.0, 1.0]`.
    pub volume: f32,
    /// Rate multiplier; `1.0` is the engine's normal rate.
    pub rate: f32,
    /// Platform voice identifier.  `None` lets the engine choose.
    pub voice: Option<String>,
}

/// A voice reported by the speech engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformVoice {
    /// Engine-specific id, forwarded back in [`SpeechRequest::voice`].
    pub identifier: String,
    /// Human-readable name as the engine lists it.
    pub name: String,
    /// Language tag, e.g. `en-US`.
    pub language: String,
}

#[async_trait]
pub trait SpeechPlatform: Send + Sync {
    /// Speak `request` and resolve once the utterance has finished.
    async fn speak(&self, request: &SpeechRequest) -> Result<(), PlatformError>;

    /// Interrupt any utterance in flight.
    async fn stop(&self) -> Result<(), PlatformError>;

    async fn available_voices(&self) -> Result<Vec<PlatformVoice>, PlatformError>;
}

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// How the app's audio interacts with other audio on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionMode {
    DoNotMix,
    DuckOthers,
    MixWithOthers,
}

/// Audio session configuration applied before speech or tone playback.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMode {
    pub allows_recording: bool,
    pub stays_active_in_background: bool,
    /// Play even when the ringer switch is silenced.
    pub plays_in_silent_mode: bool,
    /// Lower other apps' volume while we play.
    pub duck_others: bool,
    pub play_through_earpiece: bool,
    pub interruption: InterruptionMode,
}

impl SessionMode {
    /// The configuration attempted first.
    pub fn preferred() -> Self {
        Self {
            allows_recording: false,
            stays_active_in_background: true,
            plays_in_silent_mode: true,
            duck_others: true,
            play_through_earpiece: false,
            interruption: InterruptionMode::DoNotMix,
        }
    }

    /// Reduced configuration tried when [`preferred`](Self::preferred) is
    /// rejected: identical except that ducking is off.
    pub fn minimal() -> Self {
        Self {
            duck_others: false,
            ..Self::preferred()
        }
    }
}

/// A one-shot sound.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundSource {
    /// A synthesised sine tone.
    Tone { frequency_hz: f32, duration_ms: u64 },
}

#[async_trait]
pub trait AudioPlatform: Send + Sync {
    /// Configure the shared audio session.  An `Err` means `mode` was
    /// rejected and the caller may retry with a less demanding one.
    async fn set_session_mode(&self, mode: &SessionMode) -> Result<(), PlatformError>;

    /// Play `source` to completion at `volume` (`[0.0, 1.0]`).
    async fn play_sound(&self, source: &SoundSource, volume: f32) -> Result<(), PlatformError>;
}

// ---------------------------------------------------------------------------
// Haptics
// ---------------------------------------------------------------------------

/// Alternating wait/vibrate durations in milliseconds, starting with a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibrationPattern(pub Vec<u64>);

impl VibrationPattern {
    /// Short-long-short pulse fired on every press.
    pub fn press() -> Self {
        Self(vec![50, 100, 50])
    }

    /// Stronger pattern used when no audio could be produced.
    pub fn fallback() -> Self {
        Self(vec![100, 200, 100])
    }

    pub fn total_ms(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// Fire-and-forget vibration.  Synchronous; reports failure by `Err`.
pub trait HapticsPlatform: Send + Sync {
    fn vibrate(&self, pattern: &VibrationPattern) -> Result<(), PlatformError>;
}

// Compile-time assertion: the platform traits must be object safe.
const _: fn() = || {
    fn _assert_object_safe(
        _: Box<dyn SpeechPlatform>,
        _: Box<dyn AudioPlatform>,
        _: Box<dyn HapticsPlatform>,
    ) {
    }
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Scripted platform doubles (test-only).
//!
//! Each double records every call it receives so tests can assert on the
//! exact sequence of platform interactions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{
    AudioPlatform, HapticsPlatform, PlatformError, PlatformVoice, SessionMode, SoundSource,
    SpeechPlatform, SpeechRequest, VibrationPattern,
};

// ---------------------------------------------------------------------------
// MockSpeech
// ---------------------------------------------------------------------------

pub struct MockSpeech {
    fail_with_voice: bool,
    fail_without_voice: bool,
    fail_stop: bool,
    voices: Result<Vec<PlatformVoice>, PlatformError>,
    /// When set, the first `speak` parks until the next `stop`.
    hold_first: Option<Notify>,
    holding: AtomicBool,
    pub requests: Mutex<Vec<SpeechRequest>>,
    pub stops: AtomicUsize,
    pub interrupted: AtomicUsize,
}

impl MockSpeech {
    /// Every utterance succeeds.
    pub fn ok() -> Self {
        Self::scripted(false, false)
    }

    /// Every utterance fails.
    pub fn failing() -> Self {
        Self::scripted(true, true)
    }

    /// Requests carrying a voice fail; voiceless requests succeed.
    pub fn voice_fails() -> Self {
        Self::scripted(true, false)
    }

    fn scripted(fail_with_voice: bool, fail_without_voice: bool) -> Self {
        Self {
            fail_with_voice,
            fail_without_voice,
            fail_stop: false,
            voices: Ok(Vec::new()),
            hold_first: None,
            holding: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
            interrupted: AtomicUsize::new(0),
        }
    }

    /// The first utterance keeps "playing" until `stop` is called, like a
    /// real engine reading a long sentence.  Later utterances finish at once.
    pub fn holding_first() -> Self {
        let mut speech = Self::ok();
        speech.hold_first = Some(Notify::new());
        speech
    }

    pub fn with_failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn with_voices(mut self, voices: Result<Vec<PlatformVoice>, PlatformError>) -> Self {
        self.voices = voices;
        self
    }

    pub fn spoken(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn interrupted_count(&self) -> usize {
        self.interrupted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechPlatform for MockSpeech {
    async fn speak(&self, request: &SpeechRequest) -> Result<(), PlatformError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(release) = &self.hold_first {
            if !self.holding.swap(true, Ordering::SeqCst) {
                let released = release.notified();
                tokio::pin!(released);
                released.as_mut().enable();
                released.await;
                self.interrupted.fetch_add(1, Ordering::SeqCst);
                return Ok(());
            }
        }
        let fail = if request.voice.is_some() {
            self.fail_with_voice
        } else {
            self.fail_without_voice
        };
        if fail {
            Err(PlatformError::Speech("engine rejected utterance".into()))
        } else {
            Ok(())
        }
    }

    async fn stop(&self) -> Result<(), PlatformError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if let Some(release) = &self.hold_first {
            release.notify_waiters();
        }
        if self.fail_stop {
            Err(PlatformError::Speech("stop unsupported".into()))
        } else {
            Ok(())
        }
    }

    async fn available_voices(&self) -> Result<Vec<PlatformVoice>, PlatformError> {
        self.voices.clone()
    }
}

// ---------------------------------------------------------------------------
// MockAudio
// ---------------------------------------------------------------------------

pub struct MockAudio {
    /// Results handed out to successive `set_session_mode` calls; once
    /// exhausted every call succeeds.
    session_results: Mutex<VecDeque<Result<(), PlatformError>>>,
    fail_playback: bool,
    pub sessions: Mutex<Vec<SessionMode>>,
    pub sounds: Mutex<Vec<(SoundSource, f32)>>,
}

impl MockAudio {
    pub fn ok() -> Self {
        Self::new(Vec::new(), false)
    }

    pub fn failing() -> Self {
        Self::new(
            vec![
                Err(PlatformError::Session("preferred rejected".into())),
                Err(PlatformError::Session("minimal rejected".into())),
            ],
            true,
        )
    }

    pub fn new(session_results: Vec<Result<(), PlatformError>>, fail_playback: bool) -> Self {
        Self {
            session_results: Mutex::new(session_results.into()),
            fail_playback,
            sessions: Mutex::new(Vec::new()),
            sounds: Mutex::new(Vec::new()),
        }
    }

    pub fn session_calls(&self) -> Vec<SessionMode> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn sound_count(&self) -> usize {
        self.sounds.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioPlatform for MockAudio {
    async fn set_session_mode(&self, mode: &SessionMode) -> Result<(), PlatformError> {
        self.sessions.lock().unwrap().push(mode.clone());
        self.session_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn play_sound(&self, source: &SoundSource, volume: f32) -> Result<(), PlatformError> {
        self.sounds.lock().unwrap().push((source.clone(), volume));
        if self.fail_playback {
            Err(PlatformError::Playback("no output device".into()))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// MockHaptics
// ---------------------------------------------------------------------------

pub struct MockHaptics {
    fail: bool,
    pub patterns: Mutex<Vec<VibrationPattern>>,
}

impl MockHaptics {
    pub fn ok() -> Self {
        Self {
            fail: false,
            patterns: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            patterns: Mutex::new(Vec::new()),
        }
    }

    pub fn vibrations(&self) -> Vec<VibrationPattern> {
        self.patterns.lock().unwrap().clone()
    }
}

impl HapticsPlatform for MockHaptics {
    fn vibrate(&self, pattern: &VibrationPattern) -> Result<(), PlatformError> {
        self.patterns.lock().unwrap().push(pattern.clone());
        if self.fail {
            Err(PlatformError::Haptics("vibrator missing".into()))
        } else {
            Ok(())
        }
    }
}

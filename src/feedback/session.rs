//! Process-scoped audio session state.
//!
//! The session is configured at most once.  The first caller of
//! [`AudioSession::ensure_initialized`] runs the attempt sequence (preferred
//! mode, then minimal mode); everyone else sees the memoised result.  A
//! failed sequence is still "initialised": playback is attempted anyway.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

use crate::platform::{AudioPlatform, SessionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialised,
    /// The preferred mode was accepted.
    Preferred,
    /// Only the minimal mode was accepted.
    Minimal,
    /// Both modes were rejected; proceeding without a configured session.
    Unconfigured,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Uninitialised => "uninitialised",
            SessionState::Preferred => "preferred",
            SessionState::Minimal => "minimal",
            SessionState::Unconfigured => "unconfigured",
        }
    }
}

#[derive(Debug)]
pub struct AudioSession {
    state: Mutex<SessionState>,
    attempts: AtomicUsize,
}

impl AudioSession {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Uninitialised),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Run the attempt sequence unless it has already run.
    ///
    /// The lock is held across the platform calls so concurrent callers wait
    /// for the first sequence instead of starting their own.
    pub async fn ensure_initialized(&self, audio: &dyn AudioPlatform) -> SessionState {
        let mut state = self.state.lock().await;
        if *state != SessionState::Uninitialised {
            return *state;
        }

        self.attempts.fetch_add(1, Ordering::SeqCst);
        *state = match audio.set_session_mode(&SessionMode::preferred()).await {
            Ok(()) => SessionState::Preferred,
            Err(e) => {
                log::warn!("audio session: preferred mode rejected: {e}");
                match audio.set_session_mode(&SessionMode::minimal()).await {
                    Ok(()) => SessionState::Minimal,
                    Err(e) => {
                        log::warn!("audio session: minimal mode rejected, continuing unconfigured: {e}");
                        SessionState::Unconfigured
                    }
                }
            }
        };
        log::debug!("audio session: {}", state.label());
        *state
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    pub async fn is_initialized(&self) -> bool {
        self.state().await != SessionState::Uninitialised
    }

    /// Forget the memoised result; the next press runs the sequence again.
    pub async fn reset(&self) {
        *self.state.lock().await = SessionState::Uninitialised;
    }

    /// Number of attempt sequences run so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for AudioSession {
    fn default() -> Self {
        Self::new()
    }
}

//! [`PressHandler`] runs one button press end to end.
//!
//! Nothing in here returns an error.  Haptic, settings and audio failures are
//! absorbed by the layers below; a panic in the caller's callback is caught
//! and logged.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::feedback::{FeedbackOutcome, FeedbackPipeline, SpeechParams};
use crate::model::VocabularyItem;
use crate::platform::VibrationPattern;
use crate::storage::SettingsStore;
use crate::utterance;

use super::state::{new_shared_press_state, PressPhase, PressState, SharedPressState};

pub const DEFAULT_HIGHLIGHT: Duration = Duration::from_millis(200);

/// Result of a press, for front ends that want to show it.
#[derive(Debug, Clone, PartialEq)]
pub struct PressReport {
    pub utterance: String,
    pub outcome: FeedbackOutcome,
}

pub struct PressHandler {
    pipeline: Arc<FeedbackPipeline>,
    settings: Arc<SettingsStore>,
    press_pattern: VibrationPattern,
    highlight: Duration,
    state: SharedPressState,
    child_mode: AtomicBool,
}

impl PressHandler {
    pub fn new(pipeline: Arc<FeedbackPipeline>, settings: Arc<SettingsStore>) -> Self {
        Self {
            pipeline,
            settings,
            press_pattern: VibrationPattern::press(),
            highlight: DEFAULT_HIGHLIGHT,
            state: new_shared_press_state(),
            child_mode: AtomicBool::new(false),
        }
    }

    pub fn with_press_pattern(mut self, pattern: VibrationPattern) -> Self {
        self.press_pattern = pattern;
        self
    }

    pub fn with_highlight(mut self, highlight: Duration) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn state(&self) -> SharedPressState {
        Arc::clone(&self.state)
    }

    pub fn pipeline(&self) -> &Arc<FeedbackPipeline> {
        &self.pipeline
    }

    pub fn set_child_mode(&self, enabled: bool) {
        self.child_mode.store(enabled, Ordering::SeqCst);
    }

    pub fn is_child_mode(&self) -> bool {
        self.child_mode.load(Ordering::SeqCst)
    }

    pub fn is_highlighted(&self, item_id: &str) -> bool {
        self.lock_state().is_highlighted(item_id)
    }

    fn lock_state(&self) -> MutexGuard<'_, PressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle a tap on `item`.
    ///
    /// `on_activated` runs exactly once, after the feedback pipeline has
    /// settled, whatever the pipeline's outcome.
    pub async fn on_press<F>(&self, item: &VocabularyItem, on_activated: F) -> PressReport
    where
        F: FnOnce(&VocabularyItem),
    {
        self.lock_state().mark_pressed(&item.id, self.highlight);

        if let Err(e) = self.pipeline.haptics().vibrate(&self.press_pattern) {
            log::debug!("press: tactile pulse failed: {e}");
        }

        let settings = self.settings.load().await;
        let utterance = utterance::resolve(item, settings.button_mode);
        let params = SpeechParams::from_settings(&settings);
        log::debug!(
            "press: {} -> {utterance:?} ({})",
            item.id,
            settings.button_mode
        );

        self.lock_state().phase = PressPhase::Speaking;
        let outcome = self.pipeline.deliver(&utterance, &params).await;

        {
            let mut state = self.lock_state();
            state.phase = PressPhase::Activated;
            state.last_utterance = Some(utterance.clone());
            state.delivered_by = outcome.delivered_by();
        }

        if panic::catch_unwind(AssertUnwindSafe(|| on_activated(item))).is_err() {
            log::error!("press: item-activated callback for {} panicked", item.id);
        }

        PressReport { utterance, outcome }
    }

    /// Run [`on_press`](Self::on_press) as its own task.
    ///
    /// The caller is free to take the next press straight away; its
    /// stop-before-speak interrupts this one if it is still talking.
    pub fn spawn_press<F>(
        self: &Arc<Self>,
        item: VocabularyItem,
        on_activated: F,
    ) -> JoinHandle<PressReport>
    where
        F: FnOnce(&VocabularyItem) + Send + 'static,
    {
        let handler = Arc::clone(self);
        tokio::spawn(async move { handler.on_press(&item, on_activated).await })
    }

    /// Forward a long press to `on_long_press` unless child mode is on.
    ///
    /// Returns `true` when the callback ran without panicking.
    pub fn on_long_press<F>(&self, item: &VocabularyItem, on_long_press: F) -> bool
    where
        F: FnOnce(&VocabularyItem),
    {
        if self.is_child_mode() {
            log::debug!("press: long press on {} ignored in child mode", item.id);
            return false;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| on_long_press(item))) {
            Ok(()) => true,
            Err(_) => {
                log::error!("press: long-press callback for {} panicked", item.id);
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Press state shared with the front end.
//!
//! [`PressPhase`] tracks where the most recent press is in its flow.  The
//! highlight is a deadline rather than a timer: a button is drawn pressed
//! while `Instant::now()` is before [`PressState::highlight_until`].
//!
//! [`SharedPressState`] is `Arc<Mutex<PressState>>`; lock it for short
//! critical sections only and never across `.await` points.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::feedback::FallbackStage;

// ---------------------------------------------------------------------------
// PressPhase
// ---------------------------------------------------------------------------

/// ```text
/// Idle ──press──▶ Pressed ──utterance resolved──▶ Speaking ──pipeline settled──▶ Activated
/// Activated ──next press──▶ Pressed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PressPhase {
    #[default]
    Idle,
    Pressed,
    Speaking,
    Activated,
}

impl PressPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, PressPhase::Pressed | PressPhase::Speaking)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PressPhase::Idle => "Idle",
            PressPhase::Pressed => "Pressed",
            PressPhase::Speaking => "Speaking",
            PressPhase::Activated => "Done",
        }
    }
}

// ---------------------------------------------------------------------------
// PressState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PressState {
    pub phase: PressPhase,
    /// Id of the most recently pressed item.
    pub item_id: Option<String>,
    pub highlight_until: Option<Instant>,
    /// The utterance resolved for the last press.
    pub last_utterance: Option<String>,
    /// Which stage produced feedback for the last press; `None` when every
    /// stage failed or no press has settled yet.
    pub delivered_by: Option<FallbackStage>,
}

impl PressState {
    pub fn mark_pressed(&mut self, item_id: &str, highlight: Duration) {
        self.phase = PressPhase::Pressed;
        self.item_id = Some(item_id.to_string());
        self.highlight_until = Some(Instant::now() + highlight);
    }

    /// `true` while `item_id` should still be drawn highlighted.
    pub fn is_highlighted(&self, item_id: &str) -> bool {
        self.is_highlighted_at(item_id, Instant::now())
    }

    fn is_highlighted_at(&self, item_id: &str, now: Instant) -> bool {
        self.item_id.as_deref() == Some(item_id)
            && self.highlight_until.is_some_and(|until| now < until)
    }
}

// ---------------------------------------------------------------------------
// SharedPressState
// ---------------------------------------------------------------------------

pub type SharedPressState = Arc<Mutex<PressState>>;

pub fn new_shared_press_state() -> SharedPressState {
    Arc::new(Mutex::new(PressState::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

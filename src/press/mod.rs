//! Button press flow: highlight, tactile pulse, utterance, feedback, then the
//! caller's "item activated" callback.

pub mod handler;
pub mod state;

pub use handler::{PressHandler, PressReport, DEFAULT_HIGHLIGHT};
pub use state::{new_shared_press_state, PressPhase, PressState, SharedPressState};

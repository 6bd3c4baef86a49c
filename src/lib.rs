//! Echo Kids: the communication-board core.
//!
//! Every button press goes through
//! [`press::PressHandler::on_press`], which resolves the utterance for the
//! current [`model::ButtonMode`] and hands it to the
//! [`feedback::FeedbackPipeline`].  The pipeline degrades from spoken audio
//! to a tone to a vibration; it never reports failure to the caller.
//!
//! | Module          | Responsibility                                        |
//! |-----------------|-------------------------------------------------------|
//! | [`model`]       | `AppSettings`, `VocabularyItem`, `Category`           |
//! | [`utterance`]   | Which text a press speaks                             |
//! | [`feedback`]    | Session setup and the fallback chain                  |
//! | [`press`]       | The press flow and its shared UI state                |
//! | [`voice`]       | Voice policy, voice picker options                    |
//! | [`storage`]     | Key-value persistence with default substitution       |
//! | [`platform`]    | Speech, audio and haptics traits plus desktop impls   |
//! | [`diagnostics`] | Per-capability pass/fail report                       |
//! | [`config`]      | Host configuration (`config.toml`)                    |

pub mod config;
pub mod diagnostics;
pub mod feedback;
pub mod model;
pub mod platform;
pub mod press;
pub mod storage;
pub mod utterance;
pub mod voice;

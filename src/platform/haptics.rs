//! Desktop stand-in for the vibration motor: the terminal bell.

use std::io::Write;

use super::{HapticsPlatform, PlatformError, VibrationPattern};

/// Rings the terminal bell once per vibration pattern.
///
/// Pattern timings cannot be reproduced by a bell; only the occurrence of
/// the pulse is.  With `enabled == false` every call reports the capability
/// as unavailable.
#[derive(Debug, Clone)]
pub struct TerminalHaptics {
    enabled: bool,
}

impl TerminalHaptics {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl HapticsPlatform for TerminalHaptics {
    fn vibrate(&self, pattern: &VibrationPattern) -> Result<(), PlatformError> {
        if !self.enabled {
            return Err(PlatformError::Unavailable("vibration"));
        }
        log::debug!("haptics: pulse {:?} ({} ms)", pattern.0, pattern.total_ms());
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")
            .and_then(|()| err.flush())
            .map_err(|e| PlatformError::Haptics(e.to_string()))
    }
}

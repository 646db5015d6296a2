//! Frame timing from host timestamps

use crate::consts::{MAX_FRAME_MS, REFERENCE_FRAME_MS};

/// Turns successive animation-frame timestamps into clamped frame durations
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous call. The first call reports one reference frame.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let elapsed = match self.last_ms {
            Some(last) => (now_ms - last) as f32,
            None => REFERENCE_FRAME_MS,
        };
        self.last_ms = Some(now_ms);
        if elapsed.is_finite() {
            elapsed.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        }
    }

    /// Forget the previous timestamp (new game, tab regained focus)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

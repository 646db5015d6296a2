//! Pointer input
//!
//! Hosts report raw client coordinates; the simulation wants a point in the
//! unit square. Move events arrive far faster than frames on some devices, so
//! they pass through a leading-edge throttle that still delivers the last
//! position once the window closes.

use glam::Vec2;

use crate::consts::POINTER_THROTTLE_MS;

/// Client coordinates to `[0, 1]` on both axes. A degenerate viewport maps to the center.
pub fn normalize_pointer(client_x: f32, client_y: f32, width: f32, height: f32) -> Vec2 {
    let axis = |v: f32, extent: f32| {
        if extent > 0.0 && v.is_finite() {
            (v / extent).clamp(0.0, 1.0)
        } else {
            0.5
        }
    };
    Vec2::new(axis(client_x, width), axis(client_y, height))
}

#[derive(Debug, Clone)]
pub struct PointerThrottle {
    window_ms: f64,
    last_emit_ms: Option<f64>,
    pending: Option<Vec2>,
}

impl Default for PointerThrottle {
    fn default() -> Self {
        Self::new(POINTER_THROTTLE_MS)
    }
}

impl PointerThrottle {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_emit_ms: None,
            pending: None,
        }
    }

    /// Offer a new position at `now_ms`; returns it if it should be applied now
    pub fn offer(&mut self, now_ms: f64, pointer: Vec2) -> Option<Vec2> {
        match self.last_emit_ms {
            Some(last) if now_ms - last < self.window_ms => {
                self.pending = Some(pointer);
                None
            }
            _ => {
                self.last_emit_ms = Some(now_ms);
                self.pending = None;
                Some(pointer)
            }
        }
    }

    /// Trailing delivery: the newest held-back position, once the window has passed
    pub fn flush(&mut self, now_ms: f64) -> Option<Vec2> {
        let last = self.last_emit_ms?;
        if now_ms - last < self.window_ms {
            return None;
        }
        let pointer = self.pending.take()?;
        self.last_emit_ms = Some(now_ms);
        Some(pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_pointer(200.0, 150.0, 800.0, 600.0), Vec2::new(0.25, 0.25));
        assert_eq!(normalize_pointer(-10.0, 900.0, 800.0, 600.0), Vec2::new(0.0, 1.0));
        assert_eq!(normalize_pointer(10.0, 10.0, 0.0, 600.0).x, 0.5);
        assert_eq!(normalize_pointer(f32::NAN, 10.0, 800.0, 600.0).x, 0.5);
    }

    #[test]
    fn test_throttle_leading_and_trailing() {
        let mut throttle = PointerThrottle::new(10.0);
        let a = Vec2::new(0.1, 0.1);
        let b = Vec2::new(0.2, 0.2);
        let c = Vec2::new(0.3, 0.3);

        assert_eq!(throttle.offer(0.0, a), Some(a));
        assert_eq!(throttle.offer(3.0, b), None);
        assert_eq!(throttle.offer(6.0, c), None);
        assert_eq!(throttle.flush(8.0), None, "window still open");
        assert_eq!(throttle.flush(10.0), Some(c));
        assert_eq!(throttle.flush(30.0), None, "nothing pending");
        assert_eq!(throttle.offer(30.0, a), Some(a));
    }

    #[test]
    fn test_flush_before_any_event() {
        let mut throttle = PointerThrottle::default();
        assert_eq!(throttle.flush(100.0), None);
    }
}

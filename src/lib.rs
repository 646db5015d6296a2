//! Duel Shooter - a two-ship arcade duel
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, spawning, game flow)
//! - `platform`: Browser/native helpers for pointer input and frame timing
//! - `settings`: Data-driven game tuning and variant presets
//! - `error`: Configuration errors

pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{MotionMode, Settings, Variant};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal display refresh the per-frame motion values were tuned for
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Longest frame gap the host will report (tab switches, breakpoints)
    pub const MAX_FRAME_MS: f32 = 100.0;
    /// Pointer events closer together than this are dropped
    pub const POINTER_THROTTLE_MS: f64 = 10.0;

    /// Ship half-extents
    pub const SHIP_WIDTH: f32 = 20.0;
    pub const SHIP_HEIGHT: f32 = 20.0;

    /// Starting lives
    pub const PLAYER_LIVES: u32 = 3;
    pub const ENEMY_LIVES: u32 = 10;

    /// Explosion shapes (particle count, particle radius)
    pub const DEATH_EXPLOSION: (usize, f32) = (20, 4.0);
    pub const HIT_EXPLOSION: (usize, f32) = (10, 2.0);
    pub const BULLET_EXPLOSION: (usize, f32) = (20, 1.0);

    /// Initial particle velocity range per axis
    pub const PARTICLE_MAX_SPEED: f32 = 3.0;
    /// Default particle life lost per frame
    pub const PARTICLE_DECAY: f32 = 0.06;

    /// Store capacities
    pub const MAX_BULLETS: usize = 256;
    pub const MAX_EXPLOSIONS: usize = 128;
    pub const MAX_PARTICLES_PER_EXPLOSION: usize = 64;

    /// Ship colors
    pub const PLAYER_COLOR: &str = "#00ceed";
    pub const ENEMY_COLOR: &str = "#ff4747";
}

/// Clamp a point into an axis-aligned box given by its corners
#[inline]
pub fn clamp_vec(p: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    Vec2::new(p.x.max(min.x).min(max.x), p.y.max(min.y).min(max.y))
}

/// Uniformly sample `[lo, hi]`, tolerating a reversed or empty range
#[inline]
pub fn sample_range<R: rand::Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.random_range(lo..=hi)
    }
}

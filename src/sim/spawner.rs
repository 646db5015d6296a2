//! Timed bullet volleys
//!
//! The spawner accumulates wall-clock time independently of the frame count
//! and reports how many volleys are due. Firing direction comes from a small
//! strategy table keyed by the shooter's alignment.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::Rect;
use super::state::{Alignment, Bullet, Ship};
use crate::sample_range;

/// Upper bound on volleys released by one long frame
pub const MAX_VOLLEYS_PER_FRAME: u32 = 2;

/// How the firing angle is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConeStyle {
    /// Uniform over the cone that spans the opposite edge corner to corner
    Spread,
    /// Always straight across the arena
    Straight,
}

/// Axis a ship slides along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Direction rules for one alignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireProfile {
    /// Unit vector toward the opposite edge
    pub forward: Vec2,
    pub patrol: Axis,
}

impl FireProfile {
    pub fn for_alignment(alignment: Alignment) -> Self {
        match alignment {
            Alignment::Left => Self {
                forward: Vec2::X,
                patrol: Axis::Y,
            },
            Alignment::Right => Self {
                forward: Vec2::NEG_X,
                patrol: Axis::Y,
            },
            Alignment::Top => Self {
                forward: Vec2::Y,
                patrol: Axis::X,
            },
            Alignment::Bottom => Self {
                forward: Vec2::NEG_Y,
                patrol: Axis::X,
            },
        }
    }

    /// Unit vector opposite to the patrol axis; positive angles steer this way
    fn lateral(&self) -> Vec2 {
        match self.patrol {
            Axis::X => Vec2::NEG_X,
            Axis::Y => Vec2::NEG_Y,
        }
    }

    /// `(min, max)` angle of the cone from `pos` to the opposite edge's corners
    ///
    /// `max = atan(along / depth)`, `min = atan(-(extent - along) / depth)`
    /// where `along` is the offset on the patrol axis, `extent` the stage size
    /// on that axis and `depth` the stage size in the firing direction.
    pub fn cone(&self, pos: Vec2, stage: &Rect) -> (f32, f32) {
        let (along, extent, depth) = match self.patrol {
            Axis::Y => (pos.y - stage.top, stage.height(), stage.width()),
            Axis::X => (pos.x - stage.left, stage.width(), stage.height()),
        };
        if depth <= 0.0 {
            return (0.0, 0.0);
        }
        let max = (along / depth).atan();
        let min = (-(extent - along) / depth).atan();
        (min, max)
    }

    /// Velocity for a shot at `angle` (0 = straight across)
    pub fn velocity(&self, angle: f32, speed: f32) -> Vec2 {
        (self.forward * angle.cos() + self.lateral() * angle.sin()) * speed
    }
}

/// Interval timer for volleys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub interval_ms: f32,
    elapsed_ms: f32,
    running: bool,
}

impl Spawner {
    pub fn new(interval_ms: f32) -> Self {
        Self {
            interval_ms,
            elapsed_ms: 0.0,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.elapsed_ms = 0.0;
        self.running = true;
    }

    /// Cancel the interval; pending time is discarded
    pub fn stop(&mut self) {
        self.elapsed_ms = 0.0;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Add elapsed time and return the number of volleys now due
    pub fn advance(&mut self, elapsed_ms: f32) -> u32 {
        if !self.running || !(self.interval_ms > 0.0) || !elapsed_ms.is_finite() {
            return 0;
        }
        self.elapsed_ms += elapsed_ms.max(0.0);
        let due = (self.elapsed_ms / self.interval_ms).floor();
        self.elapsed_ms -= due * self.interval_ms;
        if due > MAX_VOLLEYS_PER_FRAME as f32 {
            log::debug!("spawner fell behind by {due} volleys, dropping extras");
        }
        (due as u32).min(MAX_VOLLEYS_PER_FRAME)
    }
}

/// Build the bullet `ship` fires now
pub fn fire<R: rand::Rng + ?Sized>(
    ship: &Ship,
    stage: &Rect,
    style: ConeStyle,
    speed: f32,
    radius: f32,
    rng: &mut R,
) -> Bullet {
    let profile = FireProfile::for_alignment(ship.alignment);
    let angle = match style {
        ConeStyle::Spread => {
            let (min, max) = profile.cone(ship.pos, stage);
            sample_range(rng, min, max)
        }
        ConeStyle::Straight => 0.0,
    };
    Bullet {
        pos: ship.pos,
        vel: profile.velocity(angle, speed),
        radius,
        alignment: ship.alignment,
        color: ship.color.clone(),
        is_dead: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{ShipStatus, Side};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ship(alignment: Alignment, pos: Vec2) -> Ship {
        Ship {
            side: Side::Player,
            pos,
            half_extent: Vec2::new(20.0, 20.0),
            alignment,
            color: "#00ceed".to_string(),
            lives: 3,
            status: ShipStatus::Active,
            is_hit: false,
        }
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_velocity_table() {
        let a = 0.3f32;
        let (s, c) = a.sin_cos();
        let left = FireProfile::for_alignment(Alignment::Left).velocity(a, 2.0);
        assert!(close(left, Vec2::new(2.0 * c, -2.0 * s)));
        let right = FireProfile::for_alignment(Alignment::Right).velocity(a, 2.0);
        assert!(close(right, Vec2::new(-2.0 * c, -2.0 * s)));
        let bottom = FireProfile::for_alignment(Alignment::Bottom).velocity(a, 2.0);
        assert!(close(bottom, Vec2::new(-2.0 * s, -2.0 * c)));
        let top = FireProfile::for_alignment(Alignment::Top).velocity(a, 2.0);
        assert!(close(top, Vec2::new(-2.0 * s, 2.0 * c)));
    }

    #[test]
    fn test_cone_reaches_opposite_corners() {
        let stage = Rect::from_size(800.0, 600.0);
        let profile = FireProfile::for_alignment(Alignment::Left);
        let pos = Vec2::new(20.0, 150.0);
        let (min, max) = profile.cone(pos, &stage);
        assert!((max - (150.0f32 / 800.0).atan()).abs() < 1e-6);
        assert!((min - (-450.0f32 / 800.0).atan()).abs() < 1e-6);

        // Crossing the stage depth at the extreme angles lands on the corners
        let top_shot = profile.velocity(max, 1.0);
        let at_far_edge = pos + top_shot * (800.0 / top_shot.x);
        assert!((at_far_edge.y - 0.0).abs() < 1e-2);
        let bottom_shot = profile.velocity(min, 1.0);
        let at_far_edge = pos + bottom_shot * (800.0 / bottom_shot.x);
        assert!((at_far_edge.y - 600.0).abs() < 1e-2);
    }

    #[test]
    fn test_straight_shot() {
        let stage = Rect::from_size(400.0, 700.0);
        let mut rng = Pcg32::seed_from_u64(1);
        let b = fire(
            &ship(Alignment::Top, Vec2::new(120.0, 20.0)),
            &stage,
            ConeStyle::Straight,
            5.0,
            4.0,
            &mut rng,
        );
        assert!(close(b.vel, Vec2::new(0.0, 5.0)));
        assert_eq!(b.pos, Vec2::new(120.0, 20.0));
        assert_eq!(b.alignment, Alignment::Top);
        assert_eq!(b.radius, 4.0);
    }

    #[test]
    fn test_spawner_interval() {
        let mut spawner = Spawner::new(100.0);
        assert_eq!(spawner.advance(500.0), 0, "stopped spawner never fires");
        spawner.start();
        assert_eq!(spawner.advance(60.0), 0);
        assert_eq!(spawner.advance(60.0), 1);
        assert_eq!(spawner.advance(60.0), 0);
        assert_eq!(spawner.advance(60.0), 1);
        assert_eq!(spawner.advance(1000.0), MAX_VOLLEYS_PER_FRAME);
        spawner.stop();
        assert_eq!(spawner.advance(1000.0), 0);
        assert!(!spawner.is_running());
    }

    proptest! {
        #[test]
        fn prop_spread_shots_head_for_the_opposite_edge(
            seed in any::<u64>(),
            t in 0.0f32..1.0,
            alignment in prop_oneof![
                Just(Alignment::Left),
                Just(Alignment::Right),
                Just(Alignment::Top),
                Just(Alignment::Bottom),
            ],
        ) {
            let stage = Rect::from_size(900.0, 500.0);
            let pos = match alignment {
                Alignment::Left => Vec2::new(20.0, 20.0 + t * 460.0),
                Alignment::Right => Vec2::new(880.0, 20.0 + t * 460.0),
                Alignment::Top => Vec2::new(20.0 + t * 860.0, 20.0),
                Alignment::Bottom => Vec2::new(20.0 + t * 860.0, 480.0),
            };
            let mut rng = Pcg32::seed_from_u64(seed);
            let b = fire(&ship(alignment, pos), &stage, ConeStyle::Spread, 3.0, 6.0, &mut rng);
            let forward = FireProfile::for_alignment(alignment).forward;
            prop_assert!(b.vel.dot(forward) > 0.0);
            prop_assert!((b.vel.length() - 3.0).abs() < 1e-3);
        }
    }
}

//! Game state and core simulation types
//!
//! Entities are plain data; the systems in `tick`, `collision` and `spawner`
//! operate on them through the explicit `GameState` passed to each call.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bounds::{ArenaBounds, Rect};
use super::spawner::Spawner;
use super::store::{Kinematics, Store};
use crate::consts::*;
use crate::sample_range;
use crate::settings::Settings;

/// Arena edge a ship patrols; bullets carry their shooter's alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Top,
    Bottom,
    Left,
    Right,
}

impl Alignment {
    pub fn opposite(&self) -> Self {
        match self {
            Alignment::Top => Alignment::Bottom,
            Alignment::Bottom => Alignment::Top,
            Alignment::Left => Alignment::Right,
            Alignment::Right => Alignment::Left,
        }
    }

    /// Left/Right ships slide along y, Top/Bottom ships along x
    pub fn patrols_vertically(&self) -> bool {
        matches!(self, Alignment::Left | Alignment::Right)
    }

    /// The side whose ship patrols this edge
    pub fn owner(&self) -> Side {
        match self {
            Alignment::Left | Alignment::Bottom => Side::Player,
            Alignment::Top | Alignment::Right => Side::Enemy,
        }
    }

    /// The side a bullet with this alignment can damage
    pub fn target_side(&self) -> Side {
        self.owner().opponent()
    }
}

/// Which combatant an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Player, Side::Enemy];

    pub fn opponent(&self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }

    /// Edge this side patrols for the given orientation
    pub fn alignment(&self, landscape: bool) -> Alignment {
        let player = if landscape {
            Alignment::Left
        } else {
            Alignment::Bottom
        };
        match self {
            Side::Player => player,
            Side::Enemy => player.opposite(),
        }
    }
}

/// Ship lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipStatus {
    /// Lives remaining, moving and shooting
    Active,
    /// Lives hit zero this frame; death explosion not yet spawned
    Destroyed,
    /// Death explosion spawned; waiting for the aftermath to clear
    Retired,
}

/// A combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub side: Side,
    pub pos: Vec2,
    /// Half-extents of the body
    pub half_extent: Vec2,
    pub alignment: Alignment,
    pub color: String,
    /// Never increases
    pub lives: u32,
    pub status: ShipStatus,
    /// Set by a hit, cleared once the hit explosion is spawned
    pub is_hit: bool,
}

impl Ship {
    /// Place a ship on its edge, centered along the patrol axis
    pub fn new(side: Side, settings: &Settings, arena: &ArenaBounds) -> Self {
        let alignment = side.alignment(settings.is_landscape());
        let ship = arena.ship;
        let mid = Vec2::new(
            (arena.stage.left + arena.stage.right) * 0.5,
            (arena.stage.top + arena.stage.bottom) * 0.5,
        );
        let pos = match alignment {
            Alignment::Left => Vec2::new(ship.left, mid.y),
            Alignment::Right => Vec2::new(ship.right, mid.y),
            Alignment::Top => Vec2::new(mid.x, ship.top),
            Alignment::Bottom => Vec2::new(mid.x, ship.bottom),
        };
        let (lives, color) = match side {
            Side::Player => (settings.player_lives, settings.player_color.clone()),
            Side::Enemy => (settings.enemy_lives, settings.enemy_color.clone()),
        };
        Self {
            side,
            pos: ship.clamp(pos),
            half_extent: Vec2::new(settings.ship_width, settings.ship_height),
            alignment,
            color,
            lives,
            status: ShipStatus::Active,
            is_hit: false,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ShipStatus::Active
    }

    /// Destroyed or retired; a dead ship never fires
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.status != ShipStatus::Active
    }

    #[inline]
    pub fn is_retired(&self) -> bool {
        self.status == ShipStatus::Retired
    }

    /// Apply one hit. Ships that are no longer active are immune.
    pub fn take_hit(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.is_hit = true;
        if self.lives == 0 {
            self.status = ShipStatus::Destroyed;
        }
        true
    }

    /// Mark the death explosion as spawned
    pub fn retire(&mut self) {
        if self.status == ShipStatus::Destroyed {
            self.status = ShipStatus::Retired;
        }
    }

    /// Follow the normalized pointer along the patrol axis, clamped to `bounds`
    pub fn track(&mut self, pointer: Vec2, stage: &Rect, bounds: &Rect) {
        let mut target = self.pos;
        if self.alignment.patrols_vertically() {
            target.y = stage.top + pointer.y * stage.height();
        } else {
            target.x = stage.left + pointer.x * stage.width();
        }
        // NaN pointer input keeps the last good position
        if target.is_finite() {
            self.pos = bounds.clamp(target);
        } else {
            self.pos = bounds.clamp(self.pos);
        }
    }
}

/// Both combatants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ships {
    pub player: Ship,
    pub enemy: Ship,
}

impl Ships {
    pub fn new(settings: &Settings, arena: &ArenaBounds) -> Self {
        Self {
            player: Ship::new(Side::Player, settings, arena),
            enemy: Ship::new(Side::Enemy, settings, arena),
        }
    }

    pub fn get(&self, side: Side) -> &Ship {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Ship {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ship> {
        [&self.player, &self.enemy].into_iter()
    }

    pub fn both_active(&self) -> bool {
        self.player.is_active() && self.enemy.is_active()
    }
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Alignment of the ship that fired it
    pub alignment: Alignment,
    pub color: String,
    pub is_dead: bool,
}

impl Kinematics for Bullet {
    /// Kill boundary
    type Env = Rect;

    /// Move unless the next position leaves the bounds, in which case die in place
    fn step(&mut self, bounds: &Rect, scale: f32) {
        if self.is_dead {
            return;
        }
        let next = self.pos + self.vel * scale;
        if bounds.contains(next) {
            self.pos = next;
        } else {
            self.is_dead = true;
        }
    }

    fn is_alive(&self) -> bool {
        !self.is_dead
    }
}

/// Context for particle motion
#[derive(Debug, Clone, Copy)]
pub struct ParticleEnv {
    /// Edges particles bounce off
    pub stage: Rect,
    /// Life lost per frame
    pub decay: f32,
}

/// A particle for explosion effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: String,
    /// Starts at 1.0; the particle is removed once negative
    pub time_to_live: f32,
}

impl Kinematics for Particle {
    type Env = ParticleEnv;

    fn step(&mut self, env: &ParticleEnv, scale: f32) {
        let next = self.pos + self.vel * scale;
        if next.y + self.radius > env.stage.bottom || next.y <= env.stage.top {
            self.vel.y = -self.vel.y;
        }
        if next.x + self.radius > env.stage.right || next.x <= env.stage.left {
            self.vel.x = -self.vel.x;
        }
        self.pos += self.vel * scale;
        self.time_to_live -= env.decay * scale;
    }

    fn is_alive(&self) -> bool {
        self.time_to_live >= 0.0
    }
}

/// A burst of particles; alive while any particle is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub origin: Vec2,
    pub color: String,
    pub particle_count: usize,
    pub particle_size: f32,
    pub particles: Store<Particle>,
}

impl Explosion {
    /// Spawn `count` particles at `origin` with velocities in [-3, 3] per axis
    pub fn new<R: rand::Rng + ?Sized>(
        origin: Vec2,
        color: &str,
        count: usize,
        size: f32,
        rng: &mut R,
    ) -> Self {
        let count = count.min(MAX_PARTICLES_PER_EXPLOSION);
        let mut particles = Store::with_limit(MAX_PARTICLES_PER_EXPLOSION);
        for _ in 0..count {
            let vel = Vec2::new(
                sample_range(rng, -PARTICLE_MAX_SPEED, PARTICLE_MAX_SPEED),
                sample_range(rng, -PARTICLE_MAX_SPEED, PARTICLE_MAX_SPEED),
            );
            particles.add(Particle {
                pos: origin,
                vel,
                radius: size,
                color: color.to_string(),
                time_to_live: 1.0,
            });
        }
        Self {
            origin,
            color: color.to_string(),
            particle_count: count,
            particle_size: size,
            particles,
        }
    }
}

impl Kinematics for Explosion {
    type Env = ParticleEnv;

    fn step(&mut self, env: &ParticleEnv, scale: f32) {
        self.particles.update_all(env, scale);
        self.particles.compact();
    }

    fn is_alive(&self) -> bool {
        !self.particles.is_empty()
    }
}

/// Final outcome from the player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Won,
    Lost,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::Won => "won",
            GameResult::Lost => "lost",
        }
    }
}

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting on the start menu
    NotStarted,
    /// Simulation running
    Playing,
    /// Aftermath cleared and a winner declared
    Ended(GameResult),
}

/// Things that happened during a tick, drained by the controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BulletFired { side: Side },
    ShipHit { side: Side, lives_left: u32 },
    ShipDestroyed { side: Side },
    GameOver { result: GameResult },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub arena: ArenaBounds,
    pub phase: GamePhase,
    pub ships: Ships,
    pub bullets: Store<Bullet>,
    pub explosions: Store<Explosion>,
    pub spawner: Spawner,
    /// Frames simulated since start
    pub frame: u64,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
}

impl GameState {
    /// Fresh state for `settings`, not yet playing
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let arena = ArenaBounds::from_settings(settings);
        Self {
            settings: settings.clone(),
            arena,
            phase: GamePhase::NotStarted,
            ships: Ships::new(settings, &arena),
            bullets: Store::with_limit(MAX_BULLETS),
            explosions: Store::with_limit(MAX_EXPLOSIONS),
            spawner: Spawner::new(settings.spawn_interval_ms),
            frame: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Context particles are stepped with
    pub fn particle_env(&self) -> ParticleEnv {
        ParticleEnv {
            stage: self.arena.stage,
            decay: self.settings.particle_decay,
        }
    }

    /// Spawn an explosion of the given (particle count, particle size)
    pub fn add_explosion(&mut self, origin: Vec2, color: &str, shape: (usize, f32)) {
        add_explosion(&mut self.explosions, &mut self.rng, origin, color, shape);
    }

    /// Total live particles across all explosions
    pub fn particle_count(&self) -> usize {
        self.explosions.iter().map(|e| e.particles.len()).sum()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Explosion spawn that borrows only the pieces it touches
pub(crate) fn add_explosion(
    explosions: &mut Store<Explosion>,
    rng: &mut Pcg32,
    origin: Vec2,
    color: &str,
    (count, size): (usize, f32),
) {
    explosions.add(Explosion::new(origin, color, count, size, rng));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Variant;
    use proptest::prelude::*;

    fn landscape() -> Settings {
        Settings::for_viewport(800.0, 600.0, Variant::Classic)
    }

    #[test]
    fn test_bullets_threaten_only_the_opponent() {
        for landscape in [true, false] {
            for side in Side::BOTH {
                let alignment = side.alignment(landscape);
                assert_eq!(alignment.owner(), side);
                assert_eq!(alignment.target_side(), side.opponent());
                assert_eq!(side.opponent().alignment(landscape), alignment.opposite());
            }
        }
        assert_eq!(Side::Enemy.alignment(true), Alignment::Right);
        assert_eq!(Side::Enemy.alignment(false), Alignment::Top);
    }

    #[test]
    fn test_ship_placement_landscape() {
        let settings = landscape();
        let state = GameState::new(&settings, 1);
        assert_eq!(state.ships.player.alignment, Alignment::Left);
        assert_eq!(state.ships.enemy.alignment, Alignment::Right);
        assert_eq!(state.ships.player.pos, Vec2::new(20.0, 300.0));
        assert_eq!(state.ships.enemy.pos, Vec2::new(780.0, 300.0));
        assert_eq!(state.ships.player.lives, 3);
        assert_eq!(state.ships.enemy.lives, 10);
    }

    #[test]
    fn test_ship_placement_portrait() {
        let settings = Settings::for_viewport(400.0, 700.0, Variant::Classic);
        let state = GameState::new(&settings, 1);
        assert_eq!(state.ships.player.alignment, Alignment::Bottom);
        assert_eq!(state.ships.enemy.alignment, Alignment::Top);
        assert_eq!(state.ships.player.pos, Vec2::new(200.0, 680.0));
        assert_eq!(state.ships.enemy.pos, Vec2::new(200.0, 20.0));
    }

    #[test]
    fn test_take_hit_until_destroyed() {
        let settings = landscape();
        let mut state = GameState::new(&settings, 1);
        let ship = &mut state.ships.player;
        assert!(ship.take_hit());
        assert!(ship.is_hit);
        assert!(ship.take_hit());
        assert!(ship.take_hit());
        assert_eq!(ship.lives, 0);
        assert_eq!(ship.status, ShipStatus::Destroyed);
        // Immune once destroyed
        assert!(!ship.take_hit());
        assert_eq!(ship.lives, 0);
        ship.retire();
        assert!(ship.is_retired());
        assert!(!ship.take_hit());
    }

    #[test]
    fn test_bullet_dies_at_bounds_without_moving() {
        let bounds = Rect::from_size(100.0, 100.0).inset(6.0, 6.0);
        let mut bullet = Bullet {
            pos: Vec2::new(85.0, 50.0),
            vel: Vec2::new(5.0, 0.0),
            radius: 6.0,
            alignment: Alignment::Left,
            color: PLAYER_COLOR.to_string(),
            is_dead: false,
        };
        bullet.step(&bounds, 1.0);
        assert_eq!(bullet.pos, Vec2::new(90.0, 50.0));
        assert!(bullet.is_alive());
        // 95 is past the right edge at 94
        bullet.step(&bounds, 1.0);
        assert!(!bullet.is_alive());
        assert_eq!(bullet.pos, Vec2::new(90.0, 50.0));
    }

    #[test]
    fn test_particle_bounces_off_edges() {
        let env = ParticleEnv {
            stage: Rect::from_size(100.0, 100.0),
            decay: 0.06,
        };
        let mut p = Particle {
            pos: Vec2::new(1.0, 50.0),
            vel: Vec2::new(-3.0, 0.0),
            radius: 2.0,
            color: ENEMY_COLOR.to_string(),
            time_to_live: 1.0,
        };
        p.step(&env, 1.0);
        assert_eq!(p.vel.x, 3.0);
        assert_eq!(p.pos.x, 4.0);
        assert!((p.time_to_live - 0.94).abs() < 1e-6);
    }

    #[test]
    fn test_particle_bounces_off_bottom_with_radius() {
        let env = ParticleEnv {
            stage: Rect::from_size(100.0, 100.0),
            decay: 0.06,
        };
        let mut p = Particle {
            pos: Vec2::new(50.0, 95.0),
            vel: Vec2::new(0.0, 2.0),
            radius: 4.0,
            color: ENEMY_COLOR.to_string(),
            time_to_live: 1.0,
        };
        p.step(&env, 1.0);
        assert_eq!(p.vel.y, -2.0);
        assert_eq!(p.pos.y, 93.0);
    }

    #[test]
    fn test_explosion_particle_count_is_capped() {
        let mut rng = Pcg32::seed_from_u64(3);
        let e = Explosion::new(Vec2::ZERO, "#fff", 10_000, 1.0, &mut rng);
        assert_eq!(e.particles.len(), MAX_PARTICLES_PER_EXPLOSION);
        assert_eq!(e.particle_count, MAX_PARTICLES_PER_EXPLOSION);
    }

    proptest! {
        #[test]
        fn prop_explosion_drains_in_bounded_frames(
            count in 0usize..40,
            size in 0.5f32..5.0,
            seed in any::<u64>(),
            x in 0.0f32..800.0,
            y in 0.0f32..600.0,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let env = ParticleEnv { stage: Rect::from_size(800.0, 600.0), decay: PARTICLE_DECAY };
            let mut explosion = Explosion::new(Vec2::new(x, y), "#abc", count, size, &mut rng);
            prop_assert_eq!(explosion.particles.len(), count);
            for v in explosion.particles.iter().map(|p| p.vel) {
                prop_assert!(v.x.abs() <= PARTICLE_MAX_SPEED && v.y.abs() <= PARTICLE_MAX_SPEED);
            }

            let max_frames = (1.0 / PARTICLE_DECAY).ceil() as usize + 1;
            let mut last = explosion.particles.len();
            for _ in 0..max_frames {
                explosion.step(&env, 1.0);
                prop_assert!(explosion.particles.len() <= last);
                last = explosion.particles.len();
            }
            prop_assert!(!explosion.is_alive());
        }

        #[test]
        fn prop_ship_track_stays_in_bounds(
            px in -1.0e6f32..1.0e6,
            py in -1.0e6f32..1.0e6,
            landscape in any::<bool>(),
        ) {
            let settings = if landscape {
                Settings::for_viewport(1024.0, 640.0, Variant::Classic)
            } else {
                Settings::for_viewport(480.0, 900.0, Variant::Classic)
            };
            let mut state = GameState::new(&settings, 0);
            let arena = state.arena;
            for side in Side::BOTH {
                let ship = state.ships.get_mut(side);
                ship.track(Vec2::new(px, py), &arena.stage, &arena.ship);
                prop_assert!(arena.ship.contains(ship.pos));
            }
        }
    }
}

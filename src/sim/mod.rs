//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (insertion order in every store)
//! - No rendering or platform dependencies

pub mod bounds;
pub mod collision;
pub mod controller;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod store;
pub mod tick;

pub use bounds::{ArenaBounds, Rect};
pub use collision::{check_collision, envelope, strikes};
pub use controller::{EndHook, Game};
pub use snapshot::{CircleView, ShipView, Snapshot};
pub use spawner::{ConeStyle, FireProfile, Spawner, fire};
pub use state::{
    Alignment, Bullet, Explosion, GameEvent, GamePhase, GameResult, GameState, Particle,
    ParticleEnv, Ship, ShipStatus, Ships, Side,
};
pub use store::{Kinematics, Store};
pub use tick::{TickInput, terminal_result, tick};

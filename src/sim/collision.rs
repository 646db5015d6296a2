//! Bullet vs ship hit testing
//!
//! A bullet does not need to overlap the ship. It only has to cross the
//! defender's strike line: the envelope edge facing the shooter, while staying
//! within the envelope's span on the perpendicular axis.

use glam::Vec2;

use super::bounds::Rect;
use super::state::{Alignment, Bullet, Ship, Ships};

/// Ship center ± (half-extent + bullet radius) on both axes
pub fn envelope(ship: &Ship, bullet_radius: f32) -> Rect {
    let reach = ship.half_extent + Vec2::splat(bullet_radius);
    Rect {
        top: ship.pos.y - reach.y,
        bottom: ship.pos.y + reach.y,
        left: ship.pos.x - reach.x,
        right: ship.pos.x + reach.x,
    }
}

/// Pure half-plane test for a bullet fired from `alignment`. Edges are inclusive.
pub fn strikes(pos: Vec2, alignment: Alignment, env: &Rect) -> bool {
    let within_x = pos.x >= env.left && pos.x <= env.right;
    let within_y = pos.y >= env.top && pos.y <= env.bottom;
    match alignment {
        Alignment::Top => pos.y >= env.top && within_x,
        Alignment::Bottom => pos.y <= env.bottom && within_x,
        Alignment::Left => pos.x >= env.left && within_y,
        Alignment::Right => pos.x <= env.right && within_y,
    }
}

/// Test `bullet` against the ship it threatens and apply the hit.
///
/// Returns true when the target lost a life. Targets that are no longer
/// active never register hits.
pub fn check_collision(bullet: &Bullet, ships: &mut Ships) -> bool {
    let target = ships.get_mut(bullet.alignment.target_side());
    if !target.is_active() {
        return false;
    }
    let env = envelope(target, bullet.radius);
    strikes(bullet.pos, bullet.alignment, &env) && target.take_hit()
}

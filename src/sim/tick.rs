//! Per-frame simulation step
//!
//! One call per display refresh. Order matters:
//! 1. declare the winner once a ship is retired and every explosion is gone
//! 2. turn destroyed ships into death explosions
//! 3. move active ships and burst their hit explosions
//! 4. fire due volleys, move bullets, resolve hits (only while both ships fly)
//! 5. advance explosions and drop the empty ones

use glam::Vec2;

use super::collision::check_collision;
use super::spawner::fire;
use super::state::{GameEvent, GamePhase, GameResult, GameState, ShipStatus, Side, add_explosion};
use super::store::Kinematics;
use crate::consts::*;
use crate::settings::EnemyTracking;

/// Input for a single frame
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Latest pointer position, normalized to the viewport
    pub pointer: Vec2,
    /// Wall-clock time since the previous frame
    pub elapsed_ms: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            pointer: Vec2::splat(0.5),
            elapsed_ms: REFERENCE_FRAME_MS,
        }
    }
}

/// Winner once the aftermath has cleared, checked player first
pub fn terminal_result(state: &GameState) -> Option<GameResult> {
    if !state.explosions.is_empty() {
        return None;
    }
    if state.ships.player.is_retired() {
        Some(GameResult::Lost)
    } else if state.ships.enemy.is_retired() {
        Some(GameResult::Won)
    } else {
        None
    }
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.phase != GamePhase::Playing {
        return;
    }

    // 1. Terminal condition
    if let Some(result) = terminal_result(state) {
        log::info!("Game over after {} frames: {}", state.frame, result.as_str());
        state.phase = GamePhase::Ended(result);
        state.spawner.stop();
        state.events.push(GameEvent::GameOver { result });
        return;
    }

    state.frame += 1;
    let elapsed_ms = if input.elapsed_ms.is_finite() {
        input.elapsed_ms.clamp(0.0, MAX_FRAME_MS)
    } else {
        0.0
    };
    let scale = state.settings.motion_scale(elapsed_ms);
    let tracking = state.settings.variant.enemy_tracking();

    let GameState {
        settings,
        arena,
        ships,
        bullets,
        explosions,
        spawner,
        events,
        rng,
        ..
    } = state;

    // 2 + 3. Ships
    for side in Side::BOTH {
        let ship = ships.get_mut(side);
        match ship.status {
            ShipStatus::Destroyed => {
                add_explosion(explosions, rng, ship.pos, &ship.color, DEATH_EXPLOSION);
                ship.retire();
                log::info!("{side:?} ship destroyed");
                events.push(GameEvent::ShipDestroyed { side });
            }
            ShipStatus::Active => {
                let pointer = match (side, tracking) {
                    (Side::Enemy, EnemyTracking::Mirrored) => Vec2::ONE - input.pointer,
                    _ => input.pointer,
                };
                ship.track(pointer, &arena.stage, &arena.ship);
                if ship.is_hit {
                    add_explosion(explosions, rng, ship.pos, &ship.color, HIT_EXPLOSION);
                    ship.is_hit = false;
                }
            }
            ShipStatus::Retired => {}
        }
    }

    // 4. Bullets
    if ships.both_active() {
        let volleys = spawner.advance(elapsed_ms);
        let style = settings.variant.cone_style();
        for _ in 0..volleys {
            for side in Side::BOTH {
                let ship = ships.get(side);
                if ship.is_dead() {
                    continue;
                }
                let bullet = fire(
                    ship,
                    &arena.stage,
                    style,
                    settings.bullet_speed,
                    settings.bullet_radius,
                    rng,
                );
                bullets.add(bullet);
                events.push(GameEvent::BulletFired { side });
            }
        }

        for bullet in bullets.iter_mut() {
            bullet.step(&arena.bullet, scale);
            // A hit wins over leaving the bounds on the same frame
            let hit = check_collision(bullet, ships);
            if hit {
                let side = bullet.alignment.target_side();
                events.push(GameEvent::ShipHit {
                    side,
                    lives_left: ships.get(side).lives,
                });
            }
            if hit || bullet.is_dead {
                bullet.is_dead = true;
                add_explosion(explosions, rng, bullet.pos, &bullet.color, BULLET_EXPLOSION);
            }
        }
        bullets.compact();
    }

    // 5. Explosions
    let env = state.particle_env();
    state.explosions.update_all(&env, scale);
    state.explosions.compact();
}

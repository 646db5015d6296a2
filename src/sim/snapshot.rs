//! Read-only view of a frame for the presentation layer
//!
//! Borrowed from the state, so taking one per frame allocates only the vectors.

use serde::Serialize;

use super::state::{Alignment, GamePhase, GameResult, GameState, Side};

#[derive(Debug, Clone, Serialize)]
pub struct ShipView<'a> {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub alignment: Alignment,
    pub color: &'a str,
    pub lives: u32,
}

/// Anything drawn as a filled circle
#[derive(Debug, Clone, Serialize)]
pub struct CircleView<'a> {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: &'a str,
    /// 1.0 for bullets, remaining life for particles
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub frame: u64,
    pub phase: GamePhase,
    pub result: Option<GameResult>,
    pub width: f32,
    pub height: f32,
    /// Ships still in play (destroyed ships are shown only as their explosion)
    pub ships: Vec<ShipView<'a>>,
    pub bullets: Vec<CircleView<'a>>,
    pub particles: Vec<CircleView<'a>>,
}

impl<'a> Snapshot<'a> {
    pub fn capture(state: &'a GameState) -> Self {
        let ships = state
            .ships
            .iter()
            .filter(|s| s.is_active())
            .map(|s| ShipView {
                side: s.side,
                x: s.pos.x,
                y: s.pos.y,
                width: s.half_extent.x,
                height: s.half_extent.y,
                alignment: s.alignment,
                color: &s.color,
                lives: s.lives,
            })
            .collect();

        // Bullets freeze once a ship goes down; they are not drawn
        let bullets = if state.ships.both_active() {
            state
                .bullets
                .iter()
                .map(|b| CircleView {
                    x: b.pos.x,
                    y: b.pos.y,
                    radius: b.radius,
                    color: &b.color,
                    alpha: 1.0,
                })
                .collect()
        } else {
            Vec::new()
        };

        let particles = state
            .explosions
            .iter()
            .flat_map(|e| e.particles.iter())
            .map(|p| CircleView {
                x: p.pos.x,
                y: p.pos.y,
                radius: p.radius,
                color: &p.color,
                alpha: p.time_to_live.clamp(0.0, 1.0),
            })
            .collect();

        let result = match state.phase {
            GamePhase::Ended(result) => Some(result),
            _ => None,
        };

        Self {
            frame: state.frame,
            phase: state.phase,
            result,
            width: state.arena.stage.width(),
            height: state.arena.stage.height(),
            ships,
            bullets,
            particles,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::{Settings, Variant};
    use crate::sim::state::ShipStatus;
    use glam::Vec2;

    #[test]
    fn test_capture_fresh_state() {
        let settings = Settings::for_viewport(800.0, 600.0, Variant::Classic);
        let state = GameState::new(&settings, 5);
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.ships.len(), 2);
        assert_eq!(snap.ships[0].color, PLAYER_COLOR);
        assert_eq!(snap.ships[1].lives, ENEMY_LIVES);
        assert!(snap.bullets.is_empty());
        assert!(snap.particles.is_empty());
        assert_eq!(snap.result, None);
    }

    #[test]
    fn test_destroyed_ship_hidden_and_particles_listed() {
        let settings = Settings::for_viewport(800.0, 600.0, Variant::Classic);
        let mut state = GameState::new(&settings, 5);
        state.ships.enemy.lives = 0;
        state.ships.enemy.status = ShipStatus::Retired;
        state.add_explosion(Vec2::new(10.0, 10.0), ENEMY_COLOR, DEATH_EXPLOSION);

        let snap = Snapshot::capture(&state);
        assert_eq!(snap.ships.len(), 1);
        assert_eq!(snap.ships[0].side, Side::Player);
        assert_eq!(snap.particles.len(), DEATH_EXPLOSION.0);
        assert!(snap.particles.iter().all(|p| p.radius == DEATH_EXPLOSION.1));
    }

    #[test]
    fn test_json_shape() {
        let settings = Settings::default();
        let state = GameState::new(&settings, 5);
        let json = Snapshot::capture(&state).to_json().expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["phase"], "NotStarted");
        assert_eq!(value["ships"][0]["alignment"], "Left");
        assert!(value["result"].is_null());
    }
}

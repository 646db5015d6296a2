//! Game settings and tuning
//!
//! Every number the simulation needs is derived here from the viewport and
//! the selected variant. Hosts may override any field through JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::spawner::ConeStyle;

/// Rule set for one flavour of the duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Spread shots toward the opposite edge, both ships follow the pointer
    #[default]
    Classic,
    /// Straight shots, the enemy mirrors the pointer
    Mirror,
    /// Smaller, faster and more frequent shots
    Rapid,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Mirror => "Mirror",
            Variant::Rapid => "Rapid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "shooter" => Some(Variant::Classic),
            "mirror" | "v1" => Some(Variant::Mirror),
            "rapid" | "v2" => Some(Variant::Rapid),
            _ => None,
        }
    }

    /// How the firing angle is chosen
    pub fn cone_style(&self) -> ConeStyle {
        match self {
            Variant::Classic | Variant::Rapid => ConeStyle::Spread,
            Variant::Mirror => ConeStyle::Straight,
        }
    }

    /// How the enemy ship follows the pointer
    pub fn enemy_tracking(&self) -> EnemyTracking {
        match self {
            Variant::Classic | Variant::Rapid => EnemyTracking::Shared,
            Variant::Mirror => EnemyTracking::Mirrored,
        }
    }
}

/// Which pointer coordinate the enemy ship follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyTracking {
    /// Same coordinate as the player
    Shared,
    /// `1 - coordinate`, so the enemy moves opposite to the player
    Mirrored,
}

/// How per-frame velocities relate to elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MotionMode {
    /// Velocities are applied once per frame; speed depends on refresh rate
    #[default]
    PerFrame,
    /// Velocities are scaled by elapsed time relative to a 60 Hz frame
    Scaled,
}

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub variant: Variant,
    pub motion: MotionMode,

    // === Arena ===
    pub stage_width: f32,
    pub stage_height: f32,

    // === Ships ===
    /// Half-extents of a ship body
    pub ship_width: f32,
    pub ship_height: f32,
    pub player_lives: u32,
    pub enemy_lives: u32,
    pub player_color: String,
    pub enemy_color: String,

    // === Bullets ===
    pub bullet_radius: f32,
    /// Distance travelled per frame
    pub bullet_speed: f32,
    /// Wall-clock time between volleys
    pub spawn_interval_ms: f32,

    // === Effects ===
    /// Particle life lost per frame (particles start at 1.0)
    pub particle_decay: f32,

    /// RNG seed for spawn angles and explosion spread
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_viewport(1280.0, 720.0, Variant::Classic)
    }
}

impl Settings {
    /// Derive tuning for a viewport, the way the variant scales with screen size
    pub fn for_viewport(width: f32, height: f32, variant: Variant) -> Self {
        let ratio = if height > 0.0 { width / height } else { 1.0 };
        let landscape = ratio > 1.0;
        let along = if landscape { width } else { height };

        let (bullet_radius, bullet_speed, spawn_interval_ms) = match variant {
            Variant::Classic => {
                let speed = if landscape {
                    0.002 * width * ratio
                } else {
                    0.008 * height * ratio
                };
                let interval = if landscape { 0.15 * width } else { 0.55 * height };
                (6.0, speed, interval)
            }
            Variant::Mirror => (4.0, 0.003 * along, 200.0),
            Variant::Rapid => {
                let interval = if landscape { 0.07 * width } else { 0.2 * height };
                (4.0, 0.01 * along, interval)
            }
        };

        Self {
            variant,
            motion: MotionMode::PerFrame,
            stage_width: width,
            stage_height: height,
            ship_width: SHIP_WIDTH,
            ship_height: SHIP_HEIGHT,
            player_lives: PLAYER_LIVES,
            enemy_lives: ENEMY_LIVES,
            player_color: PLAYER_COLOR.to_string(),
            enemy_color: ENEMY_COLOR.to_string(),
            bullet_radius,
            bullet_speed,
            spawn_interval_ms,
            particle_decay: PARTICLE_DECAY,
            seed: 0,
        }
    }

    /// Landscape viewports duel left vs right, portrait ones bottom vs top
    pub fn is_landscape(&self) -> bool {
        self.stage_width > self.stage_height
    }

    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply a partial JSON override on top of these settings.
    ///
    /// The variant preset is rebuilt for the (possibly overridden) stage size,
    /// so changing the variant also changes its derived tuning. The seed and
    /// motion mode carry over. Keys present in `json` win over everything else.
    pub fn with_overrides(&self, json: &str) -> Result<Self, ConfigError> {
        let overrides: Map<String, Value> = serde_json::from_str(json)?;
        let field = |key: &str| overrides.get(key).cloned();

        let variant = match field("variant") {
            Some(v) => serde_json::from_value(v)?,
            None => self.variant,
        };
        let width = match field("stage_width") {
            Some(v) => serde_json::from_value(v)?,
            None => self.stage_width,
        };
        let height = match field("stage_height") {
            Some(v) => serde_json::from_value(v)?,
            None => self.stage_height,
        };

        let mut base = Settings::for_viewport(width, height, variant);
        base.seed = self.seed;
        base.motion = self.motion;

        let mut merged = serde_json::to_value(&base)?;
        if let Value::Object(map) = &mut merged {
            map.extend(overrides);
        }
        let settings: Settings = serde_json::from_value(merged)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject values that would make the arena degenerate
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = (self.stage_width, self.stage_height);
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(ConfigError::StageSize {
                width: w,
                height: h,
            });
        }
        for (field, value) in [
            ("ship_width", self.ship_width),
            ("ship_height", self.ship_height),
            ("bullet_radius", self.bullet_radius),
            ("bullet_speed", self.bullet_speed),
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("particle_decay", self.particle_decay),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.ship_width * 2.0 > w || self.ship_height * 2.0 > h {
            return Err(ConfigError::ShipTooLarge {
                half_width: self.ship_width,
                half_height: self.ship_height,
            });
        }
        if self.player_lives == 0 {
            return Err(ConfigError::NoLives {
                field: "player_lives",
            });
        }
        if self.enemy_lives == 0 {
            return Err(ConfigError::NoLives {
                field: "enemy_lives",
            });
        }
        Ok(())
    }

    /// Motion multiplier for a frame that took `elapsed_ms`
    pub fn motion_scale(&self, elapsed_ms: f32) -> f32 {
        match self.motion {
            MotionMode::PerFrame => 1.0,
            MotionMode::Scaled => {
                (elapsed_ms / REFERENCE_FRAME_MS).clamp(0.0, MAX_FRAME_MS / REFERENCE_FRAME_MS)
            }
        }
    }
}

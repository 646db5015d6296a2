//! Rectangular constraint regions
//!
//! Screen coordinates: `top < bottom`, `left < right`, y grows downward.
//! - stage: the full viewport
//! - ship: stage inset by the ship half-extents (clamp limits)
//! - bullet: stage inset by the bullet radius (kill boundary)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_vec;
use crate::settings::Settings;

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Rect {
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            top: 0.0,
            bottom: height,
            left: 0.0,
            right: width,
        }
    }

    /// Shrink by `dx` on the left/right edges and `dy` on the top/bottom edges
    pub fn inset(&self, dx: f32, dy: f32) -> Self {
        Self {
            top: self.top + dy,
            bottom: self.bottom - dy,
            left: self.left + dx,
            right: self.right - dx,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Nearest point inside the rectangle
    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        clamp_vec(
            p,
            Vec2::new(self.left, self.top),
            Vec2::new(self.right, self.bottom),
        )
    }
}

/// The three regions every moving entity is checked against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub stage: Rect,
    pub ship: Rect,
    pub bullet: Rect,
}

impl ArenaBounds {
    pub fn new(width: f32, height: f32, ship_half: Vec2, bullet_radius: f32) -> Self {
        let stage = Rect::from_size(width, height);
        Self {
            stage,
            ship: stage.inset(ship_half.x, ship_half.y),
            bullet: stage.inset(bullet_radius, bullet_radius),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.stage_width,
            settings.stage_height,
            Vec2::new(settings.ship_width, settings.ship_height),
            settings.bullet_radius,
        )
    }
}

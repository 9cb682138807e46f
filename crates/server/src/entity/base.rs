//! Shared entity data and capabilities.

use glam::Vec2;
use protocol::Color;

/// Radius of an entity with the given score.
///
/// `score` below zero counts as zero.
#[inline]
pub fn radius_for_score(base_radius: f32, score: f32) -> f32 {
    base_radius + score.max(0.0).sqrt() * 2.0
}

/// Common data shared by players and bots.
///
/// `radius` is derived from `score` and only changes through [`EntityData::set_score`].
#[derive(Debug, Clone)]
pub struct EntityData {
    /// Connection id for players, assigned id for bots.
    pub id: u32,
    /// Position in world coordinates.
    pub position: Vec2,
    pub color: Color,
    pub name: String,
    base_radius: f32,
    score: f32,
    radius: f32,
}

impl EntityData {
    /// Create entity data with score 0.
    pub fn new(id: u32, position: Vec2, base_radius: f32, color: Color, name: String) -> Self {
        Self {
            id,
            position,
            color,
            name,
            base_radius,
            score: 0.0,
            radius: base_radius,
        }
    }

    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Set the score (floored at zero) and recompute the radius.
    #[inline]
    pub fn set_score(&mut self, score: f32) {
        self.score = score.max(0.0);
        self.radius = radius_for_score(self.base_radius, self.score);
    }

    #[inline]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    /// Clamp position so the whole circle stays inside a `world_size` square.
    #[inline]
    pub fn check_border(&mut self, world_size: f32) {
        self.position.x = clamp_axis(self.position.x, self.radius, world_size);
        self.position.y = clamp_axis(self.position.y, self.radius, world_size);
    }
}

/// Entities wider than the world sit in the middle.
#[inline]
fn clamp_axis(value: f32, radius: f32, world_size: f32) -> f32 {
    let max = world_size - radius;
    if radius > max {
        world_size / 2.0
    } else {
        value.clamp(radius, max)
    }
}

/// Capabilities shared by every entity: move, grow, collide.
pub trait Entity: Send + Sync {
    /// Get the common entity data.
    fn data(&self) -> &EntityData;

    /// Get mutable entity data.
    fn data_mut(&mut self) -> &mut EntityData;

    /// Move by `delta`, then clamp to the world.
    fn step(&mut self, delta: Vec2, world_size: f32) {
        let data = self.data_mut();
        data.position += delta;
        data.check_border(world_size);
    }

    /// Add `amount` to the score, then clamp with the new radius.
    fn grow(&mut self, amount: f32, world_size: f32) {
        let data = self.data_mut();
        let score = data.score();
        data.set_score(score + amount);
        data.check_border(world_size);
    }

    /// Whether `point` lies strictly inside this entity.
    fn touches(&self, point: Vec2) -> bool {
        let data = self.data();
        data.distance_to(point) < data.radius()
    }
}

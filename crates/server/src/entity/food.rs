//! Food fragment.

use glam::Vec2;
use protocol::{Color, FoodSnapshot};

/// A fixed-position fragment that grows whoever touches it.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    /// Stable slot id, reused when the fragment is replaced.
    pub id: u32,
    pub position: Vec2,
    pub color: Color,
}

impl Food {
    pub fn new(id: u32, position: Vec2, color: Color) -> Self {
        Self { id, position, color }
    }

    pub fn snapshot(&self) -> FoodSnapshot {
        FoodSnapshot {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            color: self.color,
        }
    }
}

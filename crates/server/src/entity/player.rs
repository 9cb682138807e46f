//! Player entity.

use super::base::{Entity, EntityData};
use glam::Vec2;
use protocol::{Color, EntitySnapshot, MoveInput};

/// Name shown for players that joined without one.
pub const UNNAMED: &str = "An unnamed cell";

/// An entity controlled by a connected client.
#[derive(Debug, Clone)]
pub struct Player {
    /// Entity data (public for direct access).
    pub entity_data: EntityData,
    /// Most recent input; movement reads it once per tick.
    pub input: MoveInput,
    /// Whether the last movement step was boosted.
    pub boosting: bool,
}

impl Player {
    /// Create a new player with score 0.
    pub fn new(conn_id: u32, position: Vec2, base_radius: f32, color: Color, name: String) -> Self {
        Self {
            entity_data: EntityData::new(conn_id, position, base_radius, color, name),
            input: MoveInput::default(),
            boosting: false,
        }
    }

    /// Back to a fresh spawn at `position`.
    pub fn reset(&mut self, position: Vec2) {
        self.entity_data.set_score(0.0);
        self.entity_data.position = position;
        self.input = MoveInput::default();
        self.boosting = false;
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        let data = &self.entity_data;
        EntitySnapshot {
            id: data.id,
            x: data.position.x,
            y: data.position.y,
            radius: data.radius(),
            score: data.score(),
            color: data.color,
            name: if data.name.is_empty() { UNNAMED.to_string() } else { data.name.clone() },
            is_bot: false,
            boosting: Some(self.boosting),
            target_angle: None,
        }
    }
}

impl Entity for Player {
    fn data(&self) -> &EntityData {
        &self.entity_data
    }

    fn data_mut(&mut self) -> &mut EntityData {
        &mut self.entity_data
    }
}

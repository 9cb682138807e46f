//! Bot entity.

use super::base::{Entity, EntityData};
use glam::Vec2;
use protocol::{Color, EntitySnapshot};

/// Bot names to use.
pub(crate) const BOT_NAMES: &[&str] = &[
    "Bot", "Hunter", "Hungry", "Nomnom", "Blob", "Cell", "Eater", "Seeker",
    "Roamer", "Wanderer", "Ghost", "Shadow", "Swift", "Tiny", "Big", "Mega",
];

/// An always-present entity driven by the bot AI.
#[derive(Debug, Clone)]
pub struct Bot {
    entity_data: EntityData,
    /// Current wander heading in radians.
    pub target_angle: f32,
}

impl Bot {
    /// Create a bot with the given starting score.
    pub fn new(
        id: u32,
        name: String,
        position: Vec2,
        base_radius: f32,
        color: Color,
        score: f32,
        target_angle: f32,
    ) -> Self {
        let mut entity_data = EntityData::new(id, position, base_radius, color, name);
        entity_data.set_score(score);
        Self { entity_data, target_angle }
    }

    /// Called when eaten: the bot keeps its slot with a new score and position.
    pub fn reset(&mut self, score: f32, position: Vec2) {
        self.entity_data.set_score(score);
        self.entity_data.position = position;
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
            name: data.name.clone(),
            is_bot: true,
            boosting: None,
            target_angle: Some(self.target_angle),
        }
    }
}

impl Entity for Bot {
    fn data(&self) -> &EntityData {
        &self.entity_data
    }

    fn data_mut(&mut self) -> &mut EntityData {
        &mut self.entity_data
    }
}

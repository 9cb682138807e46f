//! World state management.
//!
//! The canonical store for players, bots and food. Every other component
//! reads and mutates the world through the operations here.

use crate::config::Config;
use crate::entity::{Bot, Entity, EntityData, EntityKey, Food, Player};
use crate::spawn::Spawner;
use std::collections::BTreeMap;

/// First bot id. Kept far above connection ids so the two never collide.
pub const BOT_ID_BASE: u32 = 1_000_000;

/// The game world containing all entities.
#[derive(Debug)]
pub struct World {
    /// Side of the square world.
    pub size: f32,
    /// Players by connection id. Ordered so enumeration is deterministic.
    players: BTreeMap<u32, Player>,
    /// Bots, fixed at creation.
    bots: Vec<Bot>,
    /// Food, fixed length; slots are replaced in place.
    food: Vec<Food>,
}

impl World {
    /// Create an empty world with the given side length.
    pub fn new(size: f32) -> Self {
        Self {
            size,
            players: BTreeMap::new(),
            bots: Vec::new(),
            food: Vec::new(),
        }
    }

    /// Create a world from pre-built bots and food.
    pub fn from_parts(size: f32, bots: Vec<Bot>, food: Vec<Food>) -> Self {
        Self {
            size,
            players: BTreeMap::new(),
            bots,
            food,
        }
    }

    /// Create a world with the configured food and bot population.
    pub fn generate(config: &Config, spawner: &mut Spawner) -> Self {
        let mut world = Self::new(config.world.size);
        let base_radius = config.world.initial_radius;

        world.food = (0..config.world.food_count)
            .map(|slot| Food::new(slot as u32, spawner.food_position(), spawner.color()))
            .collect();

        world.bots = (0..config.world.bot_count)
            .map(|i| {
                let id = BOT_ID_BASE + i as u32;
                let names = crate::entity::BOT_NAMES;
                let name = format!("{}{}", names[spawner.index(names.len())], id % 100);
                Bot::new(
                    id,
                    name,
                    spawner.position(base_radius),
                    base_radius,
                    spawner.color(),
                    0.0,
                    spawner.angle(),
                )
            })
            .collect();

        world
    }

    /// Add a player. Returns `false` (and keeps the existing one) if the
    /// connection already has an entity.
    pub fn add_player(&mut self, player: Player) -> bool {
        let id = player.data().id;
        if self.players.contains_key(&id) {
            return false;
        }
        self.players.insert(id, player);
        true
    }

    /// Remove a player by connection id.
    pub fn remove_player(&mut self, id: u32) -> Option<Player> {
        self.players.remove(&id)
    }

    #[inline]
    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.get(&id)
    }

    #[inline]
    pub fn player_mut(&mut self, id: u32) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Players in ascending connection id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn bot(&self, slot: usize) -> Option<&Bot> {
        self.bots.get(slot)
    }

    #[inline]
    pub fn bot_mut(&mut self, slot: usize) -> Option<&mut Bot> {
        self.bots.get_mut(slot)
    }

    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    pub fn bot_count(&self) -> usize {
        self.bots.len()
    }

    /// Every player and bot key: players by connection id, then bots by slot.
    ///
    /// This is the canonical enumeration order used for tie-breaks.
    pub fn entity_keys(&self) -> Vec<EntityKey> {
        self.players
            .keys()
            .map(|&id| EntityKey::Player(id))
            .chain((0..self.bots.len()).map(EntityKey::Bot))
            .collect()
    }

    /// Every player and bot, in canonical order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityKey, &EntityData)> {
        self.players
            .iter()
            .map(|(&id, p)| (EntityKey::Player(id), p.data()))
            .chain(self.bots.iter().enumerate().map(|(slot, b)| (EntityKey::Bot(slot), b.data())))
    }

    #[inline]
    pub fn entity(&self, key: EntityKey) -> Option<&dyn Entity> {
        match key {
            EntityKey::Player(id) => self.players.get(&id).map(|p| p as &dyn Entity),
            EntityKey::Bot(slot) => self.bots.get(slot).map(|b| b as &dyn Entity),
        }
    }

    #[inline]
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut dyn Entity> {
        match key {
            EntityKey::Player(id) => self.players.get_mut(&id).map(|p| p as &mut dyn Entity),
            EntityKey::Bot(slot) => self.bots.get_mut(slot).map(|b| b as &mut dyn Entity),
        }
    }

    pub fn food(&self) -> &[Food] {
        &self.food
    }

    /// Put a new fragment in `slot`, keeping the slot's id.
    pub fn replace_food(&mut self, slot: usize, spawner: &mut Spawner) {
        if let Some(food) = self.food.get_mut(slot) {
            food.position = spawner.food_position();
            food.color = spawner.color();
        }
    }
}

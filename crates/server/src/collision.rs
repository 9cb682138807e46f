//! Collision detection and resolution.
//!
//! Two passes run after movement:
//! - food consumption (any entity touching a fragment eats it)
//! - predation (a sufficiently larger entity eats a smaller one)

use crate::config::Config;
use crate::entity::{EntityData, EntityKey, radius_for_score};
use crate::spawn::Spawner;
use crate::world::World;

/// One entity eating another during the predation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub attacker: EntityKey,
    pub victim: EntityKey,
    /// Score added to the attacker.
    pub gain: f32,
}

/// Everything that happened during one resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionOutcome {
    /// Food fragments eaten (and replaced).
    pub food_eaten: usize,
    pub kills: Vec<Kill>,
}

impl CollisionOutcome {
    /// Connection ids of players removed by predation.
    pub fn dead_players(&self) -> impl Iterator<Item = u32> + '_ {
        self.kills.iter().filter_map(|kill| match kill.victim {
            EntityKey::Player(id) => Some(id),
            EntityKey::Bot(_) => None,
        })
    }
}

/// Whether `attacker` is close enough and big enough to eat `victim`.
#[inline]
pub fn can_prey(attacker: &EntityData, victim: &EntityData, distance_ratio: f32, radius_ratio: f32) -> bool {
    attacker.distance_to(victim.position) < attacker.radius() * distance_ratio
        && attacker.radius() > victim.radius() * radius_ratio
}

/// Run both passes.
pub fn resolve_collisions(world: &mut World, spawner: &mut Spawner, config: &Config) -> CollisionOutcome {
    let food_eaten = consume_food(world, spawner, config);
    let kills = resolve_predation(world, spawner, config);
    CollisionOutcome { food_eaten, kills }
}

/// Every entity eats every fragment strictly inside its radius. An eaten
/// fragment is replaced in the same slot right away, so later entities see
/// the replacement.
pub fn consume_food(world: &mut World, spawner: &mut Spawner, config: &Config) -> usize {
    let world_size = world.size;
    let mut eaten = 0;
    for key in world.entity_keys() {
        for slot in 0..world.food().len() {
            let food_pos = world.food()[slot].position;
            let Some(entity) = world.entity_mut(key) else {
                break;
            };
            if !entity.touches(food_pos) {
                continue;
            }
            entity.grow(config.collision.food_score, world_size);
            world.replace_food(slot, spawner);
            eaten += 1;
        }
    }
    eaten
}

/// Check every ordered (attacker, victim) pair in canonical order.
///
/// First match wins: once eaten, an entity is skipped for the rest of the
/// pass, both as victim and as attacker. Attackers grow immediately, so a
/// later comparison sees the larger radius.
pub fn resolve_predation(world: &mut World, spawner: &mut Spawner, config: &Config) -> Vec<Kill> {
    let keys = world.entity_keys();
    let mut eaten = vec![false; keys.len()];
    let mut kills = Vec::new();
    let distance_ratio = config.collision.predation_distance_ratio;
    let radius_ratio = config.collision.predation_radius_ratio;
    let world_size = world.size;

    for a in 0..keys.len() {
        if eaten[a] {
            continue;
        }
        for v in 0..keys.len() {
            if a == v || eaten[v] {
                continue;
            }
            let (Some(attacker), Some(victim)) = (world.entity(keys[a]), world.entity(keys[v])) else {
                continue;
            };
            if !can_prey(attacker.data(), victim.data(), distance_ratio, radius_ratio) {
                continue;
            }

            let gain = (victim.data().score() + config.collision.kill_bonus).floor();
            eaten[v] = true;
            if let Some(attacker) = world.entity_mut(keys[a]) {
                attacker.grow(gain, world_size);
            }

            match keys[v] {
                EntityKey::Bot(slot) => {
                    let score = config.bot.reset_score;
                    let margin = radius_for_score(config.world.initial_radius, score);
                    let position = spawner.position(margin);
                    if let Some(bot) = world.bot_mut(slot) {
                        bot.reset(score, position);
                    }
                }
                EntityKey::Player(id) => {
                    world.remove_player(id);
                }
            }

            kills.push(Kill {
                attacker: keys[a],
                victim: keys[v],
                gain,
            });
        }
    }

    kills
}

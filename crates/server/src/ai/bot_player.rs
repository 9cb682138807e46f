//! Per-tick bot decisions: flee, forage or wander.

use crate::config::BotConfig;
use crate::entity::{Entity, EntityKey};
use crate::spawn::Spawner;
use crate::world::World;
use glam::Vec2;

/// What a bot does this tick, in priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BotIntent {
    /// Run straight away from `threat`.
    Flee { threat: EntityKey, direction: Vec2 },
    /// Head for the nearest food fragment in range.
    Forage { food_slot: usize, direction: Vec2 },
    /// Follow the current heading.
    Wander,
}

/// How many bots took each branch during one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentCounts {
    pub flee: usize,
    pub forage: usize,
    pub wander: usize,
}

/// Decide the intent for the bot in `slot` against the current world.
///
/// The threat picked is the first qualifying entity in canonical order
/// (players by id, then bots by slot). Ties between equally near food go to
/// the lowest slot.
pub fn decide(world: &World, slot: usize, config: &BotConfig) -> BotIntent {
    let Some(bot) = world.bot(slot) else {
        return BotIntent::Wander;
    };
    let me = bot.data();
    let me_key = EntityKey::Bot(slot);

    let threat = world.entities().find(|(key, other)| {
        *key != me_key
            && other.radius() > me.radius() * config.threat_ratio
            && me.distance_to(other.position) < config.threat_distance
    });
    if let Some((threat, other)) = threat {
        return BotIntent::Flee {
            threat,
            direction: (me.position - other.position).normalize_or_zero(),
        };
    }

    let nearest = world
        .food()
        .iter()
        .enumerate()
        .map(|(slot, food)| (slot, food.position, me.distance_to(food.position)))
        .filter(|&(_, _, dist)| dist < config.forage_distance)
        .min_by(|a, b| a.2.total_cmp(&b.2));
    if let Some((food_slot, position, _)) = nearest {
        return BotIntent::Forage {
            food_slot,
            direction: (position - me.position).normalize_or_zero(),
        };
    }

    BotIntent::Wander
}

/// Decide and apply one movement step for every bot, in slot order.
///
/// Each bot sees the positions of bots that already moved this tick.
pub fn update_bots(world: &mut World, spawner: &mut Spawner, config: &BotConfig) -> IntentCounts {
    let mut counts = IntentCounts::default();
    let world_size = world.size;

    for slot in 0..world.bot_count() {
        let intent = decide(world, slot, config);
        let Some(bot) = world.bot_mut(slot) else {
            continue;
        };

        let delta = match intent {
            BotIntent::Flee { direction, .. } => {
                counts.flee += 1;
                direction * config.flee_speed
            }
            BotIntent::Forage { direction, .. } => {
                counts.forage += 1;
                direction * config.forage_speed
            }
            BotIntent::Wander => {
                counts.wander += 1;
                if spawner.chance(config.wander_turn_chance) {
                    bot.target_angle = spawner.angle();
                }
                Vec2::from_angle(bot.target_angle) * config.wander_speed
            }
        };

        bot.step(delta, world_size);
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Bot, Food, Player};
    use protocol::Color;

    fn bot(id: u32, pos: Vec2, score: f32) -> Bot {
        Bot::new(id, format!("b{id}"), pos, 20.0, Color::default(), score, 0.0)
    }

    /// Player whose radius is exactly `radius` (base 20).
    fn player_with_radius(id: u32, pos: Vec2, radius: f32) -> Player {
        let mut p = Player::new(id, pos, 20.0, Color::default(), String::new());
        let score = ((radius - 20.0) / 2.0).powi(2);
        p.data_mut().set_score(score);
        p
    }

    #[test]
    fn test_flees_from_bigger_entity_in_range() {
        let mut world = World::from_parts(
            3000.0,
            vec![bot(1_000_000, Vec2::new(1000.0, 1000.0), 0.0)],
            vec![Food::new(0, Vec2::new(1010.0, 1000.0), Color::default())],
        );
        world.add_player(player_with_radius(1, Vec2::new(1200.0, 1000.0), 25.0));

        let intent = decide(&world, 0, &BotConfig::default());
        match intent {
            BotIntent::Flee { threat, direction } => {
                assert_eq!(threat, EntityKey::Player(1));
                assert!((direction - Vec2::new(-1.0, 0.0)).length() < 1e-6);
            }
            other => panic!("expected flee, got {other:?}"),
        }

        let mut spawner = Spawner::seeded(1, 3000.0);
        let counts = update_bots(&mut world, &mut spawner, &BotConfig::default());
        assert_eq!(counts, IntentCounts { flee: 1, forage: 0, wander: 0 });
        let pos = world.bot(0).unwrap().data().position;
        assert!((pos.x - 997.2).abs() < 1e-3);
        assert!((pos.y - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_similar_size_is_not_a_threat() {
        let mut world = World::from_parts(3000.0, vec![bot(1_000_000, Vec2::new(1000.0, 1000.0), 0.0)], vec![]);
        // 23 is not > 20 * 1.15
        world.add_player(player_with_radius(1, Vec2::new(1100.0, 1000.0), 23.0));
        assert_eq!(decide(&world, 0, &BotConfig::default()), BotIntent::Wander);
    }

    #[test]
    fn test_distant_threat_is_ignored() {
        let mut world = World::from_parts(3000.0, vec![bot(1_000_000, Vec2::new(1000.0, 1000.0), 0.0)], vec![]);
        world.add_player(player_with_radius(1, Vec2::new(1300.0, 1000.0), 60.0));
        assert_eq!(decide(&world, 0, &BotConfig::default()), BotIntent::Wander);
    }

    #[test]
    fn test_forages_nearest_food_in_range() {
        let world = World::from_parts(
            3000.0,
            vec![bot(1_000_000, Vec2::new(1000.0, 1000.0), 0.0)],
            vec![
                Food::new(0, Vec2::new(1250.0, 1000.0), Color::default()),
                Food::new(1, Vec2::new(1000.0, 900.0), Color::default()),
                Food::new(2, Vec2::new(1400.0, 1000.0), Color::default()),
            ],
        );
        match decide(&world, 0, &BotConfig::default()) {
            BotIntent::Forage { food_slot, direction } => {
                assert_eq!(food_slot, 1);
                assert!((direction - Vec2::new(0.0, -1.0)).length() < 1e-6);
            }
            other => panic!("expected forage, got {other:?}"),
        }
    }

    #[test]
    fn test_forage_moves_at_forage_speed() {
        let mut world = World::from_parts(
            3000.0,
            vec![bot(1_000_000, Vec2::new(1000.0, 1000.0), 0.0)],
            vec![Food::new(0, Vec2::new(1000.0, 1200.0), Color::default())],
        );
        let mut spawner = Spawner::seeded(1, 3000.0);
        update_bots(&mut world, &mut spawner, &BotConfig::default());
        let pos = world.bot(0).unwrap().data().position;
        assert!((pos.y - 1002.2).abs() < 1e-3);
    }

    #[test]
    fn test_wander_follows_heading_and_clamps() {
        let mut b = bot(1_000_000, Vec2::new(21.0, 1000.0), 0.0);
        b.target_angle = std::f32::consts::PI;
        let mut world = World::from_parts(3000.0, vec![b], vec![]);
        let mut config = BotConfig::default();
        config.wander_turn_chance = 0.0;

        let mut spawner = Spawner::seeded(1, 3000.0);
        let counts = update_bots(&mut world, &mut spawner, &config);
        assert_eq!(counts.wander, 1);
        let pos = world.bot(0).unwrap().data().position;
        assert_eq!(pos.x, 20.0);
        assert!((pos.y - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_wander_resamples_heading() {
        let mut world = World::from_parts(3000.0, vec![bot(1_000_000, Vec2::new(1000.0, 1000.0), 0.0)], vec![]);
        let mut config = BotConfig::default();
        config.wander_turn_chance = 1.0;

        let mut spawner = Spawner::seeded(11, 3000.0);
        let mut expected = Spawner::seeded(11, 3000.0);
        expected.chance(1.0);
        let angle = expected.angle();

        update_bots(&mut world, &mut spawner, &config);
        assert_eq!(world.bot(0).unwrap().target_angle, angle);
    }

    #[test]
    fn test_bigger_bot_scares_smaller_bot() {
        let world = World::from_parts(
            3000.0,
            vec![
                bot(1_000_000, Vec2::new(1000.0, 1000.0), 0.0),
                bot(1_000_001, Vec2::new(1000.0, 1100.0), 100.0),
            ],
            vec![],
        );
        assert!(matches!(
            decide(&world, 0, &BotConfig::default()),
            BotIntent::Flee { threat: EntityKey::Bot(1), .. }
        ));
        // the big one ignores the small one
        assert_eq!(decide(&world, 1, &BotConfig::default()), BotIntent::Wander);
    }
}

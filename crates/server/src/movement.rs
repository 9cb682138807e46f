//! Player movement integration.

use crate::config::PlayerConfig;
use crate::entity::{Entity, Player};
use crate::world::World;
use glam::Vec2;

/// Apply each player's last recorded input once. Returns how many players boosted.
pub fn update_player_movement(world: &mut World, config: &PlayerConfig) -> usize {
    let world_size = world.size;
    let mut boosted = 0;
    for player in world.players_mut() {
        if move_player(player, config, world_size) {
            boosted += 1;
        }
    }
    boosted
}

/// Move one player by its input. Returns whether the step was boosted.
///
/// Axes are stepped independently, so a diagonal moves `speed` on both axes.
pub fn move_player(player: &mut Player, config: &PlayerConfig, world_size: f32) -> bool {
    let input = player.input;
    let score = player.data().score();

    let boosting = input.boost && score > config.boost_threshold;
    let speed = if boosting {
        player.data_mut().set_score(score - config.boost_decay);
        config.boost_speed
    } else {
        config.base_speed
    };
    player.boosting = boosting;

    let mut delta = Vec2::ZERO;
    if input.up {
        delta.y -= speed;
    }
    if input.down {
        delta.y += speed;
    }
    if input.left {
        delta.x -= speed;
    }
    if input.right {
        delta.x += speed;
    }

    player.step(delta, world_size);
    boosting
}

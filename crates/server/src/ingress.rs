//! Command ingress.
//!
//! Turns per-connection events into world mutations. Commands naming a
//! connection without an entity are ignored.

use crate::config::Config;
use crate::entity::{Entity, Player};
use crate::spawn::Spawner;
use crate::world::World;
use protocol::{ClientMessage, Color, MoveInput};
use tracing::{debug, info};

/// An event from one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub conn_id: u32,
    pub kind: CommandKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    /// Create the connection's entity. Also the way back in after `dead`.
    Join { name: Option<String>, color: Option<String> },
    /// Reset a live entity to a fresh spawn. A player that was eaten has no
    /// entity left, so this is ignored and the client must `join` again.
    Respawn,
    Move(MoveInput),
    /// The connection closed.
    Disconnect,
}

impl Command {
    pub fn new(conn_id: u32, kind: CommandKind) -> Self {
        Self { conn_id, kind }
    }

    pub fn disconnect(conn_id: u32) -> Self {
        Self::new(conn_id, CommandKind::Disconnect)
    }
}

impl From<ClientMessage> for CommandKind {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::Join { name, color } => CommandKind::Join { name, color },
            ClientMessage::Respawn => CommandKind::Respawn,
            ClientMessage::Move(input) => CommandKind::Move(input),
        }
    }
}

/// Apply one command. Returns `false` when it was a no-op.
pub fn apply_command(world: &mut World, spawner: &mut Spawner, config: &Config, command: Command) -> bool {
    let conn_id = command.conn_id;
    match command.kind {
        CommandKind::Join { name, color } => handle_join(world, spawner, config, conn_id, name, color),
        CommandKind::Respawn => {
            if world.player(conn_id).is_none() {
                debug!("Client {} sent respawn without an entity", conn_id);
                return false;
            }
            let position = spawner.position(config.world.initial_radius);
            if let Some(player) = world.player_mut(conn_id) {
                player.reset(position);
            }
            info!("Client {} respawned", conn_id);
            true
        }
        CommandKind::Move(input) => match world.player_mut(conn_id) {
            Some(player) => {
                player.input = input;
                true
            }
            None => false,
        },
        CommandKind::Disconnect => match world.remove_player(conn_id) {
            Some(player) => {
                info!("Client {} ({}) left with score {:.1}", conn_id, player.data().name, player.data().score());
                true
            }
            None => false,
        },
    }
}

fn handle_join(
    world: &mut World,
    spawner: &mut Spawner,
    config: &Config,
    conn_id: u32,
    name: Option<String>,
    color: Option<String>,
) -> bool {
    if world.player(conn_id).is_some() {
        debug!("Client {} is already in the game, ignoring join", conn_id);
        return false;
    }

    let name: String = name
        .unwrap_or_default()
        .trim()
        .chars()
        .take(config.player.max_nick_length)
        .collect();
    let color = color
        .and_then(|c| c.parse::<Color>().ok())
        .unwrap_or_else(|| spawner.color());
    let position = spawner.position(config.world.initial_radius);

    info!(
        "Client {} joined as '{}'",
        conn_id,
        if name.is_empty() { crate::entity::UNNAMED } else { &name }
    );
    world.add_player(Player::new(conn_id, position, config.world.initial_radius, color, name))
}

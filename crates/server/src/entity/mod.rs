//! Game entities.
//!
//! Players and bots share [`EntityData`] and the [`Entity`] capability trait;
//! food fragments are plain data.

mod base;
mod bot;
mod food;
mod player;

pub use base::{Entity, EntityData, radius_for_score};
pub use bot::Bot;
pub(crate) use bot::BOT_NAMES;
pub use food::Food;
pub use player::{Player, UNNAMED};

/// Address of a player or bot inside the world store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    /// Player keyed by connection id.
    Player(u32),
    /// Bot keyed by its slot in the bot list.
    Bot(usize),
}

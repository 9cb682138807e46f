//! Bot AI.

pub mod bot_player;

pub use bot_player::{BotIntent, IntentCounts, decide, update_bots};

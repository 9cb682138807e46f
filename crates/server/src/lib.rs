//! Authoritative arena game server library.

pub mod ai;
pub mod collision;
pub mod config;
pub mod entity;
pub mod ingress;
pub mod leaderboard;
pub mod movement;
pub mod server;
pub mod spawn;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use ingress::{Command, CommandKind};
pub use server::{Game, Publisher, TickOutcome, run, run_game_loop};
pub use spawn::Spawner;
pub use world::World;

//! Leaderboard compilation.

use crate::entity::UNNAMED;
use crate::world::World;
use protocol::LeaderboardEntry;

/// Rows shown on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

/// Top entities by score, highest first, scores floored.
///
/// The sort is stable over the canonical order (players by connection id,
/// then bots by slot), so equal scores keep that order.
pub fn compile_leaderboard(world: &World) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<(&str, f32)> = world
        .entities()
        .map(|(_, data)| (data.name.as_str(), data.score()))
        .collect();

    entries.sort_by(|a, b| b.1.total_cmp(&a.1));

    entries
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .map(|(name, score)| LeaderboardEntry {
            name: if name.is_empty() { UNNAMED.to_string() } else { name.to_string() },
            score: score.floor() as u64,
        })
        .collect()
}

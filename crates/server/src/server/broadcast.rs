//! Snapshot building and fan-out to connections.

use crate::entity::Entity;
use crate::world::World;
use protocol::{GameStateSnapshot, LeaderboardEntry, ServerMessage};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Frames buffered per receiver before it starts skipping.
pub const FRAME_BUFFER: usize = 8;
const TARGETED_BUFFER: usize = 64;

/// A message for one connection only.
#[derive(Debug, Clone)]
pub struct TargetedMessage {
    pub conn_id: u32,
    pub message: ServerMessage,
}

/// Full view of the world for one tick.
pub fn build_snapshot(world: &World, leaderboard: Vec<LeaderboardEntry>) -> GameStateSnapshot {
    GameStateSnapshot {
        players: world.players().map(|p| (p.data().id, p.snapshot())).collect(),
        bots: world.bots().iter().map(|b| (b.data().id, b.snapshot())).collect(),
        food: world.food().iter().map(|f| f.snapshot()).collect(),
        leaderboard,
    }
}

/// Fans encoded frames and targeted notices out to every connection task.
///
/// Sending never waits on a receiver; a slow receiver lags and skips frames.
#[derive(Debug, Clone)]
pub struct Publisher {
    frames: broadcast::Sender<Arc<str>>,
    targeted: broadcast::Sender<TargetedMessage>,
}

impl Publisher {
    pub fn new() -> Self {
        Self::with_capacity(FRAME_BUFFER)
    }

    pub fn with_capacity(frames: usize) -> Self {
        let (frames, _) = broadcast::channel(frames.max(1));
        let (targeted, _) = broadcast::channel(TARGETED_BUFFER);
        Self { frames, targeted }
    }

    pub fn subscribe_frames(&self) -> broadcast::Receiver<Arc<str>> {
        self.frames.subscribe()
    }

    pub fn subscribe_targeted(&self) -> broadcast::Receiver<TargetedMessage> {
        self.targeted.subscribe()
    }

    /// Encode the snapshot once and hand it to every subscriber.
    pub fn publish_state(&self, snapshot: GameStateSnapshot) {
        match ServerMessage::GameState(snapshot).encode() {
            // No subscribers is not an error.
            Ok(frame) => {
                let _ = self.frames.send(Arc::from(frame));
            }
            Err(e) => warn!("Failed to encode game state: {}", e),
        }
    }

    /// Tell each connection in `conn_ids` that its entity died.
    pub fn notify_dead(&self, conn_ids: &[u32]) {
        for &conn_id in conn_ids {
            let _ = self.targeted.send(TargetedMessage {
                conn_id,
                message: ServerMessage::Dead,
            });
        }
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Bot, Food, Player};
    use glam::Vec2;
    use protocol::Color;

    fn world() -> World {
        let mut world = World::from_parts(
            3000.0,
            vec![Bot::new(1_000_000, "Bob00".into(), Vec2::new(10.0, 20.0), 20.0, Color::default(), 5.0, 1.0)],
            vec![Food::new(0, Vec2::new(3.0, 4.0), Color::new(1, 2, 3))],
        );
        world.add_player(Player::new(1, Vec2::new(100.0, 200.0), 20.0, Color::default(), "alice".into()));
        world
    }

    #[test]
    fn test_snapshot_covers_every_entity() {
        let snapshot = build_snapshot(&world(), vec![]);
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.bots.len(), 1);
        assert_eq!(snapshot.food.len(), 1);

        let p = &snapshot.players[&1];
        assert_eq!(p.name, "alice");
        assert!(!p.is_bot);
        assert_eq!(p.boosting, Some(false));

        let b = &snapshot.bots[&1_000_000];
        assert!(b.is_bot);
        assert_eq!(b.score, 5.0);
        assert_eq!(b.target_angle, Some(1.0));
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let publisher = Publisher::new();
        let mut a = publisher.subscribe_frames();
        let mut b = publisher.subscribe_frames();

        publisher.publish_state(build_snapshot(&world(), vec![]));

        let frame_a = a.recv().await.unwrap();
        let frame_b = b.recv().await.unwrap();
        assert_eq!(frame_a, frame_b);
        let value: serde_json::Value = serde_json::from_str(&frame_a).unwrap();
        assert_eq!(value["type"], "gameState");
        assert_eq!(value["players"]["1"]["name"], "alice");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let publisher = Publisher::new();
        publisher.publish_state(build_snapshot(&world(), vec![]));
        publisher.notify_dead(&[1]);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let publisher = Publisher::with_capacity(2);
        let mut rx = publisher.subscribe_frames();
        for _ in 0..5 {
            publisher.publish_state(build_snapshot(&world(), vec![]));
        }
        assert!(matches!(rx.recv().await, Err(broadcast::error::RecvError::Lagged(3))));
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_dead_notice_is_targeted() {
        let publisher = Publisher::new();
        let mut rx = publisher.subscribe_targeted();
        publisher.notify_dead(&[4]);
        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.conn_id, 4);
        assert!(matches!(msg.message, ServerMessage::Dead));
    }
}

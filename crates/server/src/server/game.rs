//! Game state and main loop.

use super::broadcast::{Publisher, build_snapshot};
use super::ticker::Ticker;
use crate::ai::update_bots;
use crate::collision::resolve_collisions;
use crate::config::Config;
use crate::ingress::{Command, apply_command};
use crate::leaderboard::compile_leaderboard;
use crate::movement::update_player_movement;
use crate::spawn::Spawner;
use crate::world::World;
use protocol::GameStateSnapshot;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Ticks between diagnostic log lines.
const DIAGNOSTIC_INTERVAL: u64 = 300;

/// Result of one simulation tick.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub tick: u64,
    pub snapshot: GameStateSnapshot,
    /// Connections whose entity was eaten this tick.
    pub dead_players: Vec<u32>,
}

/// Owns the world and everything needed to advance it.
#[derive(Debug)]
pub struct Game {
    pub config: Config,
    pub world: World,
    spawner: Spawner,
    tick_count: u64,
}

impl Game {
    /// Create a game with the configured food and bot population.
    pub fn new(config: Config, mut spawner: Spawner) -> Self {
        let world = World::generate(&config, &mut spawner);
        info!(
            "World initialized: size {}, {} food, {} bots",
            world.size,
            world.food().len(),
            world.bot_count()
        );
        Self {
            config,
            world,
            spawner,
            tick_count: 0,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Apply one queued command.
    pub fn apply(&mut self, command: Command) -> bool {
        apply_command(&mut self.world, &mut self.spawner, &self.config, command)
    }

    /// Run one tick: bot AI, movement, collision, leaderboard, snapshot.
    pub fn step(&mut self) -> TickOutcome {
        self.tick_count += 1;

        let intents = update_bots(&mut self.world, &mut self.spawner, &self.config.bot);
        let boosted = update_player_movement(&mut self.world, &self.config.player);
        let collisions = resolve_collisions(&mut self.world, &mut self.spawner, &self.config);

        let dead_players: Vec<u32> = collisions.dead_players().collect();
        for conn_id in &dead_players {
            info!("Client {} was eaten", conn_id);
        }

        let leaderboard = compile_leaderboard(&self.world);

        if self.tick_count % DIAGNOSTIC_INTERVAL == 0 {
            debug!(
                "Tick {}: {} players, {} bots, {} boosting, bots flee/forage/wander {}/{}/{}, {} food eaten, {} kills",
                self.tick_count,
                self.world.player_count(),
                self.world.bot_count(),
                boosted,
                intents.flee,
                intents.forage,
                intents.wander,
                collisions.food_eaten,
                collisions.kills.len()
            );
        }

        TickOutcome {
            tick: self.tick_count,
            snapshot: build_snapshot(&self.world, leaderboard),
            dead_players,
        }
    }
}

/// Drive `game` until the ticker stops. Returns the game for inspection.
///
/// This task is the only owner of the world. Commands are applied as they
/// arrive between ticks and the queue is drained again right before each
/// step, so a step never interleaves with a command.
pub async fn run_game_loop<T: Ticker>(
    mut game: Game,
    mut ticker: T,
    mut commands: mpsc::Receiver<Command>,
    publisher: Publisher,
) -> Game {
    let tick_budget = game.config.tick_period().mul_f64(0.9);
    let mut commands_open = true;

    loop {
        tokio::select! {
            command = commands.recv(), if commands_open => match command {
                Some(command) => {
                    game.apply(command);
                }
                None => commands_open = false,
            },
            running = ticker.tick() => {
                if !running {
                    break;
                }

                while let Ok(command) = commands.try_recv() {
                    game.apply(command);
                }

                let tick_start = Instant::now();
                let outcome = game.step();
                let elapsed = tick_start.elapsed();
                if elapsed > tick_budget {
                    warn!(
                        "Slow tick #{}: {:.3}ms (budget: {:.1}ms) - {} players",
                        outcome.tick,
                        elapsed.as_secs_f64() * 1000.0,
                        tick_budget.as_secs_f64() * 1000.0,
                        game.world.player_count()
                    );
                }

                publisher.notify_dead(&outcome.dead_players);
                publisher.publish_state(outcome.snapshot);
            }
        }
    }

    info!("Game loop stopped after {} ticks", game.tick_count);
    game
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::ingress::CommandKind;
    use crate::server::ticker::manual;
    use protocol::{MoveInput, ServerMessage};

    fn game() -> Game {
        Game::new(Config::default(), Spawner::seeded(21, 3000.0))
    }

    fn join(conn_id: u32) -> Command {
        Command::new(
            conn_id,
            CommandKind::Join {
                name: Some(format!("p{conn_id}")),
                color: None,
            },
        )
    }

    #[test]
    fn test_new_game_population() {
        let game = game();
        assert_eq!(game.world.food().len(), 200);
        assert_eq!(game.world.bot_count(), 12);
        assert_eq!(game.tick_count(), 0);
    }

    #[test]
    fn test_step_snapshot_and_counts() {
        let mut game = game();
        game.apply(join(1));
        let outcome = game.step();
        assert_eq!(outcome.tick, 1);
        assert_eq!(outcome.snapshot.players.len(), 1);
        assert_eq!(outcome.snapshot.bots.len(), 12);
        assert_eq!(outcome.snapshot.food.len(), 200);
        assert!(outcome.snapshot.leaderboard.len() <= 5);
        assert!(outcome.dead_players.is_empty());
    }

    #[test]
    fn test_world_invariants_hold_over_many_ticks() {
        let mut game = game();
        game.apply(join(1));
        game.apply(Command::new(
            1,
            CommandKind::Move(MoveInput {
                up: true,
                left: true,
                ..Default::default()
            }),
        ));
        for _ in 0..1000 {
            game.step();
            for (key, data) in game.world.entities() {
                let r = data.radius();
                let (x, y) = (data.position.x, data.position.y);
                assert!(x >= r - 1e-3 && x <= 3000.0 - r + 1e-3, "{key:?} x={x} r={r}");
                assert!(y >= r - 1e-3 && y <= 3000.0 - r + 1e-3, "{key:?} y={y} r={r}");
                assert!(data.score() >= 0.0);
                assert!((data.radius() - (20.0 + data.score().sqrt() * 2.0)).abs() < 1e-3);
            }
            assert_eq!(game.world.food().len(), 200);
            assert_eq!(game.world.bot_count(), 12);
        }
        if let Some(p) = game.world.player(1) {
            assert!((p.data().position.x - p.data().radius()).abs() < 1e-3);
            assert!((p.data().position.y - p.data().radius()).abs() < 1e-3);
        }
    }

    #[tokio::test]
    async fn test_loop_applies_commands_before_step() {
        let (clock, ticker) = manual();
        let (tx, rx) = mpsc::channel(16);
        let publisher = Publisher::new();
        let mut frames = publisher.subscribe_frames();

        let handle = tokio::spawn(run_game_loop(game(), ticker, rx, publisher.clone()));

        tx.send(join(3)).await.unwrap();
        clock.advance();

        let frame = frames.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "gameState");
        assert_eq!(value["players"]["3"]["name"], "p3");

        drop(clock);
        let game = handle.await.unwrap();
        assert_eq!(game.tick_count(), 1);
        assert!(game.world.player(3).is_some());
    }

    #[tokio::test]
    async fn test_dead_players_are_notified() {
        let (clock, ticker) = manual();
        let (tx, rx) = mpsc::channel(16);
        let publisher = Publisher::new();
        let mut targeted = publisher.subscribe_targeted();

        let mut game = game();
        game.apply(join(1));
        game.apply(join(2));
        // Make player 1 big and put player 2 right on top of it.
        let target = game.world.player(1).unwrap().data().position;
        game.world.player_mut(1).unwrap().data_mut().set_score(400.0);
        game.world.player_mut(2).unwrap().data_mut().position = target;

        let handle = tokio::spawn(run_game_loop(game, ticker, rx, publisher.clone()));
        clock.advance();

        let notice = targeted.recv().await.unwrap();
        assert_eq!(notice.conn_id, 2);
        assert!(matches!(notice.message, ServerMessage::Dead));

        drop(clock);
        drop(tx);
        let game = handle.await.unwrap();
        assert!(game.world.player(2).is_none());
        assert!(game.world.player(1).unwrap().data().score() >= 410.0);
    }

    #[tokio::test]
    async fn test_loop_ends_when_clock_dropped() {
        let (clock, ticker) = manual();
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(run_game_loop(game(), ticker, rx, Publisher::new()));

        clock.advance_by(3);
        drop(clock);
        drop(tx);
        let game = handle.await.unwrap();
        assert_eq!(game.tick_count(), 3);
    }
}

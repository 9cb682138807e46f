//! Game server implementation.

use crate::config::Config;
use crate::ingress::{Command, CommandKind};
use crate::spawn::Spawner;
use futures_util::{SinkExt, StreamExt};
use protocol::{ClientMessage, ProtocolError, ServerMessage};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

pub mod broadcast;
pub mod game;
pub mod ticker;

pub use broadcast::{Publisher, TargetedMessage, build_snapshot};
pub use game::{Game, TickOutcome, run_game_loop};
pub use ticker::{IntervalTicker, ManualClock, ManualTicker, Ticker, manual};

/// Commands buffered between the connection tasks and the game loop.
const COMMAND_QUEUE: usize = 1024;

/// Connection tracking state (shared across connection handlers).
#[derive(Debug, Default)]
struct ConnectionState {
    /// Number of connections per IP address.
    ip_connections: HashMap<IpAddr, usize>,
    /// Total number of connections.
    total_connections: usize,
}

impl ConnectionState {
    /// Try to add a connection, returns true if allowed.
    fn try_add_connection(&mut self, ip: IpAddr, max_total: usize, max_per_ip: usize) -> bool {
        if self.total_connections >= max_total {
            return false;
        }
        let current = self.ip_connections.get(&ip).copied().unwrap_or(0);
        if current >= max_per_ip {
            return false;
        }
        *self.ip_connections.entry(ip).or_insert(0) += 1;
        self.total_connections += 1;
        true
    }

    fn remove_connection(&mut self, ip: IpAddr) {
        if let Some(count) = self.ip_connections.get_mut(&ip) {
            if *count > 0 {
                *count -= 1;
                self.total_connections = self.total_connections.saturating_sub(1);
            }
            if *count == 0 {
                self.ip_connections.remove(&ip);
            }
        }
    }
}

/// Everything a connection task needs.
#[derive(Clone)]
struct Shared {
    commands: mpsc::Sender<Command>,
    publisher: Publisher,
    world_size: f32,
}

/// Run the game server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on ws://{}", addr);

    let conn_state = Arc::new(Mutex::new(ConnectionState::default()));
    let mut next_conn_id: u32 = 1;

    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
    let publisher = Publisher::new();
    let shared = Shared {
        commands: command_tx,
        publisher: publisher.clone(),
        world_size: config.world.size,
    };

    let ticker = IntervalTicker::new(config.tick_period());
    let spawner = Spawner::new(config.world.seed, config.world.size);
    let max_connections = config.server.max_connections;
    let ip_limit = config.server.ip_limit;
    let game = Game::new(config, spawner);
    tokio::spawn(run_game_loop(game, ticker, command_rx, publisher));

    loop {
        let (stream, addr) = listener.accept().await?;
        let ip = addr.ip();

        if !conn_state.lock().await.try_add_connection(ip, max_connections, ip_limit) {
            warn!("Connection rejected (limit reached): {}", addr);
            continue;
        }

        let conn_id = next_conn_id;
        next_conn_id = next_conn_id.wrapping_add(1);
        let shared = shared.clone();
        let conn_state = Arc::clone(&conn_state);

        tokio::spawn(async move {
            let result = handle_connection(stream, addr, conn_id, &shared).await;

            // The entity goes away whatever ended the connection.
            if shared.commands.send(Command::disconnect(conn_id)).await.is_err() {
                debug!("Game loop gone, dropping disconnect for client {}", conn_id);
            }
            conn_state.lock().await.remove_connection(ip);

            if let Err(e) = result {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// Turn one text frame into a command.
fn decode_frame(conn_id: u32, message: Message) -> Result<Option<Command>, ProtocolError> {
    match message {
        Message::Text(text) => {
            let message = ClientMessage::decode(text.as_str())?;
            Ok(Some(Command::new(conn_id, CommandKind::from(message))))
        }
        Message::Binary(_) => Err(ProtocolError::UnsupportedFrame),
        _ => Ok(None),
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, conn_id: u32, shared: &Shared) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("Client {} connected from {}", conn_id, addr);

    let (mut write, mut read) = ws_stream.split();
    let mut frames = shared.publisher.subscribe_frames();
    let mut targeted = shared.publisher.subscribe_targeted();

    let init = ServerMessage::Init {
        world_size: shared.world_size,
        id: conn_id,
    }
    .encode()?;
    write.send(Message::text(init)).await?;

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Client {} disconnected", conn_id);
                        break;
                    }
                    Some(Ok(message)) => match decode_frame(conn_id, message) {
                        Ok(Some(command)) => {
                            if shared.commands.send(command).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Bad frame from client {}: {}", conn_id, e),
                    },
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                }
            }
            frame = frames.recv() => {
                match frame {
                    Ok(frame) => {
                        if let Err(e) = write.send(Message::text(frame.to_string())).await {
                            warn!("Failed to send game state to {}: {}", addr, e);
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Client {} lagging, skipped {} frames", conn_id, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            notice = targeted.recv() => {
                match notice {
                    Ok(notice) if notice.conn_id == conn_id => {
                        let text = notice.message.encode()?;
                        if let Err(e) = write.send(Message::text(text)).await {
                            warn!("Failed to send notice to {}: {}", addr, e);
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Client {} missed {} targeted messages", conn_id, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}

//! Server -> Client messages.

use crate::{Color, ProtocolError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message sent from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// First frame on every connection.
    #[serde(rename_all = "camelCase")]
    Init { world_size: f32, id: u32 },
    /// Full world state, broadcast once per tick.
    GameState(GameStateSnapshot),
    /// The receiving connection's entity was eaten.
    Dead,
}

impl ServerMessage {
    /// Encode this message as a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a server message from a JSON text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Snapshot of the whole world after a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    /// Players keyed by connection id.
    pub players: BTreeMap<u32, EntitySnapshot>,
    /// Bots keyed by bot id.
    pub bots: BTreeMap<u32, EntitySnapshot>,
    pub food: Vec<FoodSnapshot>,
    /// At most five entries, highest score first.
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// A player or bot as seen by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub score: f32,
    pub color: Color,
    pub name: String,
    pub is_bot: bool,
    /// Players only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boosting: Option<bool>,
    /// Bots only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_angle: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub color: Color,
}

/// A leaderboard row. `score` is the floored entity score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
}

//! Client -> Server messages.

use crate::ProtocolError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Parsed client message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Enter the arena with a display name and color.
    Join {
        #[serde(default, deserialize_with = "lenient_string")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        color: Option<String>,
    },
    /// Reset the connection's entity to a fresh spawn. After `dead` there is
    /// no entity to reset; send `join` instead.
    Respawn,
    /// Latest directional input.
    Move(MoveInput),
}

impl ClientMessage {
    /// Parse a client message from a JSON text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode this message as a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Directional input. Every flag is `false` unless the client sent `true`;
/// a flag of any other type does not spoil the rest of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveInput {
    #[serde(deserialize_with = "lenient_bool")]
    pub up: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub down: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub left: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub right: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub boost: bool,
}

/// Only a literal `true` counts.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

/// Non-string values read as absent.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

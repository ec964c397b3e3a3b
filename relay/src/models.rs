use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RelayError;

// Transport session id. Assigned by the hub, unique per socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: ConnectionId,
    pub position: Vec3,
    // Yaw in radians
    pub rotation: f64,
    pub health: u32,
}

// Client → relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinGame,
    PlayerUpdate { position: Vec3, rotation: f64 },
    PlayerShoot,
}

// Relay → client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    PlayerCount {
        count: usize,
    },
    CurrentPlayers {
        players: Vec<PlayerRecord>,
    },
    PlayerJoined {
        id: ConnectionId,
        position: Vec3,
        rotation: f64,
    },
    PlayerMoved {
        id: ConnectionId,
        position: Vec3,
        rotation: f64,
    },
    PlayerShot {
        id: ConnectionId,
    },
    PlayerLeft {
        id: ConnectionId,
    },
}

impl ClientEvent {
    pub fn decode(text: &str) -> Result<Self, RelayError> {
        serde_json::from_str(text).map_err(RelayError::Decode)
    }
}

impl ServerEvent {
    pub fn encode(&self) -> Result<String, RelayError> {
        serde_json::to_string(self).map_err(RelayError::Encode)
    }
}

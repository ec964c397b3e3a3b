// relay holds the player registry and the fan-out of player events

pub mod hub;
pub mod models;

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;

use crate::models::{ClientEvent, ConnectionId, PlayerRecord, ServerEvent, Vec3};

pub use hub::{HubHandle, RelayHub, RelayStatus, Session};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay hub has stopped")]
    HubClosed,

    #[error("malformed client event: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode server event: {0}")]
    Encode(#[source] serde_json::Error),
}

// Where outgoing events go. The relay decides recipients, the outbox delivers.
pub trait Outbox {
    fn deliver(&mut self, to: ConnectionId, event: ServerEvent);
}

// Records every delivery in order
impl Outbox for Vec<(ConnectionId, ServerEvent)> {
    fn deliver(&mut self, to: ConnectionId, event: ServerEvent) {
        self.push((to, event));
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub spawn_position: Vec3,
    pub spawn_health: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            spawn_position: Vec3::new(0.0, 5.0, 0.0),
            spawn_health: 100,
        }
    }
}

// Authoritative set of connected players. Owned by exactly one event loop;
// every mutation goes through the operations below.
#[derive(Debug, Default)]
pub struct PlayerRelay {
    config: RelayConfig,
    // Every open transport session, joined or not
    sessions: BTreeSet<ConnectionId>,
    players: BTreeMap<ConnectionId, PlayerRecord>,
}

impl PlayerRelay {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            sessions: BTreeSet::new(),
            players: BTreeMap::new(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn player(&self, id: ConnectionId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    pub fn roster(&self) -> Vec<PlayerRecord> {
        self.players.values().cloned().collect()
    }

    fn broadcast(&self, out: &mut dyn Outbox, except: Option<ConnectionId>, event: ServerEvent) {
        for &to in &self.sessions {
            if Some(to) != except {
                out.deliver(to, event.clone());
            }
        }
    }

    // Open a session so it receives broadcasts before (or without) joining
    pub fn connect(&mut self, conn: ConnectionId) {
        log::debug!("connection {} opened", conn);
        self.sessions.insert(conn);
    }

    pub fn handle(&mut self, conn: ConnectionId, event: ClientEvent, out: &mut dyn Outbox) {
        match event {
            ClientEvent::JoinGame => self.join(conn, out),
            ClientEvent::PlayerUpdate { position, rotation } => {
                self.update_position(conn, position, rotation, out)
            }
            ClientEvent::PlayerShoot => self.shoot(conn, out),
        }
    }

    // (Re)spawn the sender. A second join simply resets its record.
    pub fn join(&mut self, conn: ConnectionId, out: &mut dyn Outbox) {
        self.sessions.insert(conn);
        let record = PlayerRecord {
            id: conn,
            position: self.config.spawn_position,
            rotation: 0.0,
            health: self.config.spawn_health,
        };
        self.players.insert(conn, record.clone());

        self.broadcast(
            out,
            None,
            ServerEvent::PlayerCount {
                count: self.players.len(),
            },
        );
        out.deliver(
            conn,
            ServerEvent::CurrentPlayers {
                players: self.roster(),
            },
        );
        self.broadcast(
            out,
            Some(conn),
            ServerEvent::PlayerJoined {
                id: conn,
                position: record.position,
                rotation: record.rotation,
            },
        );
        log::info!(
            "player {} joined, total players: {}",
            conn,
            self.players.len()
        );
    }

    // Only the sender's own record moves. Updates before join are dropped.
    pub fn update_position(
        &mut self,
        conn: ConnectionId,
        position: Vec3,
        rotation: f64,
        out: &mut dyn Outbox,
    ) {
        let Some(player) = self.players.get_mut(&conn) else {
            log::debug!("dropping update from {} without a player", conn);
            return;
        };
        player.position = position;
        player.rotation = rotation;

        self.broadcast(
            out,
            Some(conn),
            ServerEvent::PlayerMoved {
                id: conn,
                position,
                rotation,
            },
        );
    }

    // Fire-and-forget; no hit detection, health is untouched
    pub fn shoot(&mut self, conn: ConnectionId, out: &mut dyn Outbox) {
        self.broadcast(out, Some(conn), ServerEvent::PlayerShot { id: conn });
    }

    // Transport closed: forget the session and its player, tell everyone left
    pub fn leave(&mut self, conn: ConnectionId, out: &mut dyn Outbox) {
        self.sessions.remove(&conn);
        self.players.remove(&conn);

        self.broadcast(
            out,
            None,
            ServerEvent::PlayerCount {
                count: self.players.len(),
            },
        );
        self.broadcast(out, None, ServerEvent::PlayerLeft { id: conn });
        log::info!(
            "player {} left, total players: {}",
            conn,
            self.players.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ConnectionId = ConnectionId(1);
    const B: ConnectionId = ConnectionId(2);

    #[test]
    fn join_sends_count_roster_then_announcement() {
        let mut relay = PlayerRelay::default();
        let mut out: Vec<(ConnectionId, ServerEvent)> = Vec::new();
        relay.connect(A);
        relay.connect(B);
        relay.join(A, &mut out);

        assert_eq!(
            out,
            vec![
                (A, ServerEvent::PlayerCount { count: 1 }),
                (B, ServerEvent::PlayerCount { count: 1 }),
                (
                    A,
                    ServerEvent::CurrentPlayers {
                        players: vec![PlayerRecord {
                            id: A,
                            position: Vec3::new(0.0, 5.0, 0.0),
                            rotation: 0.0,
                            health: 100,
                        }]
                    }
                ),
                (
                    B,
                    ServerEvent::PlayerJoined {
                        id: A,
                        position: Vec3::new(0.0, 5.0, 0.0),
                        rotation: 0.0,
                    }
                ),
            ]
        );
    }

    #[test]
    fn rejoin_resets_record() {
        let mut relay = PlayerRelay::default();
        let mut out: Vec<(ConnectionId, ServerEvent)> = Vec::new();
        relay.join(A, &mut out);
        relay.update_position(A, Vec3::new(9.0, 1.0, 9.0), 2.0, &mut out);
        relay.join(A, &mut out);

        let p = relay.player(A).unwrap();
        assert_eq!(p.position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(p.rotation, 0.0);
        assert_eq!(relay.player_count(), 1);
    }

    #[test]
    fn custom_spawn() {
        let mut relay = PlayerRelay::new(RelayConfig {
            spawn_position: Vec3::new(1.0, 2.0, 3.0),
            spawn_health: 50,
        });
        relay.join(A, &mut Vec::<(ConnectionId, ServerEvent)>::new());
        let p = relay.player(A).unwrap();
        assert_eq!(p.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p.health, 50);
    }

    #[test]
    fn handle_dispatches() {
        let mut relay = PlayerRelay::default();
        let mut out: Vec<(ConnectionId, ServerEvent)> = Vec::new();
        relay.handle(A, ClientEvent::JoinGame, &mut out);
        relay.handle(
            A,
            ClientEvent::PlayerUpdate {
                position: Vec3::new(4.0, 5.0, 6.0),
                rotation: 1.0,
            },
            &mut out,
        );
        assert_eq!(relay.player(A).unwrap().position, Vec3::new(4.0, 5.0, 6.0));
    }
}

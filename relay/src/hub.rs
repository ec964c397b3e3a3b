// Single-task event loop around a `PlayerRelay`.
//
// Every session forwards its client events into one unbounded channel; the hub
// task drains it and runs each event to completion before taking the next, so
// the registry needs no lock and a session's own events keep their order.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::models::{ClientEvent, ConnectionId, ServerEvent};
use crate::{Outbox, PlayerRelay, RelayConfig, RelayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayStatus {
    pub players: usize,
    pub connections: usize,
}

enum Inbound {
    Connect {
        conn: ConnectionId,
        outgoing: UnboundedSender<ServerEvent>,
    },
    Event {
        conn: ConnectionId,
        event: ClientEvent,
    },
    Disconnect {
        conn: ConnectionId,
    },
    Status {
        reply: oneshot::Sender<RelayStatus>,
    },
}

// Per-connection queues. A closed receiver only means the socket is going away.
#[derive(Default)]
struct ChannelOutbox {
    queues: HashMap<ConnectionId, UnboundedSender<ServerEvent>>,
}

impl Outbox for ChannelOutbox {
    fn deliver(&mut self, to: ConnectionId, event: ServerEvent) {
        if let Some(queue) = self.queues.get(&to) {
            if queue.send(event).is_err() {
                log::debug!("outgoing queue for {} is closed", to);
            }
        }
    }
}

pub struct RelayHub;

impl RelayHub {
    // Start the hub task. It stops once every handle and session is dropped,
    // handing back the final registry.
    pub fn spawn(config: RelayConfig) -> (HubHandle, JoinHandle<PlayerRelay>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(PlayerRelay::new(config), rx));
        let handle = HubHandle {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (handle, task)
    }
}

async fn run(mut relay: PlayerRelay, mut rx: UnboundedReceiver<Inbound>) -> PlayerRelay {
    let mut outbox = ChannelOutbox::default();
    while let Some(msg) = rx.recv().await {
        match msg {
            Inbound::Connect { conn, outgoing } => {
                outbox.queues.insert(conn, outgoing);
                relay.connect(conn);
            }
            Inbound::Event { conn, event } => {
                log::debug!("{} -> {:?}", conn, event);
                relay.handle(conn, event, &mut outbox);
            }
            Inbound::Disconnect { conn } => {
                outbox.queues.remove(&conn);
                relay.leave(conn, &mut outbox);
            }
            Inbound::Status { reply } => {
                let _ = reply.send(RelayStatus {
                    players: relay.player_count(),
                    connections: relay.connection_count(),
                });
            }
        }
    }
    log::debug!("relay hub stopped");
    relay
}

#[derive(Clone)]
pub struct HubHandle {
    tx: UnboundedSender<Inbound>,
    next_id: Arc<AtomicU64>,
}

impl HubHandle {
    // Open a new session with a fresh connection id
    pub fn connect(&self) -> Result<Session, RelayError> {
        let conn = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (outgoing, events) = mpsc::unbounded_channel();
        self.tx
            .send(Inbound::Connect { conn, outgoing })
            .map_err(|_| RelayError::HubClosed)?;
        Ok(Session {
            events,
            sender: SessionSender {
                conn,
                tx: self.tx.clone(),
            },
        })
    }

    pub async fn status(&self) -> Result<RelayStatus, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Inbound::Status { reply })
            .map_err(|_| RelayError::HubClosed)?;
        rx.await.map_err(|_| RelayError::HubClosed)
    }
}

// One transport session: the events addressed to it plus a way to talk back.
pub struct Session {
    pub events: UnboundedReceiver<ServerEvent>,
    pub sender: SessionSender,
}

impl Session {
    pub fn id(&self) -> ConnectionId {
        self.sender.conn
    }

    pub fn send(&self, event: ClientEvent) -> Result<(), RelayError> {
        self.sender.send(event)
    }

    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.events.recv().await
    }

    // Split so reading and writing can live in different tasks
    pub fn into_parts(self) -> (SessionSender, UnboundedReceiver<ServerEvent>) {
        (self.sender, self.events)
    }
}

// Dropping the sender is the disconnect signal
pub struct SessionSender {
    conn: ConnectionId,
    tx: UnboundedSender<Inbound>,
}

impl SessionSender {
    pub fn id(&self) -> ConnectionId {
        self.conn
    }

    pub fn send(&self, event: ClientEvent) -> Result<(), RelayError> {
        self.tx
            .send(Inbound::Event {
                conn: self.conn,
                event,
            })
            .map_err(|_| RelayError::HubClosed)
    }
}

impl Drop for SessionSender {
    fn drop(&mut self) {
        let _ = self.tx.send(Inbound::Disconnect { conn: self.conn });
    }
}

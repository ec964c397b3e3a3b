use relay::models::{ClientEvent, ConnectionId, ServerEvent, Vec3};
use relay::{PlayerRelay, RelayConfig, RelayHub};
use tokio::runtime::Builder;

type Recorded = Vec<(ConnectionId, ServerEvent)>;

const A: ConnectionId = ConnectionId(1);
const B: ConnectionId = ConnectionId(2);
const C: ConnectionId = ConnectionId(3);

fn to(out: &Recorded, conn: ConnectionId) -> Vec<&ServerEvent> {
    out.iter()
        .filter(|(to, _)| *to == conn)
        .map(|(_, e)| e)
        .collect()
}

fn joined(conns: &[ConnectionId]) -> PlayerRelay {
    let mut relay = PlayerRelay::new(RelayConfig::default());
    let mut out: Recorded = Vec::new();
    for &c in conns {
        relay.connect(c);
    }
    for &c in conns {
        relay.join(c, &mut out);
    }
    relay
}

#[test]
fn second_joiner_sees_the_first() {
    let mut relay = joined(&[A]);
    relay.connect(B);
    let mut out: Recorded = Vec::new();
    relay.join(B, &mut out);

    let roster = to(&out, B)
        .into_iter()
        .find_map(|e| match e {
            ServerEvent::CurrentPlayers { players } => Some(players.clone()),
            _ => None,
        })
        .expect("joiner gets the roster");
    let ids: Vec<_> = roster.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![A, B]);

    assert!(
        to(&out, A)
            .iter()
            .any(|e| matches!(e, ServerEvent::PlayerJoined { id, .. } if *id == B))
    );
    assert!(
        !to(&out, B)
            .iter()
            .any(|e| matches!(e, ServerEvent::PlayerJoined { .. }))
    );
    // Count goes to everyone
    assert!(to(&out, A).contains(&&ServerEvent::PlayerCount { count: 2 }));
    assert!(to(&out, B).contains(&&ServerEvent::PlayerCount { count: 2 }));
}

#[test]
fn update_before_join_is_ignored() {
    let mut relay = joined(&[B]);
    relay.connect(A);
    let mut out: Recorded = Vec::new();
    relay.update_position(A, Vec3::new(1.0, 1.0, 1.0), 0.3, &mut out);

    assert!(out.is_empty());
    assert!(relay.player(A).is_none());
    assert_eq!(relay.player_count(), 1);
}

#[test]
fn leaver_is_gone_from_later_rosters() {
    let mut relay = joined(&[A]);
    let mut out: Recorded = Vec::new();
    relay.leave(A, &mut out);
    relay.connect(B);
    relay.join(B, &mut out);

    let roster = relay.roster();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, B);
    assert!(to(&out, A).is_empty());
}

#[test]
fn leave_notifies_the_rest() {
    let mut relay = joined(&[A, B, C]);
    let mut out: Recorded = Vec::new();
    relay.leave(B, &mut out);

    for other in [A, C] {
        assert_eq!(
            to(&out, other),
            vec![
                &ServerEvent::PlayerCount { count: 2 },
                &ServerEvent::PlayerLeft { id: B }
            ]
        );
    }
    assert!(to(&out, B).is_empty());
    assert_eq!(relay.connection_count(), 2);
}

#[test]
fn updates_fan_out_to_others_only() {
    let mut relay = joined(&[A, B, C]);
    let mut out: Recorded = Vec::new();
    let position = Vec3::new(3.0, 5.0, -2.0);
    relay.update_position(A, position, 1.25, &mut out);

    let moved = ServerEvent::PlayerMoved {
        id: A,
        position,
        rotation: 1.25,
    };
    assert_eq!(to(&out, B), vec![&moved]);
    assert_eq!(to(&out, C), vec![&moved]);
    assert!(to(&out, A).is_empty());

    let record = relay.player(A).unwrap();
    assert_eq!(record.position, position);
    assert_eq!(record.rotation, 1.25);
    // Nobody else moved
    assert_eq!(relay.player(B).unwrap().position, Vec3::new(0.0, 5.0, 0.0));
}

#[test]
fn shots_reach_others_and_leave_health_alone() {
    let mut relay = joined(&[A, B]);
    let mut out: Recorded = Vec::new();
    relay.shoot(A, &mut out);

    assert_eq!(out, vec![(B, ServerEvent::PlayerShot { id: A })]);
    assert_eq!(relay.player(B).unwrap().health, 100);
}

#[test]
fn watchers_get_counts_without_joining() {
    let mut relay = PlayerRelay::default();
    let mut out: Recorded = Vec::new();
    relay.connect(C);
    relay.join(A, &mut out);

    assert_eq!(to(&out, C), vec![
        &ServerEvent::PlayerCount { count: 1 },
        &ServerEvent::PlayerJoined {
            id: A,
            position: Vec3::new(0.0, 5.0, 0.0),
            rotation: 0.0,
        },
    ]);
}

#[test]
fn hub_relays_between_sessions() {
    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime");

    rt.block_on(async {
        let (hub, task) = RelayHub::spawn(RelayConfig::default());
        let mut a = hub.connect().unwrap();
        let mut b = hub.connect().unwrap();

        a.send(ClientEvent::JoinGame).unwrap();
        assert_eq!(a.recv().await, Some(ServerEvent::PlayerCount { count: 1 }));
        assert!(matches!(
            a.recv().await,
            Some(ServerEvent::CurrentPlayers { players }) if players.len() == 1
        ));
        assert_eq!(b.recv().await, Some(ServerEvent::PlayerCount { count: 1 }));
        assert!(matches!(b.recv().await, Some(ServerEvent::PlayerJoined { id, .. }) if id == a.id()));

        b.send(ClientEvent::JoinGame).unwrap();
        let position = Vec3::new(2.0, 5.0, 2.0);
        a.send(ClientEvent::PlayerUpdate {
            position,
            rotation: 0.5,
        })
        .unwrap();

        let status = hub.status().await.unwrap();
        assert_eq!(status.players, 2);
        assert_eq!(status.connections, 2);

        // b: count, roster, then a's move
        assert_eq!(b.recv().await, Some(ServerEvent::PlayerCount { count: 2 }));
        assert!(matches!(
            b.recv().await,
            Some(ServerEvent::CurrentPlayers { players }) if players.len() == 2
        ));
        assert_eq!(
            b.recv().await,
            Some(ServerEvent::PlayerMoved {
                id: a.id(),
                position,
                rotation: 0.5
            })
        );

        let a_id = a.id();
        drop(a);
        assert_eq!(b.recv().await, Some(ServerEvent::PlayerCount { count: 1 }));
        assert_eq!(b.recv().await, Some(ServerEvent::PlayerLeft { id: a_id }));

        drop(b);
        drop(hub);
        let relay = task.await.unwrap();
        assert_eq!(relay.player_count(), 0);
        assert_eq!(relay.connection_count(), 0);
    });
}

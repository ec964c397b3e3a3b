use relay::models::{ClientEvent, Vec3};
use relay::{RelayConfig, RelayHub};

// Two in-process sessions talking through the hub
#[tokio::main]
async fn main() -> Result<(), relay::RelayError> {
    let (hub, task) = RelayHub::spawn(RelayConfig::default());
    let mut alice = hub.connect()?;
    let mut bob = hub.connect()?;

    alice.send(ClientEvent::JoinGame)?;
    bob.send(ClientEvent::JoinGame)?;
    alice.send(ClientEvent::PlayerUpdate {
        position: Vec3::new(4.0, 5.0, -3.0),
        rotation: 0.8,
    })?;
    alice.send(ClientEvent::PlayerShoot)?;

    println!("status: {:?}", hub.status().await?);
    drop(alice);
    drop(hub);

    while let Some(event) = bob.recv().await {
        println!("bob <- {}", event.encode()?);
        if matches!(event, relay::models::ServerEvent::PlayerLeft { .. }) {
            break;
        }
    }
    drop(bob);

    if let Ok(relay) = task.await {
        println!("players left on shutdown: {}", relay.player_count());
    }
    Ok(())
}

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use axum::routing::get;
use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use image::ImageFormat;
use serde::Serialize;

use relay::models::ClientEvent;
use relay::{HubHandle, RelayConfig, RelayHub, RelayStatus};
use terrain::scatter::ClusterReport;
use terrain::utils::Preview;
use terrain::{
    FloorOptions, FloorSummary, JungleFloor, MapSpec, PhysicsCollector, Placement, SceneCollector,
};

#[derive(Parser)]
#[command(name = "jungle", about = "Jungle floor generator and player relay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the WebSocket player relay
    Serve {
        #[arg(long, env = "JUNGLE_PORT", default_value_t = 3001)]
        port: u16,
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// TOML file overriding spawn position and health
        #[arg(long)]
        relay_config: Option<PathBuf>,
    },
    /// Build the floor and write a top-down preview
    Render {
        /// Map file; the built-in jungle map when omitted
        #[arg(long)]
        map: Option<PathBuf>,
        #[arg(long, default_value = "jungle.png")]
        out: PathBuf,
        /// Also write placements and the build summary as JSON
        #[arg(long)]
        dump: Option<PathBuf>,
        /// Pixels per grid cell
        #[arg(long, default_value_t = 4)]
        scale: u32,
    },
    /// Validate a map file, or print the built-in map as TOML
    Check { map: Option<PathBuf> },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Serve {
            port,
            host,
            relay_config,
        } => {
            let config = match relay_config {
                Some(path) => load_relay_config(&path)?,
                None => RelayConfig::default(),
            };
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("invalid listen address {host}:{port}"))?;
            tokio::runtime::Runtime::new()?.block_on(serve(addr, config))
        }
        Command::Render {
            map,
            out,
            dump,
            scale,
        } => render(map.as_deref(), &out, dump.as_deref(), scale),
        Command::Check { map } => check(map.as_deref()),
    }
}

fn load_map(path: Option<&Path>) -> anyhow::Result<MapSpec> {
    match path {
        Some(p) => Ok(MapSpec::load(p)?),
        None => Ok(MapSpec::jungle()),
    }
}

fn load_relay_config(path: &Path) -> anyhow::Result<RelayConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ---------------------------------------------------------------------------
// render / check

#[derive(Serialize)]
struct FloorDump<'a> {
    summary: &'a FloorSummary,
    rocks: &'a [Placement],
    trees: &'a [Placement],
}

fn warn_under_filled(kind: &str, reports: &[ClusterReport]) {
    for r in reports.iter().filter(|r| r.under_filled()) {
        log::warn!(
            "{} zone {} placed {}/{} after {} attempts",
            kind,
            r.zone,
            r.placed,
            r.requested,
            r.attempts
        );
    }
}

fn render(map: Option<&Path>, out: &Path, dump: Option<&Path>, scale: u32) -> anyhow::Result<()> {
    let spec = load_map(map)?;
    let mut scene = SceneCollector::default();
    let mut physics = PhysicsCollector::default();
    let floor = JungleFloor::build(&spec, FloorOptions::default(), &mut scene, &mut physics)?;
    warn_under_filled("rock", floor.rock_reports());
    warn_under_filled("tree", floor.tree_reports());

    let preview = Preview {
        scale,
        ..Preview::default()
    };
    preview
        .render(floor.height_field(), floor.rocks(), floor.trees())
        .save_with_format(out, ImageFormat::Png)
        .with_context(|| format!("writing {}", out.display()))?;
    log::info!("preview written to {}", out.display());

    if let Some(path) = dump {
        let doc = FloorDump {
            summary: floor.summary(),
            rocks: floor.rocks(),
            trees: floor.trees(),
        };
        fs::write(path, serde_json::to_string_pretty(&doc)?)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("placements written to {}", path.display());
    }
    Ok(())
}

fn check(map: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = map else {
        print!("{}", MapSpec::jungle().to_toml_string()?);
        return Ok(());
    };
    let spec = MapSpec::load(path)?;
    println!(
        "{}: ok ({} control points, {} rock clusters, {} tree zones, {} houses)",
        path.display(),
        spec.river.len(),
        spec.rock_clusters.len(),
        spec.tree_zones.len(),
        spec.houses.len()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// serve

async fn serve(addr: SocketAddr, config: RelayConfig) -> anyhow::Result<()> {
    let (hub, _task) = RelayHub::spawn(config);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/status", get(status))
        .with_state(hub);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("relay listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("shutting down");
        })
        .await?;
    Ok(())
}

async fn status(
    State(hub): State<HubHandle>,
) -> Result<Json<RelayStatus>, (StatusCode, String)> {
    hub.status()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
}

async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<HubHandle>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let session = match hub.connect() {
        Ok(s) => s,
        Err(e) => {
            log::warn!("rejecting socket: {}", e);
            return;
        }
    };
    let id = session.id();
    let (inbound, mut outbound) = session.into_parts();
    let (mut sink, mut stream) = socket.split();

    // hub -> socket
    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match event.encode() {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("dropping event for {}: {}", id, e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // socket -> hub
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match ClientEvent::decode(text.as_str()) {
                Ok(event) => {
                    if inbound.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("{} sent a bad frame: {}", id, e),
            },
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    // Dropping the sender tells the hub this player left
    drop(inbound);
    writer.abort();
    log::debug!("socket {} closed", id);
}

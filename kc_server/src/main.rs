//! King Chu Bridge game server.
//!
//! Runs the single-room game engine behind an axum HTTP/WebSocket front
//! end, serving the static client bundle at the web root.

mod api;
mod config;
mod logging;

use anyhow::anyhow;
use king_chu::RoomActor;
use log::info;
use pico_args::Arguments;

use crate::config::ServerConfig;

const HELP: &str = "\
Run a King Chu Bridge game server

USAGE:
  kc_server [OPTIONS]

OPTIONS:
  --bind        IP:PORT   Server socket bind address   [default: env SERVER_BIND or 127.0.0.1:8080]
  --public-dir  PATH      Static client bundle dir     [default: env PUBLIC_DIR or ./public]

FLAGS:
  -h, --help              Print help information

ENVIRONMENT:
  SERVER_BIND             Server bind address (e.g., 0.0.0.0:8080)
  PUBLIC_DIR              Directory served at the web root
  WS_QUEUE_DEPTH          Per-connection outbound queue depth
  RUST_LOG                Log filter (e.g., info,kc_server=debug)
";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    logging::init();

    let config = ServerConfig::from_env(
        pargs.opt_value_from_str("--bind")?,
        pargs.opt_value_from_str("--public-dir")?,
    )?;
    config.validate()?;

    let (actor, handle) = RoomActor::new();
    tokio::spawn(actor.run());

    let state = api::AppState {
        room: handle,
        ws_queue_depth: config.ws_queue_depth,
    };
    let app = api::create_router(state, &config.public_dir);

    info!("starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow!("failed to bind to {}: {e}", config.bind))?;

    info!(
        "server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("server error: {e}"))?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to install Ctrl+C handler: {e}");
    }
}

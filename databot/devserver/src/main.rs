//! Databot Dev Server Entry Point
//!
//! Usage:
//!   databot-devserver [OPTIONS]
//!
//! Options:
//!   --bind <ADDR>    Listen address (default: 127.0.0.1:8000)
//!   --path <PATH>    WebSocket path (default: /ws)
//!   --mode <MODE>    echo | markdown-demo (default: echo)

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use databot_devserver::{DevServer, Mode, DEFAULT_BIND, DEFAULT_PATH};

/// Databot development assistant endpoint
#[derive(Parser, Debug)]
#[command(name = "databot-devserver")]
#[command(about = "Canned WebSocket assistant for local databot development")]
#[command(version)]
struct Args {
    /// Listen address
    #[arg(long, env = "DATABOT_DEVSERVER_BIND", default_value = DEFAULT_BIND)]
    bind: String,

    /// WebSocket path
    #[arg(long, default_value = DEFAULT_PATH)]
    path: String,

    /// Reply strategy
    #[arg(long, default_value_t = Mode::Echo)]
    mode: Mode,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(bind = %args.bind, path = %args.path, mode = %args.mode, "Starting dev server");

    let server = DevServer::bind(&args.bind, &args.path, args.mode.responder()).await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            Ok(())
        }
    }
}

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{LogStreamClient, SessionOutcome, WebSocketConnector};
use tokio_stream::StreamExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, normalize_ws_url};
use render::Renderer;

/// Follow the command log a worker streams over a websocket.
#[derive(Parser, Debug)]
#[command(name = "cmdlog-viewer", version)]
struct Args {
    /// Websocket endpoint, e.g. ws://localhost:9001
    #[arg(long)]
    url: Option<String>,
    /// Config file to read instead of the default locations.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Append new output instead of redrawing the screen.
    #[arg(long)]
    no_clear: bool,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.url {
        settings.ws_url = url;
    }
    if args.no_clear {
        settings.clear_screen = false;
    }
    init_tracing(&settings.log_level);

    let url = normalize_ws_url(&settings.ws_url)?;
    let client = LogStreamClient::new(WebSocketConnector);
    let handle = client.open(url);

    let mut renderer = Renderer::new(settings.clear_screen);
    let mut updates = handle.updates();
    let mut stdout = io::stdout();
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            update = updates.next() => {
                let Some(snapshot) = update else { break };
                stdout
                    .write_all(renderer.render(&snapshot).as_bytes())
                    .and_then(|_| stdout.flush())
                    .context("failed to write to stdout")?;
                if snapshot.status.is_disconnected() {
                    break;
                }
            }
            _ = &mut interrupt => {
                info!("interrupted, closing log stream");
                break;
            }
        }
    }

    match handle.close().await? {
        SessionOutcome::Failed(err) => {
            error!(error = %err, "log stream failed");
            Ok(ExitCode::FAILURE)
        }
        outcome => {
            info!(?outcome, "log stream closed");
            Ok(ExitCode::SUCCESS)
        }
    }
}

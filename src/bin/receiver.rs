//! Video Receiver Application
//!
//! Listens on each configured port and shows the latest frame per window
//! in the web viewer, falling back to a placeholder when a sender goes
//! quiet.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::thread;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lan_video_streamer::{
    channels::{ChannelEvent, StreamOrchestrator},
    config::AppConfig,
    ui::WebServer,
    video::FrameBoard,
};

#[derive(Parser)]
#[command(name = "receiver")]
#[command(about = "Receive LAN camera streams and serve them in a browser", long_about = None)]
#[command(version)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Viewer HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config_path = args.config.clone().or_else(AppConfig::default_path);

    if args.write_default_config {
        let path = config_path.context("no config path available on this platform")?;
        AppConfig::default().save(&path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    tracing::info!("Starting LAN Video Receiver");

    let mut config = AppConfig::load_or_default(config_path.as_deref())?;
    if let Some(port) = args.http_port {
        config.ui.http_port = port;
    }
    config.validate()?;

    let board = FrameBoard::new();
    if config.ui.enabled {
        let web_server = WebServer::new(config.ui.clone(), board.clone(), false);
        let _web_handle = web_server.start_background();
        tracing::info!("Web UI available at http://{}:{}", config.ui.bind_address, config.ui.http_port);
    } else {
        tracing::warn!("Web UI disabled; frames are received but not shown");
    }

    let mut orchestrator = StreamOrchestrator::new(config.network.clone(), config.display.clone());
    let events = orchestrator.events();
    orchestrator.start_receivers(&config.receivers, &board)?;

    thread::Builder::new()
        .name("events".into())
        .spawn(move || {
            for event in events.iter() {
                match event {
                    ChannelEvent::Started { name, local_addr, .. } => {
                        tracing::info!("[{}] Waiting for frames on {:?}", name, local_addr);
                    }
                    ChannelEvent::BindFailed { name, reason, .. } => {
                        tracing::warn!("[{}] Not running: {}", name, reason);
                    }
                    ChannelEvent::Stopped { .. } => {}
                }
            }
        })?;

    tracing::info!("Receiving on {} channel(s). Press Ctrl+C to stop.", orchestrator.channel_count());
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down...");
    orchestrator.stop_all();
    tokio::task::spawn_blocking(move || orchestrator.join_all()).await?;

    tracing::info!("Receiver stopped");
    Ok(())
}

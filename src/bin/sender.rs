//! Video Sender Application
//!
//! Captures frames from each configured camera and streams them to the
//! receiver, one JPEG per UDP datagram.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::IpAddr;
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
#[command(name = "sender")]
#[command(about = "Stream camera frames to a LAN receiver over UDP", long_about = None)]
#[command(version)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Send every channel to this receiver address
    #[arg(short, long)]
    destination: Option<IpAddr>,

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

    tracing::info!("Starting LAN Video Sender");

    let mut config = AppConfig::load_or_default(config_path.as_deref())?;
    if let Some(destination) = args.destination {
        for sender in &mut config.senders {
            sender.destination = destination;
        }
    }
    config.validate()?;

    for sender in &config.senders {
        tracing::info!(
            "Channel '{}': camera {} -> {} (scale {}, quality {})",
            sender.name,
            sender.camera_index,
            sender.destination_addr(),
            sender.scale,
            sender.quality
        );
    }

    // Previews land on the board; the web UI serves them
    let board = FrameBoard::new();
    if config.ui.enabled {
        let web_server = WebServer::new(config.ui.clone(), board.clone(), true);
        let _web_handle = web_server.start_background();
        tracing::info!("Web UI available at http://{}:{}", config.ui.bind_address, config.ui.http_port);
    }

    let mut orchestrator = StreamOrchestrator::new(config.network.clone(), config.display.clone());
    let events = orchestrator.events();
    orchestrator.start_senders(&config.senders, &board)?;

    thread::Builder::new()
        .name("events".into())
        .spawn(move || {
            for event in events.iter() {
                match event {
                    ChannelEvent::Started { name, local_addr, .. } => {
                        tracing::info!("[{}] Started from {:?}", name, local_addr);
                    }
                    ChannelEvent::BindFailed { name, reason, .. } => {
                        tracing::warn!("[{}] Not running: {}", name, reason);
                    }
                    ChannelEvent::Stopped { .. } => {}
                }
            }
        })?;

    tracing::info!("Streaming {} channel(s). Press Ctrl+C to stop.", orchestrator.channel_count());
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down...");
    orchestrator.stop_all();
    tokio::task::spawn_blocking(move || orchestrator.join_all()).await?;

    tracing::info!("Sender stopped");
    Ok(())
}

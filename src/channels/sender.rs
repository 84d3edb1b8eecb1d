//! Capture-and-send channel

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::ChannelState;
use crate::config::{NetworkConfig, SenderChannelConfig};
use crate::constants::STATS_INTERVAL_SECS;
use crate::error::{NetworkError, Result};
use crate::network::{SenderStats, VideoSender};
use crate::protocol::Envelope;
use crate::video::{ClockOverlay, FrameSink, FrameSource};

/// Per-channel counters
#[derive(Debug, Clone, Default)]
pub struct SendChannelStats {
    pub frames_captured: u64,
    /// Iterations where the device had nothing
    pub empty_frames: u64,
    pub send_failures: u64,
}

/// Captures from one device and fires each frame at one destination
pub struct SendChannel {
    config: SenderChannelConfig,
    network: NetworkConfig,
    source: Box<dyn FrameSource>,
    envelope: Envelope,
    sender: Option<VideoSender>,
    preview: Option<Box<dyn FrameSink>>,
    overlay: Option<ClockOverlay>,
    state: ChannelState,
    stats: SendChannelStats,
}

impl SendChannel {
    /// Build an unbound channel. `preview` is only used when the config
    /// asks for a local preview.
    pub fn new(
        config: SenderChannelConfig,
        network: &NetworkConfig,
        source: Box<dyn FrameSource>,
        preview: Option<Box<dyn FrameSink>>,
    ) -> Result<Self> {
        let envelope = Envelope::new(config.codec())?;
        let overlay = config
            .overlay_clock
            .then(|| ClockOverlay::sender().with_offset_ms(config.clock_offset_ms));
        let preview = if config.show_preview { preview } else { None };

        Ok(Self {
            config,
            network: network.clone(),
            source,
            envelope,
            sender: None,
            preview,
            overlay,
            state: ChannelState::Unbound,
            stats: SendChannelStats::default(),
        })
    }

    /// Open the UDP endpoint for the destination
    pub fn bind(&mut self) -> Result<()> {
        match VideoSender::new(self.config.destination_addr(), &self.network) {
            Ok(sender) => {
                self.sender = Some(sender);
                self.state.transition(ChannelState::Bound)?;
                tracing::info!(
                    "[{}] Sending {} to {}",
                    self.config.name,
                    self.source.describe(),
                    self.config.destination_addr()
                );
                Ok(())
            }
            Err(e) => {
                self.state.transition(ChannelState::Failed)?;
                tracing::error!("[{}] Could not open socket: {}", self.config.name, e);
                Err(e.into())
            }
        }
    }

    /// Capture, stamp, preview, pack and send one frame.
    ///
    /// Returns the payload size. Empty frames are still sent as empty
    /// datagrams.
    pub fn run_once(&mut self) -> std::result::Result<usize, NetworkError> {
        let mut frame = self.source.read_frame();
        if frame.is_empty() {
            self.stats.empty_frames += 1;
        } else {
            self.stats.frames_captured += 1;
            if let Some(overlay) = &self.overlay {
                overlay.apply(&mut frame);
            }
        }

        if let Some(preview) = self.preview.as_mut() {
            preview.show(&self.config.name, &frame);
        }

        let message = self.envelope.pack(&frame);
        let sender = self.sender.as_mut().ok_or(NetworkError::NotBound)?;
        sender.send(message.as_bytes()).inspect_err(|_| {
            self.stats.send_failures += 1;
        })
    }

    /// Loop until `running` is cleared. Paced only by the capture device.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        self.state.transition(ChannelState::Running)?;
        let mut last_stats_time = Instant::now();

        while running.load(Ordering::Relaxed) {
            match self.run_once() {
                Ok(_) => {}
                Err(e @ NetworkError::PacketTooLarge(_)) => {
                    tracing::warn!("[{}] Frame dropped: {}", self.config.name, e);
                }
                Err(e) => {
                    tracing::debug!("[{}] Send failed: {}", self.config.name, e);
                }
            }

            if last_stats_time.elapsed() >= Duration::from_secs(STATS_INTERVAL_SECS) {
                last_stats_time = Instant::now();
                let encoder = self.envelope.codec().encoder().stats();
                let net = self.sender_stats();
                tracing::info!(
                    "[{}] {} frames captured, {} empty, {} packets sent, {:.1} KB sent, avg frame {:.0} bytes",
                    self.config.name,
                    self.stats.frames_captured,
                    self.stats.empty_frames,
                    net.packets_sent,
                    net.bytes_sent as f64 / 1024.0,
                    encoder.average_frame_size
                );
            }
        }

        self.state.transition(ChannelState::Stopped)?;
        tracing::info!("[{}] Stopped", self.config.name);
        Ok(())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.sender.as_ref().and_then(|s| s.local_addr())
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn config(&self) -> &SenderChannelConfig {
        &self.config
    }

    /// Get statistics
    pub fn stats(&self) -> &SendChannelStats {
        &self.stats
    }

    /// Socket counters, zero before bind
    pub fn sender_stats(&self) -> SenderStats {
        self.sender.as_ref().map(|s| s.stats().clone()).unwrap_or_default()
    }
}

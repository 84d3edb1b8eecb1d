//! Receive-and-display channel

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use super::ChannelState;
use crate::config::{CodecConfig, DisplayConfig, NetworkConfig, ReceivePolicy, ReceiverChannelConfig};
use crate::constants::STATS_INTERVAL_SECS;
use crate::error::Result;
use crate::network::{Received, VideoReceiver};
use crate::protocol::Envelope;
use crate::video::{load_placeholder, ClockOverlay, Frame, FrameSink};

/// Pause after a receive error before the next attempt
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// What one loop iteration put on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shown {
    /// A decoded frame
    Frame,
    /// The fallback placeholder
    Placeholder,
    /// Nothing; the window keeps its previous contents
    Nothing,
}

/// Per-channel counters
#[derive(Debug, Clone, Default)]
pub struct ReceiveChannelStats {
    pub frames_shown: u64,
    pub placeholders_shown: u64,
    /// Datagrams that carried no usable frame
    pub absent_frames: u64,
    pub timeouts: u64,
    pub receive_errors: u64,
}

/// Listens on one port and displays whatever frame arrived last
pub struct ReceiveChannel {
    config: ReceiverChannelConfig,
    receiver: VideoReceiver,
    envelope: Envelope,
    sink: Box<dyn FrameSink>,
    placeholder: Frame,
    overlay: Option<ClockOverlay>,
    display_delay: Duration,
    state: ChannelState,
    stats: ReceiveChannelStats,
}

impl ReceiveChannel {
    pub fn new(
        config: ReceiverChannelConfig,
        network: &NetworkConfig,
        display: &DisplayConfig,
        sink: Box<dyn FrameSink>,
    ) -> Result<Self> {
        let envelope = Envelope::new(CodecConfig::decode_only())?;
        let placeholder = load_placeholder(
            display.placeholder_path.as_deref(),
            display.placeholder_width,
            display.placeholder_height,
        );
        let overlay = config.overlay_clock.then(ClockOverlay::receiver);

        Ok(Self {
            receiver: VideoReceiver::new(config.port, network),
            config,
            envelope,
            sink,
            placeholder,
            overlay,
            display_delay: display.display_delay(),
            state: ChannelState::Unbound,
            stats: ReceiveChannelStats::default(),
        })
    }

    /// Bind the listen port. A failure leaves the channel `Failed` for good.
    pub fn bind(&mut self) -> Result<()> {
        match self.receiver.bind() {
            Ok(()) => {
                self.state.transition(ChannelState::Bound)?;
                tracing::info!(
                    "[{}] Listening on {}",
                    self.config.window_name,
                    self.local_addr().map(|a| a.to_string()).unwrap_or_default()
                );
                Ok(())
            }
            Err(e) => {
                self.state.transition(ChannelState::Failed)?;
                tracing::error!("[{}] Could not bind port {}: {}", self.config.window_name, self.config.port, e);
                Err(e.into())
            }
        }
    }

    /// Receive, unpack and display one frame
    pub fn run_once(&mut self) -> Shown {
        let policy = self.config.policy;

        let shown = match self.receiver.receive_next(policy) {
            Ok(Received::Datagram { message, .. }) => {
                let mut frame = self.envelope.unpack(&message);
                if frame.is_empty() {
                    self.stats.absent_frames += 1;
                    self.show_absent(policy)
                } else {
                    if let Some(overlay) = &self.overlay {
                        overlay.apply(&mut frame);
                    }
                    self.sink.show(&self.config.window_name, &frame);
                    self.stats.frames_shown += 1;
                    Shown::Frame
                }
            }
            Ok(Received::TimedOut) => {
                self.stats.timeouts += 1;
                self.show_placeholder()
            }
            Err(e) => {
                tracing::debug!("[{}] Receive failed: {}", self.config.window_name, e);
                self.stats.receive_errors += 1;
                // A failing socket returns at once; don't let the loop spin.
                thread::sleep(RECEIVE_ERROR_BACKOFF);
                self.show_absent(policy)
            }
        };

        if shown != Shown::Nothing && !self.display_delay.is_zero() {
            thread::sleep(self.display_delay);
        }
        shown
    }

    /// No frame this cycle: the fallback policy shows the placeholder,
    /// the blocking policy leaves the window alone.
    fn show_absent(&mut self, policy: ReceivePolicy) -> Shown {
        if policy.shows_placeholder() {
            self.show_placeholder()
        } else {
            Shown::Nothing
        }
    }

    fn show_placeholder(&mut self) -> Shown {
        self.sink.show(&self.config.window_name, &self.placeholder);
        self.stats.placeholders_shown += 1;
        Shown::Placeholder
    }

    /// Loop until `running` is cleared. Checked once per iteration, so a
    /// blocking receiver exits after its next datagram.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        self.state.transition(ChannelState::Running)?;
        let mut last_stats_time = Instant::now();

        while running.load(Ordering::Relaxed) {
            self.run_once();

            if last_stats_time.elapsed() >= Duration::from_secs(STATS_INTERVAL_SECS) {
                last_stats_time = Instant::now();
                let net = self.receiver.stats();
                tracing::info!(
                    "[{}] {} frames shown, {} placeholders, {} timeouts, {} packets, {:.1} KB received",
                    self.config.window_name,
                    self.stats.frames_shown,
                    self.stats.placeholders_shown,
                    self.stats.timeouts,
                    net.packets_received,
                    net.bytes_received as f64 / 1024.0
                );
            }
        }

        self.state.transition(ChannelState::Stopped)?;
        tracing::info!("[{}] Stopped", self.config.window_name);
        Ok(())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.receiver.local_addr()
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn config(&self) -> &ReceiverChannelConfig {
        &self.config
    }

    pub fn placeholder(&self) -> &Frame {
        &self.placeholder
    }

    /// Get statistics
    pub fn stats(&self) -> &ReceiveChannelStats {
        &self.stats
    }
}

//! Multi-channel fan-out
//!
//! Each channel gets its own OS thread and shares nothing with the others
//! except the stop flag. Lifecycle events come back on a crossbeam channel.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::{ReceiveChannel, SendChannel};
use crate::config::{DisplayConfig, NetworkConfig, ReceiverChannelConfig, SenderChannelConfig};
use crate::error::{ChannelError, Result};
use crate::video::{open_device, FrameBoard, FrameSink, FrameSource, UnavailableSource};

/// Which way a channel moves frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    Send,
    Receive,
}

/// Lifecycle report from a channel thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Started {
        name: String,
        role: ChannelRole,
        local_addr: Option<SocketAddr>,
    },
    BindFailed {
        name: String,
        role: ChannelRole,
        reason: String,
    },
    Stopped {
        name: String,
        role: ChannelRole,
    },
}

struct ChannelHandle {
    name: String,
    role: ChannelRole,
    /// Where to poke a blocking receiver so it sees the stop flag
    wake_addr: Arc<Mutex<Option<SocketAddr>>>,
    thread: JoinHandle<()>,
}

/// Starts a fixed set of independent channels and stops them together
pub struct StreamOrchestrator {
    running: Arc<AtomicBool>,
    handles: Vec<ChannelHandle>,
    events_tx: Sender<ChannelEvent>,
    events_rx: Receiver<ChannelEvent>,
    network: NetworkConfig,
    display: DisplayConfig,
}

impl StreamOrchestrator {
    pub fn new(network: NetworkConfig, display: DisplayConfig) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            handles: Vec::new(),
            events_tx,
            events_rx,
            network,
            display,
        }
    }

    /// Spawn a receive channel on thread `recv-<port>`
    pub fn spawn_receiver(&mut self, config: ReceiverChannelConfig, sink: Box<dyn FrameSink>) -> Result<()> {
        let name = config.window_name.clone();
        let running = self.running.clone();
        let events = self.events_tx.clone();
        let wake_addr = Arc::new(Mutex::new(None));
        let wake_slot = wake_addr.clone();
        let network = self.network.clone();
        let display = self.display.clone();
        let thread_name = format!("recv-{}", config.port);

        let thread = thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let name = config.window_name.clone();
                let role = ChannelRole::Receive;

                let mut channel = match ReceiveChannel::new(config, &network, &display, sink) {
                    Ok(channel) => channel,
                    Err(e) => {
                        tracing::error!("[{}] Setup failed: {}", name, e);
                        let _ = events.send(ChannelEvent::BindFailed { name, role, reason: e.to_string() });
                        return;
                    }
                };
                if let Err(e) = channel.bind() {
                    let _ = events.send(ChannelEvent::BindFailed { name, role, reason: e.to_string() });
                    return;
                }

                let local_addr = channel.local_addr();
                *wake_slot.lock() = local_addr;
                let _ = events.send(ChannelEvent::Started { name: name.clone(), role, local_addr });

                if let Err(e) = channel.run(&running) {
                    tracing::error!("[{}] {}", name, e);
                }
                let _ = events.send(ChannelEvent::Stopped { name, role });
            })
            .map_err(|e| ChannelError::SpawnFailed(e.to_string()))?;

        self.handles.push(ChannelHandle { name, role: ChannelRole::Receive, wake_addr, thread });
        Ok(())
    }

    /// Spawn a send channel on thread `send-<port>`.
    ///
    /// The capture device is opened inside the thread. If it cannot be
    /// opened the channel still runs and sends empty frames.
    pub fn spawn_sender(
        &mut self,
        config: SenderChannelConfig,
        preview: Option<Box<dyn FrameSink>>,
    ) -> Result<()> {
        let name = config.name.clone();
        let running = self.running.clone();
        let events = self.events_tx.clone();
        let network = self.network.clone();
        let thread_name = format!("send-{}", config.port);

        let thread = thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let name = config.name.clone();
                let role = ChannelRole::Send;

                let source: Box<dyn FrameSource> = match open_device(config.camera_index, &config.capture) {
                    Ok(source) => source,
                    Err(e) => {
                        tracing::warn!("[{}] Camera {} unavailable: {}", name, config.camera_index, e);
                        Box::new(UnavailableSource::new(e.to_string()))
                    }
                };

                let mut channel = match SendChannel::new(config, &network, source, preview) {
                    Ok(channel) => channel,
                    Err(e) => {
                        tracing::error!("[{}] Setup failed: {}", name, e);
                        let _ = events.send(ChannelEvent::BindFailed { name, role, reason: e.to_string() });
                        return;
                    }
                };
                if let Err(e) = channel.bind() {
                    let _ = events.send(ChannelEvent::BindFailed { name, role, reason: e.to_string() });
                    return;
                }

                let local_addr = channel.local_addr();
                let _ = events.send(ChannelEvent::Started { name: name.clone(), role, local_addr });

                if let Err(e) = channel.run(&running) {
                    tracing::error!("[{}] {}", name, e);
                }
                let _ = events.send(ChannelEvent::Stopped { name, role });
            })
            .map_err(|e| ChannelError::SpawnFailed(e.to_string()))?;

        self.handles.push(ChannelHandle {
            name,
            role: ChannelRole::Send,
            wake_addr: Arc::new(Mutex::new(None)),
            thread,
        });
        Ok(())
    }

    /// Start every configured sender. Previews go to `board` when enabled.
    pub fn start_senders(&mut self, configs: &[SenderChannelConfig], board: &FrameBoard) -> Result<()> {
        for config in configs {
            let preview = config
                .show_preview
                .then(|| Box::new(board.clone()) as Box<dyn FrameSink>);
            self.spawn_sender(config.clone(), preview)?;
        }
        Ok(())
    }

    /// Start every configured receiver, all displaying on `board`
    pub fn start_receivers(&mut self, configs: &[ReceiverChannelConfig], board: &FrameBoard) -> Result<()> {
        for config in configs {
            self.spawn_receiver(config.clone(), Box::new(board.clone()))?;
        }
        Ok(())
    }

    /// Lifecycle events from all channels
    pub fn events(&self) -> Receiver<ChannelEvent> {
        self.events_rx.clone()
    }

    pub fn channel_count(&self) -> usize {
        self.handles.len()
    }

    /// Shared stop flag; clearing it stops every channel
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Signal every channel to stop.
    ///
    /// Blocking receivers only check the flag between datagrams, so each
    /// bound receiver also gets a zero-length datagram.
    pub fn stop_all(&self) {
        self.running.store(false, Ordering::SeqCst);

        let waker = match UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))) {
            Ok(socket) => socket,
            Err(e) => {
                tracing::warn!("Could not open wake socket: {}", e);
                return;
            }
        };
        for handle in &self.handles {
            if let Some(addr) = *handle.wake_addr.lock() {
                if let Err(e) = waker.send_to(&[], loopback_for(addr)) {
                    tracing::debug!("[{}] Wake datagram failed: {}", handle.name, e);
                }
            }
        }
    }

    /// Wait for every channel thread to exit
    pub fn join_all(&mut self) {
        for handle in self.handles.drain(..) {
            if handle.thread.join().is_err() {
                tracing::error!("[{}] {:?} channel thread panicked", handle.name, handle.role);
            }
        }
    }
}

impl Drop for StreamOrchestrator {
    fn drop(&mut self) {
        self.stop_all();
        self.join_all();
    }
}

/// A wildcard bind address is reachable on loopback
fn loopback_for(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port()),
        _ => addr,
    }
}

//! UDP frame receiver
//!
//! Listens on one port and hands back one datagram per call. Under the
//! timeout policy a silent sender shows up as `Received::TimedOut`, which
//! the channel turns into the placeholder image.

use bytes::Bytes;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use super::udp::{create_socket, UdpSocket};
use crate::config::{NetworkConfig, ReceivePolicy};
use crate::constants::MAX_DATAGRAM_SIZE;
use crate::error::NetworkError;
use crate::protocol::WireMessage;

/// Outcome of one receive call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// A datagram arrived; its payload may be empty
    Datagram { message: WireMessage, from: SocketAddr },
    /// Nothing arrived within the timeout
    TimedOut,
}

/// Receiver statistics
#[derive(Debug, Clone, Default)]
pub struct ReceiverStats {
    pub packets_received: u64,
    pub bytes_received: u64,
    pub empty_packets: u64,
    pub timeouts: u64,
    pub receive_errors: u64,
}

/// One UDP endpoint listening on a fixed port
pub struct VideoReceiver {
    port: u16,
    config: NetworkConfig,
    socket: Option<UdpSocket>,
    /// Sized for the largest datagram so nothing is truncated
    buffer: Vec<u8>,
    /// Read timeout currently set on the socket
    read_timeout: Option<Duration>,
    stats: ReceiverStats,
}

impl VideoReceiver {
    /// Create an unbound receiver for `port`
    pub fn new(port: u16, config: &NetworkConfig) -> Self {
        Self {
            port,
            config: config.clone(),
            socket: None,
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
            read_timeout: None,
            stats: ReceiverStats::default(),
        }
    }

    /// Bind the listen port. Not retried; the caller treats failure as fatal.
    pub fn bind(&mut self) -> Result<(), NetworkError> {
        if self.socket.is_some() {
            return Err(NetworkError::BindFailed(format!("port {} already bound", self.port)));
        }
        let addr = SocketAddr::new(self.config.bind_address, self.port);
        let socket = create_socket(addr, &self.config)?;
        self.socket = Some(socket);
        self.read_timeout = None;
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.socket.is_some()
    }

    /// Configured port (0 means ephemeral)
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Actual bound address
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Wait for the next datagram according to `policy`.
    ///
    /// `Blocking` waits indefinitely. `TimeoutWithFallback` returns
    /// `Received::TimedOut` once the timeout passes with no traffic.
    pub fn receive_next(&mut self, policy: ReceivePolicy) -> Result<Received, NetworkError> {
        let socket = self.socket.as_ref().ok_or(NetworkError::NotBound)?;

        let timeout = policy.timeout();
        if timeout != self.read_timeout {
            socket
                .set_read_timeout(timeout)
                .map_err(|e| NetworkError::ReceiveFailed(format!("set timeout: {}", e)))?;
            self.read_timeout = timeout;
        }

        match socket.recv_from(&mut self.buffer) {
            Ok((len, from)) => {
                self.stats.packets_received += 1;
                self.stats.bytes_received += len as u64;
                if len == 0 {
                    self.stats.empty_packets += 1;
                }
                let message = WireMessage::from(Bytes::copy_from_slice(&self.buffer[..len]));
                Ok(Received::Datagram { message, from })
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                self.stats.timeouts += 1;
                Ok(Received::TimedOut)
            }
            Err(e) => {
                self.stats.receive_errors += 1;
                Err(NetworkError::ReceiveFailed(e.to_string()))
            }
        }
    }

    /// Get statistics
    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }
}

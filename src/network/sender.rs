//! UDP frame sender
//!
//! Fires one datagram per call at a fixed destination. No retries, no
//! acknowledgement, no fragmentation.

use std::net::SocketAddr;

use super::udp::{create_socket, ephemeral_for, UdpSocket};
use crate::config::NetworkConfig;
use crate::constants::MAX_DATAGRAM_SIZE;
use crate::error::NetworkError;

/// Sender statistics
#[derive(Debug, Clone, Default)]
pub struct SenderStats {
    pub packets_sent: u64,
    pub bytes_sent: u64,
    pub empty_packets: u64,
    pub send_errors: u64,
    pub oversize_rejected: u64,
}

/// One UDP endpoint sending to one destination
pub struct VideoSender {
    socket: UdpSocket,
    destination: SocketAddr,
    stats: SenderStats,
}

impl VideoSender {
    /// Bind an ephemeral local socket for `destination`
    pub fn new(destination: SocketAddr, config: &NetworkConfig) -> Result<Self, NetworkError> {
        let socket = create_socket(ephemeral_for(destination), config)?;
        Ok(Self {
            socket,
            destination,
            stats: SenderStats::default(),
        })
    }

    /// Send one payload as one datagram.
    ///
    /// Payloads over `MAX_DATAGRAM_SIZE` are rejected without touching the
    /// socket. The OS may still refuse payloads just under that limit
    /// (IPv4 tops out at 65507), which surfaces as `SendFailed`.
    pub fn send(&mut self, payload: &[u8]) -> Result<usize, NetworkError> {
        if payload.len() > MAX_DATAGRAM_SIZE {
            self.stats.oversize_rejected += 1;
            return Err(NetworkError::PacketTooLarge(payload.len()));
        }

        match self.socket.send_to(payload, self.destination) {
            Ok(sent) => {
                self.stats.packets_sent += 1;
                self.stats.bytes_sent += sent as u64;
                if sent == 0 {
                    self.stats.empty_packets += 1;
                }
                Ok(sent)
            }
            Err(e) => {
                self.stats.send_errors += 1;
                Err(NetworkError::SendFailed(format!("{} bytes to {}: {}", payload.len(), self.destination, e)))
            }
        }
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    /// Get statistics
    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn listener() -> (std::net::UdpSocket, SocketAddr) {
        let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let addr = socket.local_addr().unwrap();
        (socket, addr)
    }

    #[test]
    fn test_send_datagram() {
        let (listener, addr) = listener();
        let mut sender = VideoSender::new(addr, &NetworkConfig::default()).unwrap();

        assert_eq!(sender.send(b"frame").unwrap(), 5);

        let mut buf = [0u8; 64];
        let (n, _) = listener.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"frame");
        assert_eq!(sender.stats().packets_sent, 1);
        assert_eq!(sender.stats().bytes_sent, 5);
    }

    #[test]
    fn test_send_empty_datagram() {
        let (listener, addr) = listener();
        let mut sender = VideoSender::new(addr, &NetworkConfig::default()).unwrap();

        assert_eq!(sender.send(&[]).unwrap(), 0);

        let mut buf = [0u8; 64];
        let (n, _) = listener.recv_from(&mut buf).unwrap();
        assert_eq!(n, 0);
        assert_eq!(sender.stats().empty_packets, 1);
    }

    #[test]
    fn test_oversize_rejected() {
        let (_listener, addr) = listener();
        let mut sender = VideoSender::new(addr, &NetworkConfig::default()).unwrap();

        let payload = vec![0u8; MAX_DATAGRAM_SIZE + 1];
        assert!(matches!(
            sender.send(&payload),
            Err(NetworkError::PacketTooLarge(n)) if n == MAX_DATAGRAM_SIZE + 1
        ));
        assert_eq!(sender.stats().oversize_rejected, 1);
        assert_eq!(sender.stats().packets_sent, 0);
    }
}

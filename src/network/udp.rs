//! UDP socket setup

use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

pub use std::net::UdpSocket;

use crate::config::NetworkConfig;
use crate::error::NetworkError;

/// Create a UDP socket bound to `bind_addr` with the configured buffer sizes.
///
/// Buffer sizes are a request; the OS may clamp them, which is logged but
/// not treated as an error. A bind failure is returned as `BindFailed`.
pub fn create_socket(bind_addr: SocketAddr, config: &NetworkConfig) -> Result<UdpSocket, NetworkError> {
    let socket = Socket::new(Domain::for_address(bind_addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| NetworkError::SocketCreate(e.to_string()))?;

    if config.reuse_address {
        socket
            .set_reuse_address(true)
            .map_err(|e| NetworkError::SocketCreate(format!("SO_REUSEADDR: {}", e)))?;
    }

    if let Err(e) = socket.set_recv_buffer_size(config.recv_buffer_size) {
        tracing::warn!("Could not set receive buffer to {} bytes: {}", config.recv_buffer_size, e);
    }
    if let Err(e) = socket.set_send_buffer_size(config.send_buffer_size) {
        tracing::warn!("Could not set send buffer to {} bytes: {}", config.send_buffer_size, e);
    }

    socket
        .bind(&bind_addr.into())
        .map_err(|e| NetworkError::BindFailed(format!("{}: {}", bind_addr, e)))?;

    Ok(socket.into())
}

/// Wildcard address of the same family as `peer`, on an ephemeral port
pub fn ephemeral_for(peer: SocketAddr) -> SocketAddr {
    let ip = match peer.ip() {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    SocketAddr::new(ip, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ephemeral_socket() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let socket = create_socket(addr, &NetworkConfig::default()).unwrap();
        assert_ne!(socket.local_addr().unwrap().port(), 0);
    }

    #[test]
    fn test_port_collision_fails() {
        let first = create_socket("0.0.0.0:0".parse().unwrap(), &NetworkConfig::default()).unwrap();
        let taken = first.local_addr().unwrap();

        let second = create_socket(taken, &NetworkConfig::default());
        assert!(matches!(second, Err(NetworkError::BindFailed(_))));
    }

    #[test]
    fn test_ephemeral_for_family() {
        let v4: SocketAddr = "192.168.1.3:4000".parse().unwrap();
        assert_eq!(ephemeral_for(v4), "0.0.0.0:0".parse().unwrap());

        let v6: SocketAddr = "[::1]:4000".parse().unwrap();
        assert_eq!(ephemeral_for(v6), "[::]:0".parse().unwrap());
    }
}

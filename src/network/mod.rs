//! Network subsystem for UDP frame transport

pub mod receiver;
pub mod sender;
pub mod udp;

pub use receiver::{Received, ReceiverStats, VideoReceiver};
pub use sender::{SenderStats, VideoSender};
pub use udp::{create_socket, UdpSocket};

//! Error types for the video streaming application

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capture device errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Invalid capture format: {0}")]
    InvalidFormat(String),

    #[error("Image load failed: {0}")]
    ImageLoad(String),
}

/// Codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid JPEG quality: {0} (expected 1-100)")]
    InvalidQuality(u8),

    #[error("Invalid downscale factor: {0} (expected 0 < scale <= 1)")]
    InvalidScale(f32),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Decoding failed: {0}")]
    DecodingFailed(String),
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Socket creation failed: {0}")]
    SocketCreate(String),

    #[error("Socket bind failed: {0}")]
    BindFailed(String),

    #[error("Socket is not bound")]
    NotBound,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),
}

/// Stream channel errors
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: crate::channels::ChannelState,
        to: crate::channels::ChannelState,
    },

    #[error("Failed to spawn channel thread: {0}")]
    SpawnFailed(String),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

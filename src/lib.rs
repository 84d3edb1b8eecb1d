//! # LAN Video Streamer
//!
//! Low-latency camera streaming over LAN, one compressed frame per UDP datagram.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              SENDER PC                                   │
//! │  ┌────────────┐        ┌────────────┐        ┌────────────┐             │
//! │  │  Camera 0  │        │  Camera 1  │        │  Camera 2  │             │
//! │  └─────┬──────┘        └─────┬──────┘        └─────┬──────┘             │
//! │        ▼                     ▼                     ▼                    │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │             Stream Orchestrator (channels::orchestrator)          │   │
//! │  │   send-6000             send-5000             send-4000           │   │
//! │  │  ┌───────────┐         ┌───────────┐         ┌───────────┐       │   │
//! │  │  │ Clock     │         │ Clock     │         │ Clock     │       │   │
//! │  │  │ Overlay   │         │ Overlay   │         │ Overlay   │       │   │
//! │  │  └─────┬─────┘         └─────┬─────┘         └─────┬─────┘       │   │
//! │  │        ▼                     ▼                     ▼             │   │
//! │  │  ┌───────────┐         ┌───────────┐         ┌───────────┐       │   │
//! │  │  │ Envelope  │         │ Envelope  │         │ Envelope  │       │   │
//! │  │  │ scale+JPEG│         │ scale+JPEG│         │ scale+JPEG│       │   │
//! │  │  └─────┬─────┘         └─────┬─────┘         └─────┬─────┘       │   │
//! │  │        ▼                     ▼                     ▼             │   │
//! │  │  ┌───────────┐         ┌───────────┐         ┌───────────┐       │   │
//! │  │  │UDP Sender │         │UDP Sender │         │UDP Sender │       │   │
//! │  │  └─────┬─────┘         └─────┬─────┘         └─────┬─────┘       │   │
//! │  └────────┼─────────────────────┼─────────────────────┼─────────────┘   │
//! └───────────┼─────────────────────┼─────────────────────┼─────────────────┘
//!             │   one JPEG per datagram, no header, 0 bytes = no frame
//!             ▼                     ▼                     ▼
//! ┌───────────┼─────────────────────┼─────────────────────┼─────────────────┐
//! │           │          RECEIVER PC│                     │                  │
//! │  ┌────────┼─────────────────────┼─────────────────────┼─────────────┐   │
//! │  │  ┌─────┴─────┐         ┌─────┴─────┐         ┌─────┴─────┐       │   │
//! │  │  │UDP Recv   │         │UDP Recv   │         │UDP Recv   │       │   │
//! │  │  │ :6000     │         │ :5000     │         │ :4000     │       │   │
//! │  │  └─────┬─────┘         └─────┬─────┘         └─────┬─────┘       │   │
//! │  │        ▼ timeout?            ▼                     ▼             │   │
//! │  │  ┌───────────┐         ┌───────────┐         ┌───────────┐       │   │
//! │  │  │ Unpack or │         │ Unpack or │         │ Unpack or │       │   │
//! │  │  │Placeholder│         │Placeholder│         │Placeholder│       │   │
//! │  │  └─────┬─────┘         └─────┬─────┘         └─────┬─────┘       │   │
//! │  └────────┼─────────────────────┼─────────────────────┼─────────────┘   │
//! │           ▼                     ▼                     ▼                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │           Frame Board (video::display) + HTTP viewer (ui)          │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod channels;
pub mod codec;
pub mod config;
pub mod error;
pub mod network;
pub mod protocol;
pub mod ui;
pub mod video;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Largest UDP payload the receive buffer accepts
    pub const MAX_DATAGRAM_SIZE: usize = 65535;

    /// Largest width or height accepted from a received payload
    pub const MAX_DECODED_DIMENSION: u32 = 4096;

    /// Allocation ceiling while decoding one received payload
    pub const MAX_DECODED_ALLOC: u64 = 64 * 1024 * 1024;

    /// Default JPEG quality for outgoing frames
    pub const DEFAULT_JPEG_QUALITY: u8 = 60;

    /// JPEG quality used when re-encoding frames for the viewer
    pub const VIEWER_JPEG_QUALITY: u8 = 90;

    /// Default downscale factor applied before compression
    pub const DEFAULT_SCALE: f32 = 0.6;

    /// Default receive timeout for the fallback policy
    pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 1000;

    /// Pause after each displayed frame to rate-limit redraws
    pub const DEFAULT_DISPLAY_DELAY_MS: u64 = 15;

    /// Default capture resolution
    pub const DEFAULT_CAPTURE_WIDTH: u32 = 640;
    pub const DEFAULT_CAPTURE_HEIGHT: u32 = 480;

    /// Default capture rate of synthetic sources
    pub const DEFAULT_CAPTURE_FPS: u32 = 30;

    /// Default HTTP port for the viewer
    pub const DEFAULT_HTTP_PORT: u16 = 8080;

    /// Default destination for sender channels
    pub const DEFAULT_DESTINATION: &str = "127.0.0.1";

    /// Interval between periodic per-channel stats log lines
    pub const STATS_INTERVAL_SECS: u64 = 5;

    /// Socket buffer size requested from the OS
    pub const DEFAULT_SOCKET_BUFFER_SIZE: usize = 1 << 20;
}

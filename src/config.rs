//! Application configuration
//!
//! Everything is fixed at startup: channel layout, codec settings, socket
//! options and the viewer address. Stored as TOML.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::error::{CodecError, Error, Result};

/// Top-level configuration shared by the sender and receiver binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub ui: UiConfig,
    pub display: DisplayConfig,
    pub senders: Vec<SenderChannelConfig>,
    pub receivers: Vec<ReceiverChannelConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Three cameras fanned out to three receiver windows.
        let destination: IpAddr = DEFAULT_DESTINATION
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        let senders = [(6000, 0), (5000, 1), (4000, 2)]
            .into_iter()
            .map(|(port, camera_index)| SenderChannelConfig {
                name: format!("Camera {}", camera_index),
                destination,
                port,
                camera_index,
                ..Default::default()
            })
            .collect();

        let receivers = [4000, 5000, 6000]
            .into_iter()
            .enumerate()
            .map(|(i, port)| ReceiverChannelConfig {
                window_name: format!("Streaming Video {}", i),
                port,
                ..Default::default()
            })
            .collect();

        Self {
            network: NetworkConfig::default(),
            ui: UiConfig::default(),
            display: DisplayConfig::default(),
            senders,
            receivers,
        }
    }
}

impl AppConfig {
    /// Platform config location, e.g. `~/.config/lan-video-streamer/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "LanVideoStreamer", "lan-video-streamer")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Write the config as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Check every channel before anything is started
    pub fn validate(&self) -> Result<()> {
        for sender in &self.senders {
            sender.validate()?;
        }

        let mut ports = HashSet::new();
        for receiver in &self.receivers {
            receiver.validate()?;
            if !ports.insert(receiver.port) {
                return Err(Error::Config(format!(
                    "receiver port {} is used by more than one channel",
                    receiver.port
                )));
            }
        }

        if self.display.placeholder_width == 0 || self.display.placeholder_height == 0 {
            return Err(Error::Config("placeholder size must be non-zero".into()));
        }

        Ok(())
    }
}

/// UDP socket options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Local address receivers bind to
    pub bind_address: IpAddr,
    pub send_buffer_size: usize,
    pub recv_buffer_size: usize,
    /// SO_REUSEADDR; leave off so a port collision is a bind failure
    pub reuse_address: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            send_buffer_size: DEFAULT_SOCKET_BUFFER_SIZE,
            recv_buffer_size: DEFAULT_SOCKET_BUFFER_SIZE,
            reuse_address: false,
        }
    }
}

/// HTTP viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub enabled: bool,
    pub bind_address: IpAddr,
    pub http_port: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Display-side settings shared by all receiver windows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Image shown while a sender is silent; a generated card is used if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_path: Option<PathBuf>,
    pub placeholder_width: u32,
    pub placeholder_height: u32,
    pub display_delay_ms: u64,
}

impl DisplayConfig {
    pub fn display_delay(&self) -> Duration {
        Duration::from_millis(self.display_delay_ms)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            placeholder_path: None,
            placeholder_width: DEFAULT_CAPTURE_WIDTH,
            placeholder_height: DEFAULT_CAPTURE_HEIGHT,
            display_delay_ms: DEFAULT_DISPLAY_DELAY_MS,
        }
    }
}

/// JPEG codec settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Downscale factor in (0, 1]
    pub scale: f32,
    /// JPEG quality, 1-100
    pub quality: u8,
}

impl CodecConfig {
    /// Settings for the receive side, which only decodes
    pub fn decode_only() -> Self {
        Self {
            scale: 1.0,
            quality: VIEWER_JPEG_QUALITY,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), CodecError> {
        if !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(CodecError::InvalidScale(self.scale));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(CodecError::InvalidQuality(self.quality));
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Where a sender channel gets its frames from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureSource {
    /// Synthetic moving pattern, one look per camera index
    TestPattern { width: u32, height: u32, fps: u32 },
    /// A still image re-emitted at a fixed rate
    StillImage { path: PathBuf, fps: u32 },
}

impl Default for CaptureSource {
    fn default() -> Self {
        CaptureSource::TestPattern {
            width: DEFAULT_CAPTURE_WIDTH,
            height: DEFAULT_CAPTURE_HEIGHT,
            fps: DEFAULT_CAPTURE_FPS,
        }
    }
}

/// How a receiver waits for the next datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReceivePolicy {
    /// Wait forever; show exactly what arrives
    Blocking,
    /// Poll with a timeout; show the placeholder when nothing arrives
    TimeoutWithFallback { timeout_ms: u64 },
}

impl ReceivePolicy {
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            ReceivePolicy::Blocking => None,
            ReceivePolicy::TimeoutWithFallback { timeout_ms } => {
                Some(Duration::from_millis(*timeout_ms))
            }
        }
    }

    /// Whether an absent frame is replaced by the placeholder
    pub fn shows_placeholder(&self) -> bool {
        matches!(self, ReceivePolicy::TimeoutWithFallback { .. })
    }
}

impl Default for ReceivePolicy {
    fn default() -> Self {
        ReceivePolicy::TimeoutWithFallback {
            timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
        }
    }
}

/// One capture-and-send pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderChannelConfig {
    /// Preview window name
    pub name: String,
    pub destination: IpAddr,
    pub port: u16,
    pub camera_index: u32,
    pub scale: f32,
    pub quality: u8,
    pub show_preview: bool,
    /// Stamp the local wall clock onto each frame before sending
    pub overlay_clock: bool,
    /// Added to the stamped clock, for comparing against a skewed receiver
    pub clock_offset_ms: i64,
    pub capture: CaptureSource,
}

impl SenderChannelConfig {
    pub fn destination_addr(&self) -> SocketAddr {
        SocketAddr::new(self.destination, self.port)
    }

    pub fn codec(&self) -> CodecConfig {
        CodecConfig {
            scale: self.scale,
            quality: self.quality,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config(format!("sender '{}' has no port", self.name)));
        }
        self.codec()
            .validate()
            .map_err(|e| Error::Config(format!("sender '{}': {}", self.name, e)))?;
        match &self.capture {
            CaptureSource::TestPattern { width, height, fps } => {
                if *width == 0 || *height == 0 || *fps == 0 {
                    return Err(Error::Config(format!(
                        "sender '{}': test pattern needs non-zero size and fps",
                        self.name
                    )));
                }
            }
            CaptureSource::StillImage { fps, .. } => {
                if *fps == 0 {
                    return Err(Error::Config(format!(
                        "sender '{}': still image needs a non-zero fps",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for SenderChannelConfig {
    fn default() -> Self {
        Self {
            name: "Camera 0".to_string(),
            destination: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 4000,
            camera_index: 0,
            scale: DEFAULT_SCALE,
            quality: DEFAULT_JPEG_QUALITY,
            show_preview: false,
            overlay_clock: true,
            clock_offset_ms: 0,
            capture: CaptureSource::default(),
        }
    }
}

/// One receive-and-display pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverChannelConfig {
    pub window_name: String,
    pub port: u16,
    /// Stamp the local wall clock onto each displayed frame
    pub overlay_clock: bool,
    pub policy: ReceivePolicy,
}

impl ReceiverChannelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config(format!(
                "receiver '{}' has no port",
                self.window_name
            )));
        }
        if self.policy.timeout() == Some(Duration::ZERO) {
            return Err(Error::Config(format!(
                "receiver '{}': timeout must be greater than zero",
                self.window_name
            )));
        }
        Ok(())
    }
}

impl Default for ReceiverChannelConfig {
    fn default() -> Self {
        Self {
            window_name: "Streaming Video 0".to_string(),
            port: 4000,
            overlay_clock: true,
            policy: ReceivePolicy::default(),
        }
    }
}

//! Wire protocol
//!
//! A datagram carries exactly one compressed frame and nothing else:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ JPEG bytes (0 ..= 65535)                      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! A zero-length datagram is meaningful: the sender had no frame this cycle.

use bytes::Bytes;

use crate::codec::FrameCodec;
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::video::Frame;

pub use crate::constants::MAX_DATAGRAM_SIZE;

/// Payload of one datagram
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireMessage(Bytes);

impl WireMessage {
    /// The "no frame" message
    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the payload fits in a single datagram
    pub fn fits_datagram(&self) -> bool {
        self.0.len() <= MAX_DATAGRAM_SIZE
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for WireMessage {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for WireMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl AsRef<[u8]> for WireMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Frame <-> datagram payload conversion for one channel
pub struct Envelope {
    codec: FrameCodec,
}

impl Envelope {
    pub fn new(config: CodecConfig) -> Result<Self, CodecError> {
        Ok(Self {
            codec: FrameCodec::new(config)?,
        })
    }

    /// Turn a frame into a payload; the empty frame packs to an empty message
    pub fn pack(&mut self, frame: &Frame) -> WireMessage {
        WireMessage(self.codec.encode(frame))
    }

    /// Rebuild a frame; an empty or malformed message unpacks to the empty frame
    pub fn unpack(&mut self, message: &WireMessage) -> Frame {
        if message.is_empty() {
            return Frame::empty();
        }
        self.codec.decode(message.as_bytes())
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }
}

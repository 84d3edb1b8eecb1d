//! JPEG frame codec
//!
//! Per-channel encode (downscale + compress) and decode, each with its
//! own statistics.

pub mod decoder;
pub mod encoder;

pub use decoder::{decode_image, DecoderStats, FrameDecoder};
pub use encoder::{compress_jpeg, EncoderStats, FrameEncoder};

use bytes::Bytes;

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::video::Frame;

/// Encoder and decoder pair for one channel
pub struct FrameCodec {
    encoder: FrameEncoder,
    decoder: FrameDecoder,
}

impl FrameCodec {
    pub fn new(config: CodecConfig) -> Result<Self, CodecError> {
        Ok(Self {
            encoder: FrameEncoder::new(config)?,
            decoder: FrameDecoder::new(),
        })
    }

    /// Downscale and compress; empty frame gives empty bytes
    pub fn encode(&mut self, frame: &Frame) -> Bytes {
        self.encoder.encode(frame)
    }

    /// Decompress; empty or corrupt bytes give the empty frame
    pub fn decode(&mut self, data: &[u8]) -> Frame {
        self.decoder.decode(data)
    }

    pub fn encoder(&self) -> &FrameEncoder {
        &self.encoder
    }

    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }
}

//! JPEG frame encoder
//!
//! Downscales and compresses frames for transmission. Never fails the
//! caller: an empty or unencodable frame produces an empty payload.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::borrow::Cow;

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::video::Frame;

/// JPEG-compress an RGB image at the given quality
pub fn compress_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Vec::with_capacity((image.width() * image.height() / 4) as usize);
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image
        .write_with_encoder(encoder)
        .map_err(|e| CodecError::EncodingFailed(e.to_string()))?;
    Ok(buffer)
}

/// Downscaling JPEG encoder
pub struct FrameEncoder {
    config: CodecConfig,
    /// Frame counter for statistics
    frames_encoded: u64,
    /// Empty frames passed through as empty payloads
    empty_frames: u64,
    /// Frames the JPEG encoder rejected
    failures: u64,
    /// Total bytes produced
    bytes_produced: u64,
}

impl FrameEncoder {
    /// Create an encoder; rejects out-of-range scale or quality
    pub fn new(config: CodecConfig) -> Result<Self, CodecError> {
        config.validate()?;
        Ok(Self {
            config,
            frames_encoded: 0,
            empty_frames: 0,
            failures: 0,
            bytes_produced: 0,
        })
    }

    /// Output size for an input of `width` x `height`
    pub fn scaled_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.config.scale >= 1.0 {
            return (width, height);
        }
        let scale = |v: u32| ((v as f32 * self.config.scale).round() as u32).max(1);
        (scale(width), scale(height))
    }

    fn downscale<'a>(&self, image: &'a RgbImage) -> Cow<'a, RgbImage> {
        let (width, height) = image.dimensions();
        let (target_w, target_h) = self.scaled_dimensions(width, height);
        if (target_w, target_h) == (width, height) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(imageops::resize(image, target_w, target_h, FilterType::Triangle))
        }
    }

    /// Downscale then compress. Empty in, empty out.
    pub fn encode(&mut self, frame: &Frame) -> Bytes {
        let Some(image) = frame.image() else {
            self.empty_frames += 1;
            return Bytes::new();
        };

        let scaled = self.downscale(image);
        match compress_jpeg(&scaled, self.config.quality) {
            Ok(data) => {
                self.frames_encoded += 1;
                self.bytes_produced += data.len() as u64;
                Bytes::from(data)
            }
            Err(e) => {
                tracing::debug!("Frame encoding failed: {}", e);
                self.failures += 1;
                Bytes::new()
            }
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Get statistics
    pub fn stats(&self) -> EncoderStats {
        EncoderStats {
            frames_encoded: self.frames_encoded,
            empty_frames: self.empty_frames,
            failures: self.failures,
            bytes_produced: self.bytes_produced,
            average_frame_size: if self.frames_encoded > 0 {
                self.bytes_produced as f32 / self.frames_encoded as f32
            } else {
                0.0
            },
        }
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.frames_encoded = 0;
        self.empty_frames = 0;
        self.failures = 0;
        self.bytes_produced = 0;
    }
}

/// Encoder statistics
#[derive(Debug, Clone)]
pub struct EncoderStats {
    pub frames_encoded: u64,
    pub empty_frames: u64,
    pub failures: u64,
    pub bytes_produced: u64,
    pub average_frame_size: f32,
}

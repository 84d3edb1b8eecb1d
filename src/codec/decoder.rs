//! Frame decoder
//!
//! Turns a received payload back into a frame. Empty, truncated or
//! corrupt payloads all come out as the empty frame.

use image::{ImageReader, Limits, RgbImage};
use std::io::Cursor;

use crate::constants::{MAX_DECODED_ALLOC, MAX_DECODED_DIMENSION};
use crate::error::CodecError;
use crate::video::Frame;

/// Decode any image format the `image` crate recognises into RGB.
///
/// Header dimensions are checked before any pixel buffer is allocated, so
/// a corrupt header claiming a huge image is rejected cheaply.
pub fn decode_image(data: &[u8]) -> Result<RgbImage, CodecError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DECODED_DIMENSION);
    limits.max_image_height = Some(MAX_DECODED_DIMENSION);
    limits.max_alloc = Some(MAX_DECODED_ALLOC);

    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CodecError::DecodingFailed(e.to_string()))?;
    reader.limits(limits);

    reader
        .decode()
        .map(|image| image.into_rgb8())
        .map_err(|e| CodecError::DecodingFailed(e.to_string()))
}

/// Frame decoder with statistics
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Frames decoded
    frames_decoded: u64,
    /// Zero-length payloads
    empty_inputs: u64,
    /// Payloads that failed to decode
    decode_failures: u64,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a payload; never fails
    pub fn decode(&mut self, data: &[u8]) -> Frame {
        if data.is_empty() {
            self.empty_inputs += 1;
            return Frame::empty();
        }

        match decode_image(data) {
            Ok(image) => {
                self.frames_decoded += 1;
                Frame::from_image(image)
            }
            Err(e) => {
                tracing::debug!("Dropping undecodable payload ({} bytes): {}", data.len(), e);
                self.decode_failures += 1;
                Frame::empty()
            }
        }
    }

    /// Get statistics
    pub fn stats(&self) -> DecoderStats {
        DecoderStats {
            frames_decoded: self.frames_decoded,
            empty_inputs: self.empty_inputs,
            decode_failures: self.decode_failures,
        }
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.frames_decoded = 0;
        self.empty_inputs = 0;
        self.decode_failures = 0;
    }
}

/// Decoder statistics
#[derive(Debug, Clone)]
pub struct DecoderStats {
    pub frames_decoded: u64,
    pub empty_inputs: u64,
    pub decode_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encoder::compress_jpeg;
    use image::Rgb;

    fn sample_jpeg() -> Vec<u8> {
        let image = RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, 77]));
        compress_jpeg(&image, 80).unwrap()
    }

    #[test]
    fn test_decode_jpeg() {
        let mut decoder = FrameDecoder::new();
        let frame = decoder.decode(&sample_jpeg());
        assert_eq!(frame.dimensions(), Some((64, 48)));
        assert_eq!(decoder.stats().frames_decoded, 1);
    }

    #[test]
    fn test_empty_input() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.decode(&[]).is_empty());
        assert!(decoder.decode(&[]).is_empty());
        assert_eq!(decoder.stats().empty_inputs, 2);
        assert_eq!(decoder.stats().decode_failures, 0);
    }

    #[test]
    fn test_garbage_input() {
        let mut decoder = FrameDecoder::new();
        let frame = decoder.decode(&[0x42; 300]);
        assert!(frame.is_empty());
        assert_eq!(decoder.stats().decode_failures, 1);
    }

    #[test]
    fn test_truncated_input_does_not_panic() {
        let jpeg = sample_jpeg();
        let mut decoder = FrameDecoder::new();
        for cut in [2, 20, jpeg.len() / 2] {
            let frame = decoder.decode(&jpeg[..cut]);
            // A decoder may recover a partial image, but never a different size.
            if let Some(dims) = frame.dimensions() {
                assert_eq!(dims, (64, 48));
            }
        }
    }

    #[test]
    fn test_oversized_header_rejected() {
        let mut jpeg = compress_jpeg(&RgbImage::new(16, 16), 60).unwrap();

        // SOF0: marker, length (2), precision (1), height (2), width (2)
        let sof = jpeg.windows(2).position(|w| w == [0xFF, 0xC0]).unwrap();
        let claimed = 10_000u16.to_be_bytes();
        jpeg[sof + 5..sof + 7].copy_from_slice(&claimed);
        jpeg[sof + 7..sof + 9].copy_from_slice(&claimed);
        assert!(jpeg.len() < 1024);

        assert!(matches!(decode_image(&jpeg), Err(CodecError::DecodingFailed(_))));

        let mut decoder = FrameDecoder::new();
        assert!(decoder.decode(&jpeg).is_empty());
        assert_eq!(decoder.stats().decode_failures, 1);
        assert_eq!(decoder.stats().frames_decoded, 0);
    }

    #[test]
    fn test_decode_png_payload() {
        let image = RgbImage::from_pixel(7, 3, Rgb([1, 2, 3]));
        let mut png = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let frame = FrameDecoder::new().decode(&png);
        assert_eq!(frame.dimensions(), Some((7, 3)));
    }
}

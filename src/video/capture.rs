//! Frame sources for sender channels
//!
//! A source stands in for a capture device: each `read_frame` call blocks
//! for roughly one device frame interval and returns whatever the device
//! produced, or an empty frame when nothing is available.

use image::{Rgb, RgbImage};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use super::Frame;
use crate::config::CaptureSource;
use crate::error::CaptureError;

/// How long an unavailable device stalls before reporting an empty frame
pub const UNAVAILABLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Anything that can hand out frames, one per call
pub trait FrameSource: Send {
    /// Next frame from the device; empty if none is available
    fn read_frame(&mut self) -> Frame;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Open the configured source for a camera index
pub fn open_device(
    index: u32,
    source: &CaptureSource,
) -> Result<Box<dyn FrameSource>, CaptureError> {
    match source {
        CaptureSource::TestPattern { width, height, fps } => {
            Ok(Box::new(TestPatternSource::new(index, *width, *height, *fps)?))
        }
        CaptureSource::StillImage { path, fps } => {
            Ok(Box::new(StillImageSource::open(path, *fps)?))
        }
    }
}

/// Sleeps until the next frame deadline, like a device delivering at its
/// natural rate.
#[derive(Debug)]
struct FramePacer {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl FramePacer {
    fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / fps.max(1),
            next_deadline: None,
        }
    }

    fn wait(&mut self) {
        let now = Instant::now();
        let deadline = match self.next_deadline {
            Some(deadline) if deadline > now => {
                thread::sleep(deadline - now);
                deadline
            }
            // First frame, or we fell behind: don't try to catch up.
            _ => now,
        };
        self.next_deadline = Some(deadline + self.interval);
    }
}

/// Synthetic camera: a colour gradient with a sweeping bar.
///
/// The base hue depends on the camera index so that several channels are
/// easy to tell apart on the receiving side.
pub struct TestPatternSource {
    index: u32,
    width: u32,
    height: u32,
    frame_count: u64,
    pacer: FramePacer,
}

impl TestPatternSource {
    pub fn new(index: u32, width: u32, height: u32, fps: u32) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidFormat(format!(
                "test pattern {}x{} for camera {}",
                width, height, index
            )));
        }
        Ok(Self {
            index,
            width,
            height,
            frame_count: 0,
            pacer: FramePacer::new(fps),
        })
    }

    /// Frames produced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn render(&self) -> RgbImage {
        let tint = [
            (u64::from(self.index) * 97 % 256) as u8,
            (u64::from(self.index) * 53 % 256) as u8,
            (u64::from(self.index) * 151 % 256) as u8,
        ];
        let bar_width = (self.width / 16).max(1);
        let bar_x = (self.frame_count.wrapping_mul(4) % u64::from(self.width)) as u32;

        RgbImage::from_fn(self.width, self.height, |x, y| {
            if x >= bar_x && x - bar_x < bar_width {
                return Rgb([255, 255, 255]);
            }
            let gx = (u64::from(x) * 255 / u64::from(self.width)) as u8;
            let gy = (u64::from(y) * 255 / u64::from(self.height)) as u8;
            Rgb([
                gx.wrapping_add(tint[0]),
                gy.wrapping_add(tint[1]),
                (gx / 2).wrapping_add(gy / 2).wrapping_add(tint[2]),
            ])
        })
    }
}

impl FrameSource for TestPatternSource {
    fn read_frame(&mut self) -> Frame {
        self.pacer.wait();
        let image = self.render();
        self.frame_count = self.frame_count.wrapping_add(1);
        Frame::from_image(image)
    }

    fn describe(&self) -> String {
        format!("test pattern {}x{} (camera {})", self.width, self.height, self.index)
    }
}

/// Re-emits one decoded image file
pub struct StillImageSource {
    image: RgbImage,
    label: String,
    pacer: FramePacer,
}

impl StillImageSource {
    pub fn open(path: &Path, fps: u32) -> Result<Self, CaptureError> {
        let image = image::open(path)
            .map_err(|e| CaptureError::ImageLoad(format!("{}: {}", path.display(), e)))?
            .into_rgb8();
        Ok(Self {
            image,
            label: path.display().to_string(),
            pacer: FramePacer::new(fps),
        })
    }
}

impl FrameSource for StillImageSource {
    fn read_frame(&mut self) -> Frame {
        self.pacer.wait();
        Frame::from_image(self.image.clone())
    }

    fn describe(&self) -> String {
        format!("still image {}", self.label)
    }
}

/// A device that could not be opened. Yields empty frames forever.
pub struct UnavailableSource {
    reason: String,
}

impl UnavailableSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl FrameSource for UnavailableSource {
    fn read_frame(&mut self) -> Frame {
        thread::sleep(UNAVAILABLE_POLL_INTERVAL);
        Frame::empty()
    }

    fn describe(&self) -> String {
        format!("unavailable ({})", self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_dimensions() {
        let mut source = TestPatternSource::new(0, 640, 480, 1000).unwrap();
        let frame = source.read_frame();
        assert_eq!(frame.dimensions(), Some((640, 480)));
        assert_eq!(source.frame_count(), 1);
    }

    #[test]
    fn test_pattern_moves() {
        let mut source = TestPatternSource::new(1, 64, 48, 1000).unwrap();
        let first = source.read_frame().into_image().unwrap();
        let second = source.read_frame().into_image().unwrap();
        assert_ne!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_pattern_long_running_counter() {
        let mut source = TestPatternSource::new(u32::MAX, 64, 48, 1000).unwrap();
        source.frame_count = (1u64 << 30) + 3;

        let image = source.render();
        // 4 * (2^30 + 3) wraps nothing in u64; the bar sits at 12 modulo 64.
        assert_eq!(image.get_pixel(12, 0), &Rgb([255, 255, 255]));
        assert_ne!(image.get_pixel(11, 0), &Rgb([255, 255, 255]));

        source.frame_count = u64::MAX;
        assert_eq!(source.read_frame().dimensions(), Some((64, 48)));
    }

    #[test]
    fn test_pattern_rejects_zero_size() {
        assert!(TestPatternSource::new(0, 0, 480, 30).is_err());
    }

    #[test]
    fn test_pattern_paced() {
        let mut source = TestPatternSource::new(0, 16, 16, 50).unwrap();
        let start = Instant::now();
        for _ in 0..3 {
            source.read_frame();
        }
        // First frame is immediate, the next two wait one interval each.
        assert!(start.elapsed() >= Duration::from_millis(35));
    }

    #[test]
    fn test_still_image_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        RgbImage::from_pixel(32, 24, Rgb([10, 20, 30])).save(&path).unwrap();

        let mut source = StillImageSource::open(&path, 1000).unwrap();
        let frame = source.read_frame();
        assert_eq!(frame.dimensions(), Some((32, 24)));
        assert_eq!(frame.image().unwrap().get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_open_missing_still_image_fails() {
        let source = CaptureSource::StillImage {
            path: "/nonexistent/frame.png".into(),
            fps: 30,
        };
        assert!(open_device(0, &source).is_err());
    }

    #[test]
    fn test_unavailable_source_yields_empty() {
        let mut source = UnavailableSource::new("no camera");
        assert!(source.read_frame().is_empty());
        assert!(source.read_frame().is_empty());
    }
}

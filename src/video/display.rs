//! Display side: frame sinks and the fallback placeholder
//!
//! A sink receives one frame per channel iteration and never reports back.
//! `FrameBoard` keeps the latest frame per window so the HTTP viewer can
//! serve it; each window slot is written by exactly one channel.

use dashmap::DashMap;
use image::{Rgb, RgbImage};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use super::overlay::{draw_text, text_height, text_width};
use super::Frame;

/// Fire-and-forget frame display
pub trait FrameSink: Send {
    fn show(&mut self, window: &str, frame: &Frame);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn show(&mut self, _window: &str, _frame: &Frame) {}
}

struct WindowSlot {
    frame: Frame,
    updates: u64,
    updated_at: Instant,
}

/// Summary of one window for the viewer API
#[derive(Debug, Clone, Serialize)]
pub struct WindowSnapshot {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub updates: u64,
    pub age_ms: u64,
}

/// Latest frame per window, shared between channels and the viewer
#[derive(Clone, Default)]
pub struct FrameBoard {
    windows: Arc<DashMap<String, WindowSlot>>,
}

impl FrameBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest frame shown in `window`
    pub fn latest(&self, window: &str) -> Option<Frame> {
        self.windows.get(window).map(|slot| slot.frame.clone())
    }

    /// Number of times `window` has been drawn
    pub fn updates(&self, window: &str) -> u64 {
        self.windows.get(window).map(|slot| slot.updates).unwrap_or(0)
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// All windows, sorted by name
    pub fn snapshot(&self) -> Vec<WindowSnapshot> {
        let mut windows: Vec<WindowSnapshot> = self
            .windows
            .iter()
            .map(|entry| {
                let (width, height) = entry.frame.dimensions().unwrap_or((0, 0));
                WindowSnapshot {
                    name: entry.key().clone(),
                    width,
                    height,
                    updates: entry.updates,
                    age_ms: entry.updated_at.elapsed().as_millis() as u64,
                }
            })
            .collect();
        windows.sort_by(|a, b| a.name.cmp(&b.name));
        windows
    }
}

impl FrameSink for FrameBoard {
    fn show(&mut self, window: &str, frame: &Frame) {
        // Nothing to draw for an empty frame.
        if frame.is_empty() {
            return;
        }
        let now = Instant::now();
        if let Some(mut slot) = self.windows.get_mut(window) {
            slot.frame = frame.clone();
            slot.updates += 1;
            slot.updated_at = now;
            return;
        }
        self.windows.insert(
            window.to_string(),
            WindowSlot {
                frame: frame.clone(),
                updates: 1,
                updated_at: now,
            },
        );
    }
}

/// Load the placeholder image, or generate a "NO SIGNAL" card when no
/// path is configured or the file can't be read.
pub fn load_placeholder(path: Option<&Path>, width: u32, height: u32) -> Frame {
    if let Some(path) = path {
        match image::open(path) {
            Ok(image) => return Frame::from_image(image.into_rgb8()),
            Err(e) => {
                tracing::warn!("Placeholder {} unusable ({}), using generated card", path.display(), e);
            }
        }
    }
    no_signal_card(width, height)
}

/// Dark card with "NO SIGNAL" centred on it
pub fn no_signal_card(width: u32, height: u32) -> Frame {
    let width = width.max(1);
    let height = height.max(1);
    let mut image = RgbImage::from_pixel(width, height, Rgb([32, 32, 40]));

    let label = "NO SIGNAL";
    let mut scale = 6;
    while scale > 1 && text_width(label, scale) > width {
        scale -= 1;
    }
    let x = width.saturating_sub(text_width(label, scale)) / 2;
    let y = height.saturating_sub(text_height(scale)) / 2;
    draw_text(&mut image, label, x, y, scale, Rgb([200, 200, 200]));

    Frame::from_image(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> Frame {
        Frame::from_image(RgbImage::from_pixel(width, height, Rgb([1, 2, 3])))
    }

    #[test]
    fn test_board_keeps_latest() {
        let mut board = FrameBoard::new();
        board.show("a", &solid(10, 10));
        board.show("a", &solid(20, 10));
        board.show("b", &solid(5, 5));

        assert_eq!(board.latest("a").unwrap().dimensions(), Some((20, 10)));
        assert_eq!(board.updates("a"), 2);
        assert_eq!(board.window_count(), 2);
        assert!(board.latest("c").is_none());
    }

    #[test]
    fn test_board_ignores_empty_frames() {
        let mut board = FrameBoard::new();
        board.show("a", &solid(10, 10));
        board.show("a", &Frame::empty());
        assert_eq!(board.updates("a"), 1);
        assert!(!board.latest("a").unwrap().is_empty());
    }

    #[test]
    fn test_board_clones_share_state() {
        let board = FrameBoard::new();
        let mut writer = board.clone();
        writer.show("cam", &solid(8, 8));

        let snapshot = board.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "cam");
        assert_eq!((snapshot[0].width, snapshot[0].height), (8, 8));
    }

    #[test]
    fn test_generated_placeholder() {
        let frame = load_placeholder(None, 640, 480);
        assert_eq!(frame.dimensions(), Some((640, 480)));
        let image = frame.image().unwrap();
        assert!(image.pixels().any(|p| *p == Rgb([200, 200, 200])));
    }

    #[test]
    fn test_placeholder_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.png");
        RgbImage::from_pixel(100, 50, Rgb([9, 9, 9])).save(&path).unwrap();

        let frame = load_placeholder(Some(&path), 640, 480);
        assert_eq!(frame.dimensions(), Some((100, 50)));
    }

    #[test]
    fn test_missing_placeholder_file_falls_back() {
        let frame = load_placeholder(Some(Path::new("/nonexistent/team.jpg")), 320, 240);
        assert_eq!(frame.dimensions(), Some((320, 240)));
    }

    #[test]
    fn test_tiny_card_does_not_panic() {
        let frame = no_signal_card(3, 2);
        assert_eq!(frame.dimensions(), Some((3, 2)));
    }
}

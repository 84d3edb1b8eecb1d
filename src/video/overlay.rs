//! Text overlays drawn straight into frame pixels
//!
//! Used to stamp the wall clock onto frames on both ends of a link, so the
//! end-to-end delay can be read off the receiver's window, and to label the
//! generated placeholder card.

use chrono::{Duration as ChronoDuration, Local};
use image::{Rgb, RgbImage};

use super::Frame;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// 5x7 bitmap glyphs, one byte per row, bit 4 is the leftmost column.
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        'A' => [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        _ => return None,
    };
    Some(rows)
}

/// Pixel width of `text` rendered at `scale`
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    (chars * (GLYPH_WIDTH + 1) - 1) * scale
}

/// Pixel height of one line of text at `scale`
pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale
}

/// Draw `text` with its top-left corner at (x, y). Clipped at the image
/// edge; characters without a glyph render as blanks.
pub fn draw_text(image: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1);
    let (width, height) = image.dimensions();
    let mut cursor = x;

    for c in text.chars() {
        if let Some(rows) = glyph(c.to_ascii_uppercase()) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    let px = cursor + col * scale;
                    let py = y + row as u32 * scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let (tx, ty) = (px + dx, py + dy);
                            if tx < width && ty < height {
                                image.put_pixel(tx, ty, color);
                            }
                        }
                    }
                }
            }
        }
        cursor += (GLYPH_WIDTH + 1) * scale;
        if cursor >= width {
            break;
        }
    }
}

/// Stamps the local time of day onto frames
#[derive(Debug, Clone)]
pub struct ClockOverlay {
    origin: (u32, u32),
    scale: u32,
    color: Rgb<u8>,
    offset: ChronoDuration,
}

impl ClockOverlay {
    pub fn new(origin: (u32, u32), scale: u32, color: Rgb<u8>) -> Self {
        Self {
            origin,
            scale,
            color,
            offset: ChronoDuration::zero(),
        }
    }

    /// Green stamp used on outgoing frames
    pub fn sender() -> Self {
        Self::new((16, 100), 3, Rgb([0, 255, 0]))
    }

    /// Red stamp used on displayed frames
    pub fn receiver() -> Self {
        Self::new((16, 40), 3, Rgb([255, 0, 0]))
    }

    /// Shift the stamped clock by a fixed number of milliseconds
    pub fn with_offset_ms(mut self, offset_ms: i64) -> Self {
        self.offset = ChronoDuration::milliseconds(offset_ms);
        self
    }

    /// The text that would be stamped right now
    pub fn current_text(&self) -> String {
        (Local::now() + self.offset)
            .format("%H:%M:%S%.3f")
            .to_string()
    }

    /// Stamp the clock; empty frames are left alone
    pub fn apply(&self, frame: &mut Frame) {
        let text = self.current_text();
        if let Some(image) = frame.image_mut() {
            draw_text(image, &text, self.origin.0, self.origin.1, self.scale, self.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_metrics() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("0", 1), 5);
        assert_eq!(text_width("00", 2), 22);
        assert_eq!(text_height(3), 21);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut image = RgbImage::new(40, 20);
        draw_text(&mut image, "1", 0, 0, 1, Rgb([255, 255, 255]));
        // Top row of '1' has a single lit pixel in the middle column.
        assert_eq!(image.get_pixel(2, 0), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_text_clips_at_edge() {
        let mut image = RgbImage::new(8, 4);
        draw_text(&mut image, "88:88", 6, 2, 3, Rgb([1, 2, 3]));
        assert_eq!(image.dimensions(), (8, 4));
    }

    #[test]
    fn test_clock_text_format() {
        let text = ClockOverlay::receiver().current_text();
        // HH:MM:SS.mmm
        assert_eq!(text.len(), 12);
        assert_eq!(&text[2..3], ":");
        assert_eq!(&text[8..9], ".");
        assert!(text.chars().all(|c| glyph(c).is_some()));
    }

    #[test]
    fn test_clock_offset_shifts_text() {
        let hour = |text: &str| text[..2].parse::<i64>().unwrap();

        let base = ClockOverlay::sender().current_text();
        let shifted = ClockOverlay::sender().with_offset_ms(12 * 3_600_000).current_text();

        // 12 hours ahead, or 13 if the hour rolled over between the two reads.
        let diff = (hour(&shifted) - hour(&base)).rem_euclid(24);
        assert!(diff == 12 || diff == 13, "{} vs {}", base, shifted);
        assert_ne!(base, shifted);
    }

    #[test]
    fn test_apply_leaves_empty_frame_empty() {
        let mut frame = Frame::empty();
        ClockOverlay::sender().apply(&mut frame);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_apply_draws_in_color() {
        let mut frame = Frame::from_image(RgbImage::new(320, 240));
        ClockOverlay::sender().apply(&mut frame);
        let image = frame.image().unwrap();
        assert!(image.pixels().any(|p| *p == Rgb([0, 255, 0])));
    }
}

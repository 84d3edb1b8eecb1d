//! In-memory video frame

use image::RgbImage;

/// A single RGB raster image, possibly absent.
///
/// An empty frame stands for "nothing available this cycle": a camera that
/// failed to deliver, an empty datagram, or a payload that did not decode.
/// Frames are moved from stage to stage; cloning copies the pixels.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    image: Option<RgbImage>,
}

impl Frame {
    /// The absent frame
    pub fn empty() -> Self {
        Self { image: None }
    }

    /// Wrap an image; a zero-sized image becomes the empty frame
    pub fn from_image(image: RgbImage) -> Self {
        if image.width() == 0 || image.height() == 0 {
            return Self::empty();
        }
        Self { image: Some(image) }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }

    /// Width and height, or `None` for the empty frame
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|img| img.dimensions())
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    pub fn image_mut(&mut self) -> Option<&mut RgbImage> {
        self.image.as_mut()
    }

    pub fn into_image(self) -> Option<RgbImage> {
        self.image
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        Frame::from_image(image)
    }
}

use std::io::Cursor;
use std::time::Instant;

use anyhow::Context;
use image::imageops::FilterType;
use image::{ImageFormat, RgbImage};

/// A captured RGB frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub captured_at: Instant,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            captured_at: Instant::now(),
        }
    }

    /// Build a frame from tightly packed BGR bytes as delivered by most
    /// capture devices.
    pub fn from_bgr(width: u32, height: u32, bgr: &[u8]) -> anyhow::Result<Self> {
        let expected = width as usize * height as usize * 3;
        if bgr.len() != expected {
            anyhow::bail!(
                "frame buffer holds {} bytes, expected {expected} for {width}x{height}",
                bgr.len()
            );
        }
        let rgb: Vec<u8> = bgr
            .chunks_exact(3)
            .flat_map(|px| [px[2], px[1], px[0]])
            .collect();
        let image = RgbImage::from_raw(width, height, rgb)
            .context("frame dimensions do not match buffer")?;
        Ok(Self::new(image))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Shrink to `target_width`, keeping the aspect ratio.
    ///
    /// Frames that are already at most `target_width` wide are returned as is.
    pub fn downscale(&self, target_width: u32) -> Frame {
        if target_width == 0 || self.width() <= target_width {
            return self.clone();
        }
        let scale = target_width as f64 / self.width() as f64;
        let new_h = ((self.height() as f64 * scale) as u32).max(1);
        let image = image::imageops::resize(&self.image, target_width, new_h, FilterType::Triangle);
        Frame {
            image,
            captured_at: self.captured_at,
        }
    }

    pub fn to_jpeg(&self) -> anyhow::Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buf, ImageFormat::Jpeg)
            .context("failed to encode frame as JPEG")?;
        Ok(buf.into_inner())
    }
}

//! Live USB capture and preview window backed by OpenCV.

use anyhow::Context;
use opencv::prelude::*;
use opencv::{core, highgui, videoio};
use tracing::{info, warn};

use crate::capture::{Camera, Preview, PreviewControl};
use crate::config::CameraConfig;
use crate::frame::Frame;

pub const WINDOW_TITLE: &str = "Empathy Lamp (USB) - press q to quit";

/// V4L2 webcam.
pub struct OpenCvCamera {
    cap: videoio::VideoCapture,
    mat: core::Mat,
}

impl OpenCvCamera {
    /// Open `cfg.device` and request the configured mode. The device may
    /// negotiate a different one; failing to open at all is an error.
    pub fn open(cfg: &CameraConfig) -> anyhow::Result<Self> {
        let mut cap = videoio::VideoCapture::new(cfg.device, videoio::CAP_V4L2)
            .context("failed to create video capture")?;
        cap.set(videoio::CAP_PROP_FRAME_WIDTH, cfg.width as f64)?;
        cap.set(videoio::CAP_PROP_FRAME_HEIGHT, cfg.height as f64)?;
        cap.set(videoio::CAP_PROP_FPS, cfg.fps as f64)?;
        if !cap.is_opened()? {
            anyhow::bail!(
                "could not open USB camera {}; try another device index",
                cfg.device
            );
        }
        let w = cap.get(videoio::CAP_PROP_FRAME_WIDTH)?;
        let h = cap.get(videoio::CAP_PROP_FRAME_HEIGHT)?;
        let fps = cap.get(videoio::CAP_PROP_FPS)?;
        info!(device = cfg.device, w, h, fps, "camera opened");
        Ok(Self {
            cap,
            mat: core::Mat::default(),
        })
    }
}

impl Camera for OpenCvCamera {
    fn read(&mut self) -> anyhow::Result<Option<Frame>> {
        if !self.cap.read(&mut self.mat).unwrap_or(false) || self.mat.empty() {
            return Ok(None);
        }
        let cols = self.mat.cols() as u32;
        let rows = self.mat.rows() as u32;
        let bytes = self.mat.data_bytes()?;
        Ok(Some(Frame::from_bgr(cols, rows, bytes)?))
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        if let Err(e) = self.cap.release() {
            warn!(?e, "failed to release camera");
        }
    }
}

/// Resizable preview window; `q` quits.
pub struct OpenCvPreview {
    title: String,
    size: (i32, i32),
    open: bool,
    mat: core::Mat,
}

impl OpenCvPreview {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            title: WINDOW_TITLE.to_string(),
            size: (width as i32, height as i32),
            open: false,
            mat: core::Mat::default(),
        }
    }

    // The window must be created on the thread that pumps its events.
    fn ensure_window(&mut self) -> anyhow::Result<()> {
        if !self.open {
            highgui::named_window(&self.title, highgui::WINDOW_NORMAL)?;
            highgui::resize_window(&self.title, self.size.0, self.size.1)?;
            self.open = true;
        }
        Ok(())
    }
}

impl Preview for OpenCvPreview {
    fn show(&mut self, frame: &Frame) -> anyhow::Result<PreviewControl> {
        self.ensure_window()?;
        let (w, h) = (frame.width() as i32, frame.height() as i32);
        if self.mat.cols() != w || self.mat.rows() != h {
            self.mat = core::Mat::new_rows_cols_with_default(
                h,
                w,
                core::CV_8UC3,
                core::Scalar::all(0.0),
            )?;
        }
        let dst = self.mat.data_bytes_mut()?;
        for (out, px) in dst.chunks_exact_mut(3).zip(frame.image.pixels()) {
            out.copy_from_slice(&[px.0[2], px.0[1], px.0[0]]);
        }
        highgui::imshow(&self.title, &self.mat)?;
        let key = highgui::wait_key(1)?;
        if key & 0xFF == 'q' as i32 {
            return Ok(PreviewControl::Quit);
        }
        Ok(PreviewControl::Continue)
    }
}

impl Drop for OpenCvPreview {
    fn drop(&mut self) {
        if self.open {
            highgui::destroy_all_windows().ok();
        }
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, info, trace};

use crate::frame::Frame;
use crate::state::SharedHandle;

/// Source of video frames.
pub trait Camera: Send {
    /// Read the next frame. `Ok(None)` means the read failed transiently and
    /// should simply be retried.
    fn read(&mut self) -> anyhow::Result<Option<Frame>>;
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    fn read(&mut self) -> anyhow::Result<Option<Frame>> {
        (**self).read()
    }
}

/// Whether the capture loop should keep going after showing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewControl {
    Continue,
    Quit,
}

/// Renders captured frames.
pub trait Preview {
    fn show(&mut self, frame: &Frame) -> anyhow::Result<PreviewControl>;
}

impl<P: Preview + ?Sized> Preview for Box<P> {
    fn show(&mut self, frame: &Frame) -> anyhow::Result<PreviewControl> {
        (**self).show(frame)
    }
}

/// Preview that draws nothing and never asks to quit.
#[derive(Debug, Default)]
pub struct HeadlessPreview {
    shown: u64,
}

impl HeadlessPreview {
    pub fn frames_shown(&self) -> u64 {
        self.shown
    }
}

impl Preview for HeadlessPreview {
    fn show(&mut self, frame: &Frame) -> anyhow::Result<PreviewControl> {
        self.shown += 1;
        trace!(n = self.shown, w = frame.width(), h = frame.height(), "frame");
        Ok(PreviewControl::Continue)
    }
}

/// Pull frames until the preview quits or `stop` is raised.
///
/// Each frame replaces the latest frame in `state` before it is shown.
/// Transient read failures are retried without logging.
pub fn run_capture<C, P>(
    camera: &mut C,
    preview: &mut P,
    state: &SharedHandle,
    stop: &AtomicBool,
) -> anyhow::Result<()>
where
    C: Camera + ?Sized,
    P: Preview + ?Sized,
{
    info!("capture loop started");
    while !stop.load(Ordering::Relaxed) {
        let Some(frame) = camera.read()? else {
            continue;
        };
        state.blocking_store_frame(frame.clone());
        if preview.show(&frame)? == PreviewControl::Quit {
            info!("quit requested from preview");
            break;
        }
    }
    stop.store(true, Ordering::Relaxed);
    Ok(())
}

/// Spawn [`run_capture`] on a dedicated OS thread.
pub fn spawn_capture<C, P>(
    mut camera: C,
    mut preview: P,
    state: SharedHandle,
    stop: Arc<AtomicBool>,
) -> std::io::Result<std::thread::JoinHandle<anyhow::Result<()>>>
where
    C: Camera + 'static,
    P: Preview + Send + 'static,
{
    std::thread::Builder::new()
        .name("capture".into())
        .spawn(move || run_capture(&mut camera, &mut preview, &state, &stop))
}

/// Plays a directory of still images in a loop, paced to a frame rate.
pub struct ReplayCamera {
    frames: Vec<Frame>,
    next: usize,
    interval: Duration,
    last: Option<Instant>,
}

const REPLAY_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

impl ReplayCamera {
    /// Load every PNG/JPEG in `dir`, sorted by file name.
    pub fn open(dir: impl AsRef<Path>, fps: u32) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("could not open replay directory {}", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| REPLAY_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();
        if paths.is_empty() {
            anyhow::bail!("no images found in {}", dir.display());
        }
        let frames = paths
            .iter()
            .map(|p| {
                let img = image::open(p).with_context(|| format!("failed to decode {}", p.display()))?;
                Ok(Frame::new(img.to_rgb8()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        debug!(count = frames.len(), dir = %dir.display(), "replay frames loaded");
        Ok(Self::from_frames(frames, fps))
    }

    pub fn from_frames(frames: Vec<Frame>, fps: u32) -> Self {
        Self {
            frames,
            next: 0,
            interval: Duration::from_secs(1) / fps.max(1),
            last: None,
        }
    }
}

impl Camera for ReplayCamera {
    fn read(&mut self) -> anyhow::Result<Option<Frame>> {
        if self.frames.is_empty() {
            return Ok(None);
        }
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
        let mut frame = self.frames[self.next].clone();
        frame.captured_at = Instant::now();
        self.next = (self.next + 1) % self.frames.len();
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::tempdir;

    /// Fails every other read, then yields a frame.
    struct FlakyCamera {
        reads: u32,
    }

    impl Camera for FlakyCamera {
        fn read(&mut self) -> anyhow::Result<Option<Frame>> {
            self.reads += 1;
            if self.reads % 2 == 1 {
                return Ok(None);
            }
            Ok(Some(Frame::new(RgbImage::new(self.reads, 1))))
        }
    }

    /// Quits after `limit` frames.
    struct CountingPreview {
        seen: Vec<u32>,
        limit: usize,
    }

    impl Preview for CountingPreview {
        fn show(&mut self, frame: &Frame) -> anyhow::Result<PreviewControl> {
            self.seen.push(frame.width());
            Ok(if self.seen.len() >= self.limit {
                PreviewControl::Quit
            } else {
                PreviewControl::Continue
            })
        }
    }

    #[test]
    fn retries_failed_reads_and_stops_on_quit() {
        let state = SharedHandle::new();
        let stop = AtomicBool::new(false);
        let mut cam = FlakyCamera { reads: 0 };
        let mut preview = CountingPreview {
            seen: Vec::new(),
            limit: 3,
        };
        run_capture(&mut cam, &mut preview, &state, &stop).unwrap();
        assert_eq!(preview.seen, vec![2, 4, 6]);
        assert!(stop.load(Ordering::Relaxed));
        let latest = state.mutex().blocking_lock().latest_frame.clone().unwrap();
        assert_eq!(latest.width(), 6);
    }

    #[test]
    fn headless_preview_counts_frames() {
        let mut preview = HeadlessPreview::default();
        let frame = Frame::new(RgbImage::new(1, 1));
        assert_eq!(preview.show(&frame).unwrap(), PreviewControl::Continue);
        assert_eq!(preview.show(&frame).unwrap(), PreviewControl::Continue);
        assert_eq!(preview.frames_shown(), 2);
    }

    #[test]
    fn stop_flag_ends_loop() {
        let state = SharedHandle::new();
        let stop = AtomicBool::new(true);
        let mut cam = FlakyCamera { reads: 0 };
        let mut preview = HeadlessPreview::default();
        run_capture(&mut cam, &mut preview, &state, &stop).unwrap();
        assert_eq!(cam.reads, 0);
    }

    #[test]
    fn spawned_capture_stops_when_flag_raised() {
        let state = SharedHandle::new();
        let stop = Arc::new(AtomicBool::new(false));
        let cam = ReplayCamera::from_frames(vec![Frame::new(RgbImage::new(2, 2))], 200);
        let handle =
            spawn_capture(cam, HeadlessPreview::default(), state.clone(), stop.clone()).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap().unwrap();
        assert!(state.mutex().blocking_lock().latest_frame.is_some());
    }

    #[test]
    fn replay_loops_over_sorted_images() {
        let dir = tempdir().unwrap();
        RgbImage::new(3, 1).save(dir.path().join("b.png")).unwrap();
        RgbImage::new(5, 1).save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        let mut cam = ReplayCamera::open(dir.path(), 1000).unwrap();
        let widths: Vec<u32> = (0..3)
            .map(|_| cam.read().unwrap().unwrap().width())
            .collect();
        assert_eq!(widths, vec![5, 3, 5]);
    }

    #[test]
    fn replay_rejects_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(ReplayCamera::open(dir.path(), 30).is_err());
        assert!(ReplayCamera::open(dir.path().join("missing"), 30).is_err());
    }
}

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cooldown::Cooldown;
use crate::frame::Frame;
use crate::mood::Mood;

/// State shared between the capture and inference loops.
#[derive(Debug, Default)]
pub struct SharedState {
    pub latest_frame: Option<Frame>,
    pub mood: Mood,
    pub cooldown: Cooldown,
}

/// Cloneable handle around the single lock guarding [`SharedState`].
///
/// The capture loop runs on a plain OS thread and uses the `blocking_*`
/// variants; the inference loop awaits the async ones.
#[derive(Clone, Debug, Default)]
pub struct SharedHandle {
    inner: Arc<Mutex<SharedState>>,
}

impl SharedHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access for callers that need several fields under one lock.
    pub fn mutex(&self) -> &Mutex<SharedState> {
        &self.inner
    }

    pub fn blocking_store_frame(&self, frame: Frame) {
        self.inner.blocking_lock().latest_frame = Some(frame);
    }

    pub async fn store_frame(&self, frame: Frame) {
        self.inner.lock().await.latest_frame = Some(frame);
    }

    /// Copy of the most recent frame.
    pub async fn snapshot(&self) -> Option<Frame> {
        self.inner.lock().await.latest_frame.clone()
    }

    pub async fn mood(&self) -> Mood {
        self.inner.lock().await.mood
    }

    /// Replace the mood and return the previous one if it differs.
    pub async fn swap_mood(&self, mood: Mood) -> Option<Mood> {
        let mut guard = self.inner.lock().await;
        let prev = std::mem::replace(&mut guard.mood, mood);
        (prev != mood).then_some(prev)
    }
}

/// Guard that aborts a task when dropped.
///
/// [`crate::runtime::run`] wraps the spawned analyzer task in one. After the
/// capture loop ends it sends the analyzer's stop signal and takes the handle
/// back with [`AbortGuard::into_inner`] to join it cleanly. If the `run`
/// future is dropped before reaching that point, the guard aborts the
/// analyzer instead of leaving it ticking against a dead capture loop.
pub struct AbortGuard {
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl AbortGuard {
    /// Take ownership of `handle`; it is aborted unless reclaimed.
    pub fn new(handle: tokio::task::JoinHandle<()>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Disarm the guard and return the handle so the caller can await it.
    pub fn into_inner(mut self) -> Option<tokio::task::JoinHandle<()>> {
        self.handle.take()
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

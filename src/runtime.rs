use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::abort_guard::AbortGuard;
use crate::analyzer::{Analyzer, AnalyzerSettings};
use crate::capture::{Camera, Preview, spawn_capture};
use crate::lamp::Lamp;
use crate::model::EmotionModel;
use crate::state::SharedHandle;

/// Run the capture thread and the inference loop until the preview quits or
/// `shutdown` resolves.
///
/// Returns the shared state on a clean stop, or the capture loop's error.
/// Inference errors never end the run.
pub async fn run<C, P, S>(
    settings: AnalyzerSettings,
    camera: C,
    preview: P,
    model: Arc<dyn EmotionModel>,
    lamp: Arc<dyn Lamp>,
    shutdown: S,
) -> anyhow::Result<SharedHandle>
where
    C: Camera + 'static,
    P: Preview + Send + 'static,
    S: Future<Output = ()>,
{
    let state = SharedHandle::new();
    let stop = Arc::new(AtomicBool::new(false));

    let capture = spawn_capture(camera, preview, state.clone(), stop.clone())
        .context("failed to spawn capture thread")?;
    let mut capture_done = tokio::task::spawn_blocking(move || match capture.join() {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!("capture thread panicked")),
    });

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let analyzer = Analyzer::new(state.clone(), model, lamp, settings);
    let guard = AbortGuard::new(tokio::spawn(analyzer.run(async move {
        let _ = stop_rx.await;
    })));
    info!("empathy lamp running");

    tokio::pin!(shutdown);
    let captured = tokio::select! {
        res = &mut capture_done => res,
        _ = &mut shutdown => {
            info!("shutdown requested");
            stop.store(true, Ordering::Relaxed);
            (&mut capture_done).await
        }
    };

    let _ = stop_tx.send(());
    if let Some(handle) = guard.into_inner() {
        handle.await.ok();
    }
    debug!("analyzer joined");
    captured.context("capture task failed")??;
    Ok(state)
}

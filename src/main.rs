use clap::Parser;
use empathy_lamp::args::Args;
use empathy_lamp::config::{self, LampConfig};
use empathy_lamp::{
    Camera, ConsoleLamp, DeepFaceClient, HeadlessPreview, Preview, ReplayCamera, logger, runtime,
    shutdown_signal,
};
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::try_init(args.log_level).map_err(|e| anyhow::anyhow!(e))?;

    let mut cfg = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            config::load(path).await?
        }
        None => LampConfig::default(),
    };
    args.apply(&mut cfg);
    cfg.validate()?;
    info!(model = %cfg.model.url, rule = ?cfg.analysis.rule, "starting");

    let camera = open_camera(&cfg)?;
    let preview = open_preview(&cfg);
    let model = Arc::new(DeepFaceClient::new(cfg.model.url.clone()));
    let lamp = Arc::new(ConsoleLamp);

    runtime::run(
        cfg.analyzer_settings()?,
        camera,
        preview,
        model,
        lamp,
        shutdown_signal(),
    )
    .await?;
    info!("bye");
    Ok(())
}

fn open_camera(cfg: &LampConfig) -> anyhow::Result<Box<dyn Camera>> {
    if let Some(dir) = &cfg.camera.replay_dir {
        return Ok(Box::new(ReplayCamera::open(dir, cfg.camera.fps)?));
    }
    #[cfg(feature = "opencv")]
    {
        Ok(Box::new(empathy_lamp::opencv_camera::OpenCvCamera::open(
            &cfg.camera,
        )?))
    }
    #[cfg(not(feature = "opencv"))]
    {
        anyhow::bail!("live capture needs the `opencv` feature; pass --replay-dir to replay images")
    }
}

fn open_preview(cfg: &LampConfig) -> Box<dyn Preview + Send> {
    if cfg.preview.headless {
        return Box::new(HeadlessPreview::default());
    }
    #[cfg(feature = "opencv")]
    {
        Box::new(empathy_lamp::opencv_camera::OpenCvPreview::new(
            cfg.preview.width,
            cfg.preview.height,
        ))
    }
    #[cfg(not(feature = "opencv"))]
    {
        debug!("built without a window backend, running headless");
        Box::new(HeadlessPreview::default())
    }
}

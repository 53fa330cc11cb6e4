use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyzer::AnalyzerSettings;
use crate::mood::MoodRule;

/// Longest accepted pause after a stressed reading.
pub const MAX_COOLDOWN_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// V4L2 device index (`/dev/videoN`).
    pub device: i32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Replay still images from this directory instead of a live device.
    pub replay_dir: Option<PathBuf>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            width: 1920,
            height: 1080,
            fps: 30,
            replay_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub headless: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            headless: false,
            width: 960,
            height: 540,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub period_secs: f64,
    pub ai_width: u32,
    pub cooldown_secs: u64,
    pub rule: MoodRule,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period_secs: 3.0,
            ai_width: 640,
            cooldown_secs: 30,
            rule: MoodRule::Composite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the DeepFace API server.
    pub url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5005".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LampConfig {
    pub camera: CameraConfig,
    pub preview: PreviewConfig,
    pub analysis: AnalysisConfig,
    pub model: ModelConfig,
}

impl LampConfig {
    /// Reject values the loops cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.analysis.period_secs.is_finite() && self.analysis.period_secs > 0.0) {
            anyhow::bail!("analysis.period_secs must be positive");
        }
        if Duration::try_from_secs_f64(self.analysis.period_secs).is_err() {
            anyhow::bail!("analysis.period_secs is too large");
        }
        if self.analysis.cooldown_secs > MAX_COOLDOWN_SECS {
            anyhow::bail!("analysis.cooldown_secs must be at most {MAX_COOLDOWN_SECS}");
        }
        if self.analysis.ai_width == 0 {
            anyhow::bail!("analysis.ai_width must be positive");
        }
        if self.camera.fps == 0 {
            anyhow::bail!("camera.fps must be positive");
        }
        Ok(())
    }

    pub fn analyzer_settings(&self) -> anyhow::Result<AnalyzerSettings> {
        let period = Duration::try_from_secs_f64(self.analysis.period_secs)
            .map_err(|e| anyhow::anyhow!("invalid analysis.period_secs: {e}"))?;
        Ok(AnalyzerSettings {
            period,
            ai_width: self.analysis.ai_width,
            cooldown: Duration::from_secs(self.analysis.cooldown_secs),
            rule: self.analysis.rule,
        })
    }
}

/// Load a [`LampConfig`] from a TOML file. Missing keys keep their defaults.
///
/// # Examples
///
/// ```no_run
/// # tokio_test::block_on(async {
/// let cfg = empathy_lamp::config::load("lamp.toml").await.unwrap();
/// assert_eq!(cfg.analysis.cooldown_secs, 30);
/// # });
/// ```
pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<LampConfig> {
    let text = tokio::fs::read_to_string(path).await?;
    let cfg: LampConfig = toml::from_str(&text)?;
    cfg.validate()?;
    Ok(cfg)
}

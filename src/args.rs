use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::LampConfig;
use crate::mood::MoodRule;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
        }
    }
}

/// Command line arguments for the empathy-lamp binary.
///
/// Flags override values loaded from `--config`.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "empathy-lamp",
    version,
    about = "Tint a lamp to match the mood seen on a webcam"
)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, env = "EMPATHY_LAMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// V4L2 camera index
    #[arg(long)]
    pub device: Option<i32>,

    /// Base URL of the emotion model server
    #[arg(long)]
    pub model_url: Option<String>,

    /// Seconds between analyses
    #[arg(long)]
    pub period_secs: Option<f64>,

    /// How classifier scores become a mood
    #[arg(long, value_enum)]
    pub rule: Option<MoodRule>,

    /// Replay images from a directory instead of opening a camera
    #[arg(long)]
    pub replay_dir: Option<PathBuf>,

    /// Run without a preview window
    #[arg(long)]
    pub headless: bool,

    /// Logging verbosity level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Overlay command line values onto `cfg`.
    pub fn apply(&self, cfg: &mut LampConfig) {
        if let Some(device) = self.device {
            cfg.camera.device = device;
        }
        if let Some(url) = &self.model_url {
            cfg.model.url = url.clone();
        }
        if let Some(secs) = self.period_secs {
            cfg.analysis.period_secs = secs;
        }
        if let Some(rule) = self.rule {
            cfg.analysis.rule = rule;
        }
        if let Some(dir) = &self.replay_dir {
            cfg.camera.replay_dir = Some(dir.clone());
        }
        if self.headless {
            cfg.preview.headless = true;
        }
    }
}

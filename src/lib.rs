pub mod analyzer;
pub mod args;
pub mod capture;
pub mod config;
pub mod cooldown;
pub mod frame;
pub mod lamp;
pub mod logger;
pub mod model;
pub mod mood;
#[cfg(feature = "opencv")]
pub mod opencv_camera;
pub mod runtime;
pub mod shutdown;
pub mod state;

mod abort_guard;

pub use analyzer::{Analyzer, AnalyzerSettings, TickOutcome};
pub use capture::{Camera, HeadlessPreview, Preview, PreviewControl, ReplayCamera};
pub use cooldown::{Cooldown, CooldownStatus};
pub use frame::Frame;
pub use lamp::{ConsoleLamp, Lamp, MemoryLamp};
pub use model::{DeepFaceClient, EmotionModel};
pub use mood::{EmotionReport, Mood, MoodRule};
pub use shutdown::shutdown_signal;
pub use state::{SharedHandle, SharedState};

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::cooldown::{CooldownStatus, DEFAULT_COOLDOWN};
use crate::lamp::Lamp;
use crate::model::EmotionModel;
use crate::mood::{Mood, MoodRule};
use crate::state::SharedHandle;

/// Tuning for the inference loop.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Time between analyses.
    pub period: Duration,
    /// Width frames are downscaled to before classification.
    pub ai_width: u32,
    /// Pause after a stressed verdict.
    pub cooldown: Duration,
    pub rule: MoodRule,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(3),
            ai_width: 640,
            cooldown: DEFAULT_COOLDOWN,
            rule: MoodRule::Composite,
        }
    }
}

/// What a single [`Analyzer::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Cooldown still armed; analysis skipped.
    Paused { remaining: Duration },
    /// Nothing captured yet.
    NoFrame,
    Unchanged(Mood),
    Changed { from: Mood, to: Mood },
}

/// Periodically classifies the latest frame and drives the lamp.
pub struct Analyzer {
    state: SharedHandle,
    model: Arc<dyn EmotionModel>,
    lamp: Arc<dyn Lamp>,
    settings: AnalyzerSettings,
}

impl Analyzer {
    pub fn new(
        state: SharedHandle,
        model: Arc<dyn EmotionModel>,
        lamp: Arc<dyn Lamp>,
        settings: AnalyzerSettings,
    ) -> Self {
        Self {
            state,
            model,
            lamp,
            settings,
        }
    }

    /// Run one analysis cycle as of `now`.
    pub async fn tick(&self, now: Instant) -> anyhow::Result<TickOutcome> {
        let frame = {
            let mut guard = self.state.mutex().lock().await;
            if let CooldownStatus::Paused { remaining } = guard.cooldown.poll(now) {
                return Ok(TickOutcome::Paused { remaining });
            }
            match guard.latest_frame.clone() {
                Some(f) => f,
                None => return Ok(TickOutcome::NoFrame),
            }
        };

        let small = frame.downscale(self.settings.ai_width);
        let report = self.model.analyze(&small).await?;
        let mood = self.settings.rule.classify(&report);
        debug!(
            %mood,
            dominant = %report.dominant,
            stressed_score = report.stressed_score(),
            "frame classified"
        );

        if mood == Mood::Stressed {
            self.state
                .mutex()
                .lock()
                .await
                .cooldown
                .arm(now, self.settings.cooldown)?;
            info!(secs = self.settings.cooldown.as_secs(), "stressed, pausing analysis");
        }

        let from = self.state.mood().await;
        if from == mood {
            return Ok(TickOutcome::Unchanged(mood));
        }
        // The mood is only recorded once the lamp shows it, so a failed
        // update is retried on the next tick.
        self.lamp.set_mood(mood).await?;
        self.state.swap_mood(mood).await;
        info!(%from, to = %mood, "mood changed");
        Ok(TickOutcome::Changed { from, to: mood })
    }

    /// Tick every period until `shutdown` resolves. Failures are logged and
    /// the loop moves on to the next tick.
    pub async fn run<S>(self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let period = self.settings.period;
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("analyzer stopping");
                    break;
                }
                _ = ticker.tick() => {
                    match self.tick(Instant::now()).await {
                        Ok(TickOutcome::Paused { remaining }) => {
                            info!(remaining_secs = remaining.as_secs(), "analysis paused");
                        }
                        Ok(outcome) => debug!(?outcome, "analysis tick"),
                        Err(e) => error!(?e, "analysis failed"),
                    }
                }
            }
        }
    }
}

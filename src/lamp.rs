use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::mood::Mood;

/// Actuator that reflects the current mood.
#[async_trait]
pub trait Lamp: Send + Sync {
    async fn set_mood(&self, mood: Mood) -> anyhow::Result<()>;
}

/// Prints mood changes to stdout in place of real lamp hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLamp;

#[async_trait]
impl Lamp for ConsoleLamp {
    async fn set_mood(&self, mood: Mood) -> anyhow::Result<()> {
        let [r, g, b] = mood.color();
        info!(%mood, r, g, b, "lamp color set");
        println!("[LAMP] emotion={mood}");
        Ok(())
    }
}

/// A lamp used for testing. It records every mood it is asked to show.
#[derive(Clone, Default)]
pub struct MemoryLamp {
    pub log: Arc<Mutex<Vec<Mood>>>,
}

impl MemoryLamp {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn moods(&self) -> Vec<Mood> {
        self.log.lock().await.clone()
    }
}

#[async_trait]
impl Lamp for MemoryLamp {
    async fn set_mood(&self, mood: Mood) -> anyhow::Result<()> {
        self.log.lock().await.push(mood);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[tokio::test]
    async fn console_lamp_logs_color() {
        ConsoleLamp.set_mood(Mood::Stressed).await.unwrap();
        assert!(logs_contain("lamp color set"));
        assert!(logs_contain("mood=stressed"));
    }

    #[tokio::test]
    async fn memory_lamp_records_moods() {
        let lamp = MemoryLamp::new();
        lamp.set_mood(Mood::Happy).await.unwrap();
        lamp.set_mood(Mood::Neutral).await.unwrap();
        assert_eq!(lamp.moods().await, vec![Mood::Happy, Mood::Neutral]);
    }
}

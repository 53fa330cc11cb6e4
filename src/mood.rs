use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Composite score at or above which a reading counts as stressed.
pub const STRESSED_SCORE_THRESHOLD: f32 = 35.0;
/// Minimum score of a top-ranked `angry` or `sad` emotion to count as stressed.
pub const STRESSED_TOP_THRESHOLD: f32 = 20.0;
/// Minimum `happy` score for a happy verdict.
pub const HAPPY_THRESHOLD: f32 = 35.0;

const STRESS_EMOTIONS: [&str; 4] = ["angry", "sad", "fear", "disgust"];

/// Coarse mood shown by the lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Stressed,
    #[default]
    Neutral,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Stressed => "stressed",
            Mood::Neutral => "neutral",
        }
    }

    /// RGB color the lamp should glow for this mood.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Mood::Happy => [255, 196, 64],
            Mood::Sad => [64, 96, 255],
            Mood::Angry => [255, 48, 32],
            // calming teal rather than alarm red
            Mood::Stressed => [32, 178, 170],
            Mood::Neutral => [255, 255, 255],
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "sad" => Ok(Mood::Sad),
            "angry" => Ok(Mood::Angry),
            "stressed" => Ok(Mood::Stressed),
            "neutral" => Ok(Mood::Neutral),
            other => anyhow::bail!("unknown mood: {other}"),
        }
    }
}

/// Output of an emotion classifier for a single frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionReport {
    /// Per-emotion scores, not necessarily normalized.
    pub scores: HashMap<String, f32>,
    /// Label the classifier itself reported as dominant.
    pub dominant: String,
}

impl EmotionReport {
    pub fn new<I, K>(scores: I, dominant: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, f32)>,
        K: Into<String>,
    {
        Self {
            scores: scores.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            dominant: dominant.into(),
        }
    }

    /// Score for `emotion`, zero when the classifier did not report it.
    pub fn score(&self, emotion: &str) -> f32 {
        self.scores.get(emotion).copied().unwrap_or(0.0)
    }

    /// Sum of the negative emotions.
    pub fn stressed_score(&self) -> f32 {
        STRESS_EMOTIONS.iter().map(|e| self.score(e)).sum()
    }

    /// Highest scoring emotion and its score.
    ///
    /// Ties resolve to the alphabetically first name so the result does not
    /// depend on map iteration order. With no scores at all the reported
    /// dominant label is used.
    pub fn top(&self) -> (&str, f32) {
        self.scores
            .iter()
            .max_by(|(ka, va), (kb, vb)| va.total_cmp(vb).then_with(|| kb.cmp(ka)))
            .map(|(k, v)| (k.as_str(), *v))
            .unwrap_or((self.dominant.as_str(), 0.0))
    }
}

/// How classifier output is reduced to a [`Mood`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MoodRule {
    /// Threshold rule over the composite stressed score.
    #[default]
    Composite,
    /// Pass through `happy`, `sad` or `angry` dominant labels.
    Dominant,
}

impl MoodRule {
    pub fn classify(&self, report: &EmotionReport) -> Mood {
        match self {
            MoodRule::Composite => classify_composite(report),
            MoodRule::Dominant => classify_dominant(report),
        }
    }
}

/// Derive a mood from the composite stress rule.
///
/// # Examples
/// ```
/// use empathy_lamp::mood::{classify_composite, EmotionReport, Mood};
/// let report = EmotionReport::new([("happy", 50.0), ("sad", 5.0), ("neutral", 45.0)], "happy");
/// assert_eq!(classify_composite(&report), Mood::Happy);
/// ```
pub fn classify_composite(report: &EmotionReport) -> Mood {
    let stressed = report.stressed_score();
    let (top, top_score) = report.top();
    let stressed_likely = stressed >= STRESSED_SCORE_THRESHOLD
        || (matches!(top, "angry" | "sad") && top_score >= STRESSED_TOP_THRESHOLD);
    if stressed_likely {
        return Mood::Stressed;
    }
    let happy = report.score("happy");
    if happy >= HAPPY_THRESHOLD && happy >= stressed {
        Mood::Happy
    } else {
        Mood::Neutral
    }
}

/// Map the dominant label onto the three lamp emotions plus neutral.
pub fn classify_dominant(report: &EmotionReport) -> Mood {
    match report.dominant.as_str() {
        "happy" => Mood::Happy,
        "sad" => Mood::Sad,
        "angry" => Mood::Angry,
        _ => Mood::Neutral,
    }
}

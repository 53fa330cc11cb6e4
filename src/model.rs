use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::frame::Frame;
use crate::mood::EmotionReport;

/// Facial emotion classifier.
#[async_trait]
pub trait EmotionModel: Send + Sync {
    async fn analyze(&self, frame: &Frame) -> anyhow::Result<EmotionReport>;
}

/// Client for a DeepFace API server.
///
/// Posts the frame as a base64 JPEG data URI to `{base_url}/analyze` and
/// reads back the emotion scores of the first detected face.
#[derive(Clone, Debug)]
pub struct DeepFaceClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnalyzeResponse {
    Wrapped { results: Vec<FaceResult> },
    Bare(Vec<FaceResult>),
}

#[derive(Deserialize)]
struct FaceResult {
    emotion: HashMap<String, f32>,
    dominant_emotion: String,
}

impl DeepFaceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/analyze", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmotionModel for DeepFaceClient {
    async fn analyze(&self, frame: &Frame) -> anyhow::Result<EmotionReport> {
        let jpeg = frame.to_jpeg()?;
        let b64 = general_purpose::STANDARD.encode(&jpeg);
        let body = serde_json::json!({
            "img": format!("data:image/jpeg;base64,{b64}"),
            "actions": ["emotion"],
            "enforce_detection": false,
        });
        let url = self.url();
        trace!(%url, bytes = jpeg.len(), "emotion request");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed to reach emotion model at {url}"))?
            .error_for_status()?;
        let parsed: AnalyzeResponse = resp.json().await.context("malformed emotion response")?;
        let results = match parsed {
            AnalyzeResponse::Wrapped { results } => results,
            AnalyzeResponse::Bare(results) => results,
        };
        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("emotion model returned no faces"))?;
        debug!(dominant = %first.dominant_emotion, scores = ?first.emotion, "emotion analyzed");
        Ok(EmotionReport {
            scores: first.emotion,
            dominant: first.dominant_emotion,
        })
    }
}

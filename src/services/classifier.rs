// Classifier Port
// Opaque scoring capability: probability that one chunk is AI-authored

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

const CLASSIFIER_DEFAULT_URL: &str = "http://127.0.0.1:8901";
const DEFAULT_TIMEOUT_SECS: u64 = 80;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("classifier not ready")]
    NotReady,
    #[error("scoring call timed out")]
    Timeout,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(String),
    #[error("inference error: {0}")]
    Inference(String),
}

/// External scoring capability, invoked once per chunk.
///
/// `score` returns the probability mass the binary classifier assigns to
/// the AI class for the given text, in `[0, 1]`.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Whether the classifier can accept scoring calls right now.
    async fn is_ready(&self) -> bool;

    async fn score(&self, text: &str) -> Result<f64, ClassifierError>;
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    ai_probability: f64,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    loaded: bool,
}

/// Classifier adapter for a remote inference service.
///
/// POSTs `{"text": ...}` to `<base_url>/score` and reads
/// `{"ai_probability": ...}` back; `<base_url>/health` reports whether the
/// model is loaded.
pub struct HttpClassifier {
    client: Client,
    base_url: String,
}

impl HttpClassifier {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Endpoint from `DETEKTOR_CLASSIFIER_URL`, falling back to the default
    /// local inference service address.
    pub fn endpoint_from_env() -> String {
        env::var("DETEKTOR_CLASSIFIER_URL").unwrap_or_else(|_| CLASSIFIER_DEFAULT_URL.to_string())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for HttpClassifier {
    fn default() -> Self {
        Self::new(Self::endpoint_from_env(), DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn is_ready(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthResponse>().await {
                    Ok(health) => health.loaded,
                    Err(e) => {
                        warn!("classifier health response unreadable: {}", e);
                        false
                    }
                }
            }
            Ok(response) => {
                warn!("classifier health check returned {}", response.status());
                false
            }
            Err(e) => {
                warn!("classifier health check failed: {}", e);
                false
            }
        }
    }

    async fn score(&self, text: &str) -> Result<f64, ClassifierError> {
        let url = format!("{}/score", self.base_url);
        let request = serde_json::json!({ "text": text });

        let start = Instant::now();
        let response = self.client.post(&url).json(&request).send().await?;
        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: ScoreResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Json(e.to_string()))?;

        info!(latency_ms, "classifier.score ok");
        Ok(data.ai_probability.clamp(0.0, 1.0))
    }
}

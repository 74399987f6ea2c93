// Detection Pipeline
// Orchestrates cleaning, chunking, concurrent scoring and aggregation

use crate::models::{ChunkPrediction, DetectionResult, DetectionThresholds, SentencePrediction};
use crate::services::classifier::{Classifier, ClassifierError};
use crate::services::detection::{aggregation, highlighter, segmenter};
use crate::services::text_processor::{clean_text, split_sentences};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

const SCORE_MAX_CONCURRENCY: usize = 4;
const SCORE_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum DetectError {
    /// The classifier was not ready before any chunk work started.
    /// Fatal to the whole call; no partial result is produced.
    #[error("classifier unavailable")]
    ClassifierUnavailable,
}

/// Per-request detection context: classifier handle plus thresholds.
/// Holds no process-wide mutable state; build one wherever needed.
pub struct Detector {
    classifier: Arc<dyn Classifier>,
    thresholds: DetectionThresholds,
    max_concurrency: usize,
}

impl Detector {
    pub fn new(classifier: Arc<dyn Classifier>, thresholds: DetectionThresholds) -> Self {
        Self {
            classifier,
            thresholds,
            max_concurrency: SCORE_MAX_CONCURRENCY,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn thresholds(&self) -> &DetectionThresholds {
        &self.thresholds
    }

    /// Run the full pipeline on raw text.
    ///
    /// Blank input short-circuits to the zero result. A classifier that is
    /// not ready fails the whole call before any chunk work; once scoring
    /// is underway, per-chunk failures (including timeouts) are recorded on
    /// the chunk and never abort the batch.
    pub async fn analyze(&self, text: &str) -> Result<DetectionResult, DetectError> {
        let request_id = Uuid::new_v4();

        let cleaned = clean_text(text);
        if cleaned.is_empty() {
            info!(%request_id, "detect.empty_input");
            return Ok(DetectionResult::empty());
        }

        if !self.classifier.is_ready().await {
            warn!(%request_id, "detect.classifier_unavailable");
            return Err(DetectError::ClassifierUnavailable);
        }

        let chunks = segmenter::split_into_chunks(&cleaned, self.thresholds.max_chunk_budget);
        info!(%request_id, chunks = chunks.len(), "detect.segmented");

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let scores = self.score_texts(texts).await;

        let predictions: Vec<ChunkPrediction> = chunks
            .iter()
            .zip(scores)
            .map(|(chunk, score)| match score {
                Ok(prob) => ChunkPrediction {
                    chunk_id: chunk.id,
                    text: chunk.text.clone(),
                    ai_probability: prob,
                    is_ai: prob > self.thresholds.ai_threshold,
                    error: None,
                },
                Err(message) => {
                    warn!(%request_id, chunk_id = chunk.id, error = %message, "detect.chunk_failed");
                    ChunkPrediction {
                        chunk_id: chunk.id,
                        text: chunk.text.clone(),
                        ai_probability: 0.0,
                        is_ai: false,
                        error: Some(message),
                    }
                }
            })
            .collect();

        let result = aggregation::aggregate(&chunks, predictions, &self.thresholds, cleaned);
        info!(
            %request_id,
            ai_probability = result.ai_probability,
            total_chunks = result.total_chunks,
            "detect.done"
        );
        Ok(result)
    }

    /// Sentence-level predictions for more granular inspection.
    /// Sentences come from the raw text; error recovery matches `analyze`.
    pub async fn analyze_sentences(
        &self,
        text: &str,
    ) -> Result<Vec<SentencePrediction>, DetectError> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        if !self.classifier.is_ready().await {
            return Err(DetectError::ClassifierUnavailable);
        }

        let scores = self.score_texts(sentences.clone()).await;
        let predictions = sentences
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(sentence_id, (text, score))| match score {
                Ok(prob) => SentencePrediction {
                    sentence_id,
                    text,
                    ai_probability: prob,
                    is_ai: prob > self.thresholds.ai_threshold,
                    error: None,
                },
                Err(message) => SentencePrediction {
                    sentence_id,
                    text,
                    ai_probability: 0.0,
                    is_ai: false,
                    error: Some(message),
                },
            })
            .collect();
        Ok(predictions)
    }

    /// Mark the suspicious spans of an analysis inside the original text.
    pub fn render_highlights(&self, original_text: &str, result: &DetectionResult) -> String {
        highlighter::highlight_ai_text(original_text, &result.highlighted_parts)
    }

    /// Score each text concurrently, collecting results into a fixed,
    /// index-addressed slot vector so the output order matches the input
    /// order regardless of completion order. Each slot is written exactly
    /// once; a timeout or panic becomes that slot's recorded failure.
    async fn score_texts(&self, texts: Vec<String>) -> Vec<Result<f64, String>> {
        let total = texts.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set: JoinSet<(usize, Result<f64, ClassifierError>)> = JoinSet::new();

        for (idx, text) in texts.into_iter().enumerate() {
            let classifier = self.classifier.clone();
            let semaphore = semaphore.clone();
            join_set.spawn(async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => {
                        let fut = classifier.score(&text);
                        match tokio::time::timeout(Duration::from_secs(SCORE_TIMEOUT_SECS), fut)
                            .await
                        {
                            Ok(res) => res,
                            Err(_) => Err(ClassifierError::Timeout),
                        }
                    }
                    Err(_) => Err(ClassifierError::Inference("semaphore closed".to_string())),
                };
                (idx, result)
            });
        }

        let mut slots: Vec<Option<Result<f64, String>>> = (0..total).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, Ok(prob))) => slots[idx] = Some(Ok(prob)),
                Ok((idx, Err(e))) => slots[idx] = Some(Err(e.to_string())),
                Err(e) => warn!("scoring task aborted: {}", e),
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err("scoring task aborted".to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfidenceLevel;
    use async_trait::async_trait;

    /// Scripted classifier: "mesin" scores high, "gagal" fails, the rest
    /// score low.
    struct MockClassifier {
        ready: bool,
    }

    #[async_trait]
    impl Classifier for MockClassifier {
        async fn is_ready(&self) -> bool {
            self.ready
        }

        async fn score(&self, text: &str) -> Result<f64, ClassifierError> {
            if text.contains("gagal") {
                return Err(ClassifierError::Inference("mock inference error".to_string()));
            }
            if text.contains("mesin") {
                Ok(0.9)
            } else {
                Ok(0.1)
            }
        }
    }

    fn detector(ready: bool, thresholds: DetectionThresholds) -> Detector {
        Detector::new(Arc::new(MockClassifier { ready }), thresholds)
    }

    #[tokio::test]
    async fn test_blank_input_short_circuits() {
        let d = detector(false, DetectionThresholds::default());
        // Degenerate input never reaches the readiness probe.
        let result = d.analyze("   \n\t ").await.unwrap();
        assert_eq!(result.total_chunks, 0);
        assert_eq!(result.ai_probability, 0.0);
        assert!(!result.is_ai_generated);
        assert_eq!(result.confidence_level, ConfidenceLevel::Low);
        assert!(result.highlighted_parts.is_empty());
    }

    #[tokio::test]
    async fn test_unready_classifier_fails_fast() {
        let d = detector(false, DetectionThresholds::default());
        let err = d.analyze("teks yang akan dianalisis").await.unwrap_err();
        assert!(matches!(err, DetectError::ClassifierUnavailable));
    }

    #[tokio::test]
    async fn test_single_chunk_verdict() {
        let d = detector(true, DetectionThresholds::default());
        let result = d.analyze("teks buatan mesin yang rapi").await.unwrap();
        assert_eq!(result.total_chunks, 1);
        assert!((result.ai_probability - 0.9).abs() < 1e-9);
        assert!(result.is_ai_generated);
        assert_eq!(result.confidence_level, ConfidenceLevel::High);
        assert_eq!(result.highlighted_parts.len(), 1);
        assert_eq!(result.cleaned_text, "teks buatan mesin yang rapi");
    }

    #[tokio::test]
    async fn test_one_failed_chunk_among_three() {
        let thresholds = DetectionThresholds {
            max_chunk_budget: 10, // 4 words per chunk
            ..DetectionThresholds::default()
        };
        let d = detector(true, thresholds);
        // Chunks: [mesin ...], [gagal ...], [plain ...] with 4 words each.
        let text = "mesin satu dua tiga gagal lima enam tujuh delapan sembilan sepuluh sebelas";
        let result = d.analyze(text).await.unwrap();

        assert_eq!(result.chunk_predictions.len(), 3);
        assert_eq!(result.total_chunks, 3);

        let failed = &result.chunk_predictions[1];
        assert!(failed.error.as_deref().unwrap().contains("mock inference error"));
        assert_eq!(failed.ai_probability, 0.0);
        assert!(!failed.is_ai);

        assert!((result.chunk_predictions[0].ai_probability - 0.9).abs() < 1e-9);
        assert!((result.chunk_predictions[2].ai_probability - 0.1).abs() < 1e-9);

        // Weighted aggregate reflects the failed chunk's zero contribution.
        let expected = (0.9 * 4.0 + 0.0 * 4.0 + 0.1 * 4.0) / 12.0;
        assert!((result.ai_probability - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_predictions_keep_chunk_order() {
        let thresholds = DetectionThresholds {
            max_chunk_budget: 10,
            ..DetectionThresholds::default()
        };
        let d = detector(true, thresholds).with_max_concurrency(8);
        let text = (0..40).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let result = d.analyze(&text).await.unwrap();
        assert!(result.total_chunks >= 2);
        for (i, pred) in result.chunk_predictions.iter().enumerate() {
            assert_eq!(pred.chunk_id, i);
        }
    }

    #[tokio::test]
    async fn test_sentence_level_predictions() {
        let d = detector(true, DetectionThresholds::default());
        let preds = d
            .analyze_sentences("Kalimat buatan mesin. Kalimat manusia biasa!")
            .await
            .unwrap();
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].sentence_id, 0);
        assert!(preds[0].is_ai);
        assert!(!preds[1].is_ai);
    }

    #[tokio::test]
    async fn test_sentence_analysis_degenerate_input() {
        let d = detector(false, DetectionThresholds::default());
        let preds = d.analyze_sentences("...").await.unwrap();
        assert!(preds.is_empty());
    }

    #[tokio::test]
    async fn test_render_highlights_from_result() {
        let d = detector(true, DetectionThresholds::default());
        let original = "teks buatan mesin yang rapi";
        let result = d.analyze(original).await.unwrap();
        let annotated = d.render_highlights(original, &result);
        assert_eq!(highlighter::count_markers(&annotated), 1);
        assert!(annotated.contains("ai-highlight"));
    }
}

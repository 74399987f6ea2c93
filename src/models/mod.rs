// Detektor Data Models
// Serialized shapes consumed by persistence/UI collaborators

use serde::{Deserialize, Serialize};

// ============ Thresholds ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionThresholds {
    /// Above this (strict) a probability counts as AI-generated.
    #[serde(default = "default_ai_threshold")]
    pub ai_threshold: f64,
    /// Above this (strict) the verdict is reported with high confidence.
    #[serde(default = "default_high_confidence")]
    pub high_confidence_threshold: f64,
    /// Classifier context window in approximate tokens.
    #[serde(default = "default_chunk_budget")]
    pub max_chunk_budget: usize,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            ai_threshold: default_ai_threshold(),
            high_confidence_threshold: default_high_confidence(),
            max_chunk_budget: default_chunk_budget(),
        }
    }
}

// ============ Chunks ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkOffsets {
    /// UTF-8 byte offset (0-based) into the cleaned text.
    pub start: usize,
    /// UTF-8 byte offset (0-based, end-exclusive) into the cleaned text.
    pub end: usize,
}

/// One budget-bounded, word-aligned slice of cleaned text.
/// Immutable once produced; ids follow emission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
    pub word_count: usize,
    pub offsets: ChunkOffsets,
}

// ============ Per-chunk prediction ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPrediction {
    pub chunk_id: usize,
    pub text: String,
    pub ai_probability: f64,
    pub is_ai: bool,
    /// Set when scoring this chunk failed; the probability is then 0.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============ Highlighting ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub text: String,
    pub probability: f64,
    pub chunk_id: usize,
}

// ============ Document verdict ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// Field-exact document produced once per analyzed text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub ai_probability: f64,
    pub is_ai_generated: bool,
    pub confidence_level: ConfidenceLevel,
    pub highlighted_parts: Vec<HighlightSpan>,
    pub chunk_predictions: Vec<ChunkPrediction>,
    pub total_chunks: usize,
    pub cleaned_text: String,
}

impl DetectionResult {
    /// Well-defined zero result for empty/blank input.
    pub fn empty() -> Self {
        Self {
            ai_probability: 0.0,
            is_ai_generated: false,
            confidence_level: ConfidenceLevel::Low,
            highlighted_parts: Vec::new(),
            chunk_predictions: Vec::new(),
            total_chunks: 0,
            cleaned_text: String::new(),
        }
    }
}

// ============ Sentence-level analysis ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentencePrediction {
    pub sentence_id: usize,
    pub text: String,
    pub ai_probability: f64,
    pub is_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============ Default Value Functions ============

fn default_ai_threshold() -> f64 { 0.7 }
fn default_high_confidence() -> f64 { 0.85 }
fn default_chunk_budget() -> usize { 512 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults() {
        let t = DetectionThresholds::default();
        assert_eq!(t.ai_threshold, 0.7);
        assert_eq!(t.high_confidence_threshold, 0.85);
        assert_eq!(t.max_chunk_budget, 512);
    }

    #[test]
    fn test_result_serialization_is_field_exact() {
        let result = DetectionResult::empty();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ai_probability"], 0.0);
        assert_eq!(json["is_ai_generated"], false);
        assert_eq!(json["confidence_level"], "low");
        assert_eq!(json["total_chunks"], 0);
        assert!(json["highlighted_parts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_prediction_error_field_omitted_when_none() {
        let pred = ChunkPrediction {
            chunk_id: 0,
            text: "abc".to_string(),
            ai_probability: 0.4,
            is_ai: false,
            error: None,
        };
        let json = serde_json::to_string(&pred).unwrap();
        assert!(!json.contains("error"));
    }
}

// Aggregation Logic
// Combines per-chunk scores into one document verdict

use crate::models::{
    Chunk, ChunkPrediction, ConfidenceLevel, DetectionResult, DetectionThresholds, HighlightSpan,
};

/// Aggregate per-chunk predictions into a document verdict.
///
/// Pure and total: the weighted mean uses each chunk's word count as its
/// weight, so a failed chunk (probability 0.0) dilutes the final number
/// instead of being excluded. All threshold comparisons are strict; a
/// value exactly on a threshold falls into the lower band.
pub fn aggregate(
    chunks: &[Chunk],
    predictions: Vec<ChunkPrediction>,
    thresholds: &DetectionThresholds,
    cleaned_text: String,
) -> DetectionResult {
    if predictions.is_empty() {
        return DetectionResult {
            cleaned_text,
            ..DetectionResult::empty()
        };
    }

    let total_weight: usize = chunks.iter().map(|c| c.word_count).sum();

    let ai_probability = if total_weight > 0 {
        let weighted: f64 = predictions
            .iter()
            .zip(chunks.iter())
            .map(|(p, c)| p.ai_probability * c.word_count as f64)
            .sum();
        weighted / total_weight as f64
    } else {
        // No usable weights: fall back to the plain arithmetic mean.
        predictions.iter().map(|p| p.ai_probability).sum::<f64>() / predictions.len() as f64
    };

    let is_ai_generated = ai_probability > thresholds.ai_threshold;

    let confidence_level = if ai_probability > thresholds.high_confidence_threshold {
        ConfidenceLevel::High
    } else if ai_probability > thresholds.ai_threshold {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };

    // Chunk-local test, independent of the document-level probability.
    let highlighted_parts: Vec<HighlightSpan> = predictions
        .iter()
        .filter(|p| p.ai_probability > thresholds.ai_threshold)
        .map(|p| HighlightSpan {
            text: p.text.clone(),
            probability: p.ai_probability,
            chunk_id: p.chunk_id,
        })
        .collect();

    let total_chunks = predictions.len();

    DetectionResult {
        ai_probability,
        is_ai_generated,
        confidence_level,
        highlighted_parts,
        chunk_predictions: predictions,
        total_chunks,
        cleaned_text,
    }
}

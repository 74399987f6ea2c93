// Span Highlighter
// Marks AI-suspicious chunks inside the original, pre-cleaning text

use crate::models::{Chunk, ChunkPrediction, HighlightSpan};

const MARKER_OPEN: &str = "<span class=\"ai-highlight\"";

fn markup(text: &str, probability: f64) -> String {
    format!(
        "<span class=\"ai-highlight\" title=\"AI Confidence: {:.1}%\">{}</span>",
        probability * 100.0,
        text
    )
}

/// Wrap every literal occurrence of each span's text in a highlight marker.
///
/// Longest spans are applied first so a short span's match is less likely
/// to collide with a longer span's replacement. The matching is best
/// effort by design, and three hazards are part of the contract:
///
/// - spans carry *cleaned* chunk text but are matched against the
///   original text, so a span altered by cleaning silently fails to match;
/// - replacement is global, so any other occurrence of the same literal
///   substring elsewhere in the document is marked too;
/// - a later span may match text inside an earlier span's inserted markup
///   and double-annotate it.
///
/// `highlight_by_offset` avoids all three when chunk offsets are available.
pub fn highlight_ai_text(text: &str, highlighted_parts: &[HighlightSpan]) -> String {
    if highlighted_parts.is_empty() {
        return text.to_string();
    }

    let mut parts: Vec<&HighlightSpan> = highlighted_parts.iter().collect();
    parts.sort_by(|a, b| b.text.chars().count().cmp(&a.text.chars().count()));

    let mut highlighted = text.to_string();
    for part in parts {
        if part.text.is_empty() {
            continue;
        }
        highlighted = highlighted.replace(&part.text, &markup(&part.text, part.probability));
    }

    highlighted
}

/// Strict alternative to [`highlight_ai_text`]: slices the cleaned text by
/// each suspicious chunk's recorded byte offsets instead of searching for
/// literal substrings. Offsets are taken at segmentation time, so there is
/// no drift, no accidental global match and no markup re-entrancy.
pub fn highlight_by_offset(
    cleaned_text: &str,
    chunks: &[Chunk],
    predictions: &[ChunkPrediction],
    ai_threshold: f64,
) -> String {
    let mut out = String::with_capacity(cleaned_text.len());
    let mut cursor = 0usize;

    for (chunk, pred) in chunks.iter().zip(predictions.iter()) {
        if pred.ai_probability <= ai_threshold {
            continue;
        }
        let (start, end) = (chunk.offsets.start, chunk.offsets.end);
        if start < cursor || end > cleaned_text.len() || start > end {
            continue;
        }
        out.push_str(&cleaned_text[cursor..start]);
        out.push_str(&markup(&cleaned_text[start..end], pred.ai_probability));
        cursor = end;
    }

    out.push_str(&cleaned_text[cursor..]);
    out
}

/// Number of highlight markers in an annotated string.
pub fn count_markers(annotated: &str) -> usize {
    annotated.matches(MARKER_OPEN).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChunkOffsets;

    fn span(text: &str, probability: f64, chunk_id: usize) -> HighlightSpan {
        HighlightSpan {
            text: text.to_string(),
            probability,
            chunk_id,
        }
    }

    #[test]
    fn test_no_spans_returns_text_unchanged() {
        let out = highlight_ai_text("teks asli", &[]);
        assert_eq!(out, "teks asli");
        assert_eq!(count_markers(&out), 0);
    }

    #[test]
    fn test_single_span_marked_with_probability() {
        let out = highlight_ai_text("ini teks buatan mesin", &[span("buatan mesin", 0.875, 0)]);
        assert_eq!(count_markers(&out), 1);
        assert!(out.contains("AI Confidence: 87.5%"));
        assert!(out.starts_with("ini teks <span"));
    }

    #[test]
    fn test_drifted_span_leaves_text_unchanged() {
        // Cleaning turned "50%" into "50 persen"; the span no longer occurs
        // verbatim in the original, so nothing is marked.
        let original = "Harga naik 50%.";
        let out = highlight_ai_text(original, &[span("Harga naik 50 persen.", 0.9, 0)]);
        assert_eq!(out, original);
        assert_eq!(count_markers(&out), 0);
    }

    #[test]
    fn test_replace_is_global() {
        let out = highlight_ai_text("sama sama", &[span("sama", 0.8, 0)]);
        assert_eq!(count_markers(&out), 2);
    }

    #[test]
    fn test_longer_spans_applied_first() {
        let spans = [span("teks", 0.8, 1), span("teks panjang", 0.9, 0)];
        let out = highlight_ai_text("ada teks panjang", &spans);
        // The long span wins its region; the short one then re-matches
        // inside the inserted markup (the documented re-entrancy hazard).
        assert!(out.contains("AI Confidence: 90.0%"));
        assert_eq!(count_markers(&out), 2);
    }

    #[test]
    fn test_offset_mode_ignores_repeated_text() {
        let cleaned = "sama sama beda";
        let chunks = vec![
            Chunk {
                id: 0,
                text: "sama".to_string(),
                word_count: 1,
                offsets: ChunkOffsets { start: 0, end: 4 },
            },
            Chunk {
                id: 1,
                text: "sama beda".to_string(),
                word_count: 2,
                offsets: ChunkOffsets { start: 5, end: 14 },
            },
        ];
        let preds = vec![
            ChunkPrediction {
                chunk_id: 0,
                text: "sama".to_string(),
                ai_probability: 0.95,
                is_ai: true,
                error: None,
            },
            ChunkPrediction {
                chunk_id: 1,
                text: "sama beda".to_string(),
                ai_probability: 0.1,
                is_ai: false,
                error: None,
            },
        ];
        let out = highlight_by_offset(cleaned, &chunks, &preds, 0.7);
        // Only the first occurrence is marked, unlike the substring mode.
        assert_eq!(count_markers(&out), 1);
        assert!(out.ends_with("sama beda"));
    }

    #[test]
    fn test_offset_mode_with_no_suspicious_chunks() {
        let cleaned = "teks biasa";
        let chunks = vec![Chunk {
            id: 0,
            text: cleaned.to_string(),
            word_count: 2,
            offsets: ChunkOffsets { start: 0, end: 10 },
        }];
        let preds = vec![ChunkPrediction {
            chunk_id: 0,
            text: cleaned.to_string(),
            ai_probability: 0.2,
            is_ai: false,
            error: None,
        }];
        assert_eq!(highlight_by_offset(cleaned, &chunks, &preds, 0.7), cleaned);
    }
}

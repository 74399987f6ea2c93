// Segmenter
// Packs cleaned text into classifier-sized chunks by approximate token count

use crate::models::{Chunk, ChunkOffsets};

/// Classifier context window in approximate tokens.
pub const DEFAULT_CHUNK_BUDGET: usize = 512;

/// Two slots are reserved for the boundary markers the classifier
/// prepends/appends to every sequence.
const RESERVED_TOKENS: usize = 2;

/// Approximate token cost of one whitespace-delimited word.
/// Not real subword tokenization: a plain word always costs 2, and the
/// classifier's own token count may differ.
fn word_cost(word: &str) -> usize {
    1 + word.split_whitespace().count()
}

/// Split cleaned text into ordered chunks that fit the token budget.
///
/// Greedy bin-packing over whitespace-delimited words. Words are never
/// reordered and, except for the oversized-word truncation case, chunks
/// partition the word sequence with no gaps or overlaps. A single word
/// whose cost alone exceeds the effective budget is truncated to
/// `budget - 2` characters and emitted as its own chunk; the remainder
/// is discarded. Non-empty input always yields at least one chunk.
pub fn split_into_chunks(text: &str, budget: usize) -> Vec<Chunk> {
    let effective = budget.saturating_sub(RESERVED_TOKENS);

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut current: Vec<(usize, &str)> = Vec::new();
    let mut current_cost = 0usize;
    let mut cursor = 0usize;

    for word in text.split_whitespace() {
        // Byte position of this word in the source text.
        let start = text[cursor..].find(word).map(|i| cursor + i).unwrap_or(cursor);
        cursor = start + word.len();

        let cost = word_cost(word);

        if current_cost + cost > effective {
            if !current.is_empty() {
                flush(&mut chunks, &current);
                current.clear();
                current.push((start, word));
                current_cost = cost;
            } else {
                // Single word too long for the budget: truncate, drop the rest.
                let truncated: String = word.chars().take(effective).collect();
                let end = start + truncated.len();
                chunks.push(Chunk {
                    id: chunks.len(),
                    word_count: 1,
                    text: truncated,
                    offsets: ChunkOffsets { start, end },
                });
                current_cost = 0;
            }
        } else {
            current.push((start, word));
            current_cost += cost;
        }
    }

    if !current.is_empty() {
        flush(&mut chunks, &current);
    }

    chunks
}

fn flush(chunks: &mut Vec<Chunk>, words: &[(usize, &str)]) {
    let text = words.iter().map(|(_, w)| *w).collect::<Vec<_>>().join(" ");
    let start = words[0].0;
    let end = words[words.len() - 1].0 + words[words.len() - 1].1.len();
    chunks.push(Chunk {
        id: chunks.len(),
        word_count: words.len(),
        text,
        offsets: ChunkOffsets { start, end },
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_into_chunks("", DEFAULT_CHUNK_BUDGET).is_empty());
        assert!(split_into_chunks("   ", DEFAULT_CHUNK_BUDGET).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_into_chunks("satu dua tiga", DEFAULT_CHUNK_BUDGET);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, 0);
        assert_eq!(chunks[0].text, "satu dua tiga");
        assert_eq!(chunks[0].word_count, 3);
    }

    #[test]
    fn test_budget_ten_packs_four_words_per_chunk() {
        // Effective budget 8, each word costs 2 -> at most 4 words per chunk.
        let text = (0..10).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let chunks = split_into_chunks(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.word_count <= 4));
        assert_eq!(chunks[0].word_count, 4);
        assert_eq!(chunks[1].word_count, 4);
        assert_eq!(chunks[2].word_count, 2);
    }

    #[test]
    fn test_chunks_partition_word_sequence() {
        let text = "a b c d e f g h i j k l m";
        let chunks = split_into_chunks(text, 10);
        let rejoined: Vec<&str> = chunks
            .iter()
            .flat_map(|c| c.text.split_whitespace())
            .collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
        assert!(chunks.iter().all(|c| c.word_count > 0));
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.id, i);
        }
    }

    #[test]
    fn test_offsets_slice_back_to_source() {
        let text = "satu dua tiga empat lima enam";
        for chunk in split_into_chunks(text, 10) {
            assert_eq!(&text[chunk.offsets.start..chunk.offsets.end], chunk.text);
        }
    }

    #[test]
    fn test_oversized_word_truncated_and_remainder_dropped() {
        // Effective budget 1: a plain word costs 2, so every word lands in
        // the truncation branch and keeps only its first character.
        let chunks = split_into_chunks("panjang", 3);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "p");
        assert_eq!(chunks[0].word_count, 1);
        assert_eq!(chunks[0].offsets, crate::models::ChunkOffsets { start: 0, end: 1 });
    }

    #[test]
    fn test_truncation_is_char_boundary_safe() {
        let chunks = split_into_chunks("héllo", 3);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "h");
    }

    #[test]
    fn test_large_budget_never_truncates() {
        let text = "kata ".repeat(1000);
        let chunks = split_into_chunks(text.trim(), DEFAULT_CHUNK_BUDGET);
        // 1000 words at cost 2 against an effective budget of 510 -> 255 per chunk.
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.iter().map(|c| c.word_count).sum::<usize>(), 1000);
        assert!(chunks.iter().all(|c| c.word_count <= 255));
    }
}

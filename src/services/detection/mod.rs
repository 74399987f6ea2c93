// Detection Module
// AI text detection core logic organized into specialized submodules:
// - segmenter: Packs cleaned text into classifier-sized chunks
// - aggregation: Combines per-chunk scores into a document verdict
// - highlighter: Projects suspicious chunks back onto the original text
// - pipeline: Orchestrates the whole flow per request

pub mod segmenter;
pub mod aggregation;
pub mod highlighter;
pub mod pipeline;

// Re-export commonly used functions
pub use segmenter::{split_into_chunks, DEFAULT_CHUNK_BUDGET};
pub use aggregation::aggregate;
pub use highlighter::{count_markers, highlight_ai_text, highlight_by_offset};
pub use pipeline::{DetectError, Detector};

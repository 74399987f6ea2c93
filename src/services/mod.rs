// Detektor Core Services

pub mod text_processor;
pub mod config_store;
pub mod classifier;
pub mod detection;

pub use text_processor::*;
pub use config_store::*;
pub use classifier::{Classifier, ClassifierError, HttpClassifier};

// Re-export detection module functions
pub use detection::{
    aggregate,
    count_markers,
    highlight_ai_text,
    highlight_by_offset,
    split_into_chunks,
    DetectError,
    Detector,
    DEFAULT_CHUNK_BUDGET,
};

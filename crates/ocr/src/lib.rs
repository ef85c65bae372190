pub mod classify;
pub mod config;
pub mod extract;
mod patterns;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use classify::LineClassifier;
pub use config::{ConfigError, PipelineConfig};
pub use extract::{FieldExtractor, LineRejection};
pub use pipeline::{parse_text, PipelineError, StatementPipeline, StatementResult};
pub use preprocess::{prepare, prepare_bytes, PreprocessError, PreprocessOptions};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
pub use types::{Binarization, Candidate, DocumentPolicy, PageSegMode};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;

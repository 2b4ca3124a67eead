//! Error taxonomy for the ingestion and retrieval pipeline.
//!
//! Every failure a caller can observe maps to exactly one [`DocketError`]
//! variant. Nothing is retried at this layer; retry policy belongs to the
//! embedding and synthesis providers (which bound their own retries) or to
//! whatever transport sits above the core.

use thiserror::Error;

/// Result alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, DocketError>;

#[derive(Debug, Error)]
pub enum DocketError {
    /// The declared or inferred file format is not one of pdf/docx/txt.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Extraction produced empty or whitespace-only text.
    #[error("no text extracted from {0}")]
    EmptyExtraction(String),

    /// Chunk parameters cannot make forward progress.
    #[error("invalid chunk config: overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidChunkConfig { chunk_size: usize, overlap: usize },

    /// The embedding provider failed or returned a malformed response.
    #[error("embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The tenant vector store failed.
    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),

    /// The answer-synthesis provider failed or returned a malformed response.
    #[error("answer synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    /// Invalid or incomplete configuration (e.g. missing API key).
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DocketError {
    fn from(e: sqlx::Error) -> Self {
        DocketError::IndexUnavailable(e.to_string())
    }
}

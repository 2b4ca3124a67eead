//! Fixed-size overlapping-window text chunker.
//!
//! Splits normalized text into windows of `chunk_size` characters, advancing
//! `chunk_size - overlap` characters between windows. Chunking is a pure
//! function of `(text, chunk_size, overlap)`, which is what makes
//! re-ingestion idempotent: the same source always produces the same chunk
//! boundaries and therefore the same index ids.

use crate::error::{DocketError, Result};

/// Split `text` into overlapping character windows.
///
/// A window whose trimmed form is empty is skipped; kept windows are stored
/// untrimmed. The final window may be shorter than `chunk_size`. Empty input
/// yields zero chunks.
///
/// # Errors
///
/// `InvalidChunkConfig` when `overlap >= chunk_size`, which would prevent
/// forward progress.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if overlap >= chunk_size {
        return Err(DocketError::InvalidChunkConfig {
            chunk_size,
            overlap,
        });
    }

    // Windows are measured in characters, not bytes, so multi-byte text
    // never splits inside a code point.
    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        if !window.trim().is_empty() {
            chunks.push(window);
        }
        start += step;
    }

    Ok(chunks)
}

//! Core data models for the ingestion and retrieval pipeline.

use serde::{Deserialize, Serialize};

/// Per-chunk metadata stored alongside each vector in the tenant index.
///
/// Serialized with a `type` tag (`document` / `email`) so the stored JSON
/// matches the descriptor shape callers see in answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChunkMeta {
    Document {
        filename: String,
        chunk_index: usize,
        client_id: String,
    },
    Email {
        subject: String,
        from: String,
        to: String,
        date: String,
        email_index: usize,
        chunk_index: usize,
        client_id: String,
    },
}

impl ChunkMeta {
    /// The tenant that owns this chunk.
    pub fn client_id(&self) -> &str {
        match self {
            ChunkMeta::Document { client_id, .. } => client_id,
            ChunkMeta::Email { client_id, .. } => client_id,
        }
    }

    /// Project this chunk's metadata to the citation descriptor surfaced in
    /// answers. Fields are always present here, so descriptor equality is
    /// plain field equality; a metadata record deserialized without a field
    /// would compare against the empty string.
    pub fn source_ref(&self) -> SourceRef {
        match self {
            ChunkMeta::Document { filename, .. } => SourceRef::Document {
                filename: filename.clone(),
            },
            ChunkMeta::Email { subject, from, .. } => SourceRef::Email {
                subject: subject.clone(),
                from: from.clone(),
            },
        }
    }
}

/// A citation descriptor: which source a retrieved chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceRef {
    Document { filename: String },
    Email { subject: String, from: String },
}

/// Outcome of ingesting one uploaded document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentIngestReport {
    pub filename: String,
    pub chunks_processed: usize,
}

/// Outcome of ingesting a mail thread.
#[derive(Debug, Clone, Serialize)]
pub struct MailboxIngestReport {
    pub emails_processed: usize,
    pub chunks_created: usize,
}

/// A synthesized answer plus its capped, de-duplicated citation list.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

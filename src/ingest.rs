//! Ingestion service: normalize, chunk, embed, index.
//!
//! Both ingestion paths batch every chunk of the call into a single
//! embedding request and only touch the index after all vectors exist, so a
//! failed call never leaves partially-embedded chunks behind.

use std::sync::Arc;

use tracing::{debug, info};

use crate::chunk::chunk_text;
use crate::config::ChunkingConfig;
use crate::embedding::Embedder;
use crate::error::{DocketError, Result};
use crate::extract::{self, SourceFormat};
use crate::mail::MailSource;
use crate::models::{ChunkMeta, DocumentIngestReport, MailboxIngestReport};
use crate::store::{IndexEntry, TenantIndex};

pub struct IngestionService {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn TenantIndex>,
    chunking: ChunkingConfig,
}

impl IngestionService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn TenantIndex>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            chunking,
        }
    }

    /// Ingest one uploaded document into the client's collection.
    ///
    /// Chunk ids are `{filename}_{index}`, so re-uploading a file with the
    /// same name overwrites its previous chunks instead of duplicating them.
    pub async fn ingest_document(
        &self,
        client_id: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<DocumentIngestReport> {
        let format = SourceFormat::from_filename(filename)?;
        let text = extract::extract_text(bytes, format);
        if text.trim().is_empty() {
            return Err(DocketError::EmptyExtraction(filename.to_string()));
        }

        let chunks = chunk_text(
            &text,
            self.chunking.document_chunk_size,
            self.chunking.document_overlap,
        )?;
        if chunks.is_empty() {
            return Err(DocketError::EmptyExtraction(filename.to_string()));
        }
        debug!(client_id, filename, chunks = chunks.len(), "document chunked");

        let vectors = self.embedder.embed(&chunks).await?;

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (document, vector))| IndexEntry {
                id: format!("{filename}_{i}"),
                vector,
                document,
                metadata: ChunkMeta::Document {
                    filename: filename.to_string(),
                    chunk_index: i,
                    client_id: client_id.to_string(),
                },
            })
            .collect();

        let chunks_processed = entries.len();
        self.index.upsert(client_id, entries).await?;
        info!(client_id, filename, chunks_processed, "document ingested");

        Ok(DocumentIngestReport {
            filename: filename.to_string(),
            chunks_processed,
        })
    }

    /// Ingest a mail thread into the client's collection.
    ///
    /// Every message is rendered as a header-plus-body block and chunked
    /// independently, but all chunks across the thread are embedded in one
    /// batch and upserted with ids `email_{global_index}`, where the index
    /// runs across the whole thread.
    pub async fn ingest_mailbox(
        &self,
        client_id: &str,
        source: &dyn MailSource,
    ) -> Result<MailboxIngestReport> {
        let messages = source.messages();

        let mut texts: Vec<String> = Vec::new();
        let mut metadatas: Vec<ChunkMeta> = Vec::new();

        for (email_index, message) in messages.iter().enumerate() {
            let rendered = message.render();
            let chunks = chunk_text(
                &rendered,
                self.chunking.email_chunk_size,
                self.chunking.email_overlap,
            )?;
            for (chunk_index, chunk) in chunks.into_iter().enumerate() {
                texts.push(chunk);
                metadatas.push(ChunkMeta::Email {
                    subject: message.subject.clone(),
                    from: message.from.clone(),
                    to: message.to.clone(),
                    date: message.date.clone(),
                    email_index,
                    chunk_index,
                    client_id: client_id.to_string(),
                });
            }
        }

        if texts.is_empty() {
            return Ok(MailboxIngestReport {
                emails_processed: messages.len(),
                chunks_created: 0,
            });
        }

        let vectors = self.embedder.embed(&texts).await?;

        let entries: Vec<IndexEntry> = texts
            .into_iter()
            .zip(vectors)
            .zip(metadatas)
            .enumerate()
            .map(|(global_index, ((document, vector), metadata))| IndexEntry {
                id: format!("email_{global_index}"),
                vector,
                document,
                metadata,
            })
            .collect();

        let chunks_created = entries.len();
        self.index.upsert(client_id, entries).await?;
        info!(
            client_id,
            emails = messages.len(),
            chunks_created,
            "mailbox ingested"
        );

        Ok(MailboxIngestReport {
            emails_processed: messages.len(),
            chunks_created,
        })
    }
}

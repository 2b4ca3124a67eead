//! Retrieval service: embed the question, query the tenant index, assemble
//! grounding context, synthesize an answer, and cite sources.
//!
//! An empty tenant index short-circuits before any provider call, so asking
//! against a fresh client costs nothing.

use std::sync::Arc;

use tracing::{debug, info};

use crate::embedding::Embedder;
use crate::error::{DocketError, Result};
use crate::models::{Answer, SourceRef};
use crate::store::TenantIndex;
use crate::synthesis::Synthesizer;

/// Nearest chunks retrieved per question (clamped to the tenant's count).
const RETRIEVAL_K: usize = 5;

/// Maximum distinct source descriptors surfaced per answer.
const MAX_SOURCES: usize = 3;

/// Delimiter between retrieved chunks in the grounding context.
const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Answer returned without any provider call when the tenant has no data.
pub const NO_SOURCES_ANSWER: &str = "No documents or emails have been indexed for this client yet. \
    Please upload documents or ingest mail first.";

const SYSTEM_INSTRUCTION: &str = "You are a legal AI assistant for lawyers. Answer questions \
    based on the provided documents and emails. Be specific, cite sources when possible, and \
    maintain a professional tone. If you cannot answer based on the context, say so.";

pub struct RetrievalService {
    embedder: Arc<dyn Embedder>,
    synthesizer: Arc<dyn Synthesizer>,
    index: Arc<dyn TenantIndex>,
}

impl RetrievalService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        synthesizer: Arc<dyn Synthesizer>,
        index: Arc<dyn TenantIndex>,
    ) -> Self {
        Self {
            embedder,
            synthesizer,
            index,
        }
    }

    /// Answer a natural-language question from the client's indexed sources.
    pub async fn ask(&self, client_id: &str, question: &str) -> Result<Answer> {
        let count = self.index.count(client_id).await?;
        if count == 0 {
            info!(client_id, "empty index, short-circuiting");
            return Ok(Answer {
                answer: NO_SOURCES_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let question_batch = vec![question.to_string()];
        let mut vectors = self.embedder.embed(&question_batch).await?;
        let query_vector = vectors
            .pop()
            .ok_or_else(|| DocketError::EmbeddingUnavailable("empty response".to_string()))?;

        let k = RETRIEVAL_K.min(count as usize);
        let hits = self.index.query(client_id, &query_vector, k).await?;
        debug!(client_id, hits = hits.len(), k, "retrieved chunks");

        let context = hits
            .iter()
            .map(|h| h.document.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_DELIMITER);

        let user_prompt = format!(
            "Context from documents and emails:\n\n{context}\n\nQuestion: {question}\n\n\
             Please provide a clear, concise answer based on the context above."
        );

        let answer = self
            .synthesizer
            .synthesize(SYSTEM_INSTRUCTION, &user_prompt)
            .await?;

        let sources = dedup_sources(hits.iter().map(|h| h.metadata.source_ref()));
        info!(client_id, sources = sources.len(), "question answered");

        Ok(Answer { answer, sources })
    }
}

/// Keep the first occurrence of each descriptor in rank order, capped at
/// [`MAX_SOURCES`]. Chunks of the same document or email commonly rank
/// together; repeating their citation would waste the source-list budget.
fn dedup_sources(refs: impl Iterator<Item = SourceRef>) -> Vec<SourceRef> {
    let mut sources: Vec<SourceRef> = Vec::new();
    for source in refs {
        if !sources.contains(&source) {
            sources.push(source);
        }
        if sources.len() == MAX_SOURCES {
            break;
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(filename: &str) -> SourceRef {
        SourceRef::Document {
            filename: filename.to_string(),
        }
    }

    #[test]
    fn dedup_keeps_first_rank_order() {
        // Hits 1, 2, 4 share a descriptor; 3 and 5 are distinct.
        let refs = vec![doc("a"), doc("a"), doc("b"), doc("a"), doc("c")];
        let sources = dedup_sources(refs.into_iter());
        assert_eq!(sources, vec![doc("a"), doc("b"), doc("c")]);
    }

    #[test]
    fn dedup_caps_at_three() {
        let refs = vec![doc("a"), doc("b"), doc("c"), doc("d"), doc("e")];
        let sources = dedup_sources(refs.into_iter());
        assert_eq!(sources.len(), 3);
        assert_eq!(sources, vec![doc("a"), doc("b"), doc("c")]);
    }

    #[test]
    fn dedup_treats_email_and_document_as_distinct() {
        let email = SourceRef::Email {
            subject: "a".to_string(),
            from: "x@example.com".to_string(),
        };
        let refs = vec![doc("a"), email.clone(), email.clone()];
        let sources = dedup_sources(refs.into_iter());
        assert_eq!(sources, vec![doc("a"), email]);
    }
}

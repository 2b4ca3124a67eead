//! Tenant vector store abstraction.
//!
//! The [`TenantIndex`] trait defines the three operations the pipeline needs
//! from a vector store: id-keyed upsert, per-tenant count, and cosine k-NN
//! query. Tenants are isolated collections keyed by client id, created
//! lazily on first write and never merged. Implementations must be
//! `Send + Sync`; the store is the only cross-request shared state.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ChunkMeta;

/// One retrievable unit: chunk text, its vector, and its metadata.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Externally-derived composite key; re-upserting the same id overwrites.
    pub id: String,
    pub vector: Vec<f32>,
    pub document: String,
    pub metadata: ChunkMeta,
}

/// A query result: chunk text plus metadata, with the similarity it ranked at.
#[derive(Debug, Clone)]
pub struct RankedHit {
    pub document: String,
    pub metadata: ChunkMeta,
    /// Cosine similarity against the query vector (higher is nearer).
    pub score: f32,
}

#[async_trait]
pub trait TenantIndex: Send + Sync {
    /// Insert or overwrite entries in the tenant's collection.
    async fn upsert(&self, client_id: &str, entries: Vec<IndexEntry>) -> Result<()>;

    /// Number of stored chunks for the tenant; zero for a never-written tenant.
    async fn count(&self, client_id: &str) -> Result<u64>;

    /// The `k` nearest chunks by cosine similarity, nearest first. `k` is
    /// clamped to the tenant's count.
    async fn query(&self, client_id: &str, vector: &[f32], k: usize) -> Result<Vec<RankedHit>>;
}

/// Encode a float vector as little-endian `f32` bytes for BLOB storage.
pub(crate) fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB written by [`vec_to_blob`].
pub(crate) fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity in `[-1.0, 1.0]`; `0.0` for empty or mismatched vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Rank stored (vector, payload) pairs against a query vector and return the
/// top `k` by descending similarity. Shared by both store backends so they
/// clamp and order identically.
pub(crate) fn rank_by_similarity(
    entries: Vec<(Vec<f32>, String, ChunkMeta)>,
    query: &[f32],
    k: usize,
) -> Vec<RankedHit> {
    let mut hits: Vec<RankedHit> = entries
        .into_iter()
        .map(|(vector, document, metadata)| RankedHit {
            score: cosine_similarity(&vector, query),
            document,
            metadata,
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(k.min(hits.len()));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_blob_round_trip() {
        let vec = vec![1.0f32, -2.5, 3.125, 0.0, -0.001];
        let blob = vec_to_blob(&vec);
        assert_eq!(blob.len(), 20);
        assert_eq!(blob_to_vec(&blob), vec);
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn ranking_orders_nearest_first_and_clamps() {
        let meta = |i: usize| crate::models::ChunkMeta::Document {
            filename: "f.txt".to_string(),
            chunk_index: i,
            client_id: "c".to_string(),
        };
        let entries = vec![
            (vec![0.0, 1.0], "far".to_string(), meta(0)),
            (vec![1.0, 0.0], "near".to_string(), meta(1)),
            (vec![0.7, 0.7], "mid".to_string(), meta(2)),
        ];
        let hits = rank_by_similarity(entries, &[1.0, 0.0], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, "near");
        assert_eq!(hits[1].document, "mid");

        let hits = rank_by_similarity(Vec::new(), &[1.0, 0.0], 5);
        assert!(hits.is_empty());
    }
}

//! SQLite-backed [`TenantIndex`].
//!
//! All tenants live in one database file under the configured base path,
//! partitioned by a `collection` column; every statement filters on it, so
//! no query can cross tenants. Vectors are stored as little-endian f32
//! BLOBs and ranked by brute-force cosine similarity, which is ample for
//! per-client collections of uploaded documents.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DocketError, Result};
use crate::models::ChunkMeta;

use super::{blob_to_vec, rank_by_similarity, vec_to_blob, IndexEntry, RankedHit, TenantIndex};

const DB_FILE: &str = "index.sqlite";

/// Durable tenant index persisted under a base directory.
pub struct SqliteIndex {
    pool: SqlitePool,
}

impl SqliteIndex {
    /// Open (or create) the index database under `base_path` and ensure the
    /// schema exists. Safe to call repeatedly.
    pub async fn open(base_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(base_path)
            .map_err(|e| DocketError::IndexUnavailable(e.to_string()))?;
        let db_path = base_path.join(DB_FILE);

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
            .map_err(|e| DocketError::IndexUnavailable(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS index_entries (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                embedding BLOB NOT NULL,
                document TEXT NOT NULL,
                metadata_json TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_entries_collection ON index_entries(collection)",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl TenantIndex for SqliteIndex {
    async fn upsert(&self, client_id: &str, entries: Vec<IndexEntry>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for entry in &entries {
            let metadata_json = serde_json::to_string(&entry.metadata)
                .map_err(|e| DocketError::IndexUnavailable(e.to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO index_entries (collection, id, embedding, document, metadata_json)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(collection, id) DO UPDATE SET
                    embedding = excluded.embedding,
                    document = excluded.document,
                    metadata_json = excluded.metadata_json
                "#,
            )
            .bind(client_id)
            .bind(&entry.id)
            .bind(vec_to_blob(&entry.vector))
            .bind(&entry.document)
            .bind(&metadata_json)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn count(&self, client_id: &str) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM index_entries WHERE collection = ?")
                .bind(client_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn query(&self, client_id: &str, vector: &[f32], k: usize) -> Result<Vec<RankedHit>> {
        let rows = sqlx::query(
            "SELECT embedding, document, metadata_json FROM index_entries WHERE collection = ?",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let blob: Vec<u8> = row.get("embedding");
            let document: String = row.get("document");
            let metadata_json: String = row.get("metadata_json");
            let metadata: ChunkMeta = serde_json::from_str(&metadata_json)
                .map_err(|e| DocketError::IndexUnavailable(e.to_string()))?;
            entries.push((blob_to_vec(&blob), document, metadata));
        }

        Ok(rank_by_similarity(entries, vector, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, vector: Vec<f32>, client: &str, index: usize) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            vector,
            document: format!("text for {id}"),
            metadata: ChunkMeta::Document {
                filename: "f.txt".to_string(),
                chunk_index: index,
                client_id: client.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn count_is_zero_for_unknown_tenant() {
        let dir = tempfile::tempdir().unwrap();
        let index = SqliteIndex::open(dir.path()).await.unwrap();
        assert_eq!(index.count("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn upsert_overwrites_colliding_ids() {
        let dir = tempfile::tempdir().unwrap();
        let index = SqliteIndex::open(dir.path()).await.unwrap();

        index
            .upsert("acme", vec![entry("f.txt_0", vec![1.0, 0.0], "acme", 0)])
            .await
            .unwrap();
        index
            .upsert("acme", vec![entry("f.txt_0", vec![0.0, 1.0], "acme", 0)])
            .await
            .unwrap();

        assert_eq!(index.count("acme").await.unwrap(), 1);
        let hits = index.query("acme", &[0.0, 1.0], 1).await.unwrap();
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn tenants_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let index = SqliteIndex::open(dir.path()).await.unwrap();

        index
            .upsert("tenant_a", vec![entry("a_0", vec![1.0, 0.0], "tenant_a", 0)])
            .await
            .unwrap();
        index
            .upsert("tenant_b", vec![entry("b_0", vec![1.0, 0.0], "tenant_b", 0)])
            .await
            .unwrap();

        let hits = index.query("tenant_a", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.client_id(), "tenant_a");
    }

    #[tokio::test]
    async fn query_clamps_k_to_count() {
        let dir = tempfile::tempdir().unwrap();
        let index = SqliteIndex::open(dir.path()).await.unwrap();

        index
            .upsert(
                "acme",
                vec![
                    entry("f.txt_0", vec![1.0, 0.0], "acme", 0),
                    entry("f.txt_1", vec![0.5, 0.5], "acme", 1),
                ],
            )
            .await
            .unwrap();

        let hits = index.query("acme", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let index = SqliteIndex::open(dir.path()).await.unwrap();
            index
                .upsert("acme", vec![entry("f.txt_0", vec![1.0, 0.0], "acme", 0)])
                .await
                .unwrap();
        }
        let index = SqliteIndex::open(dir.path()).await.unwrap();
        assert_eq!(index.count("acme").await.unwrap(), 1);
    }
}

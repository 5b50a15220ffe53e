//! SQLite-backed document index.
//!
//! Chunk text and metadata live in SQLite; embeddings are stored as
//! little-endian f32 blobs and searched with a brute-force cosine scan.
//! Internal corpora are small enough that a scan beats maintaining an ANN
//! structure.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{DocChunk, DocSearchResult, DocumentStore};
use crate::core::errors::ApiError;

const FINGERPRINT_KEY: &str = "corpus_fingerprint";

pub struct SqliteDocStore {
    pool: SqlitePool,
}

impl SqliteDocStore {
    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS doc_chunks (
                chunk_id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                page INTEGER,
                chunk_index INTEGER NOT NULL DEFAULT 0,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_doc_chunks_source ON doc_chunks(source)")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> DocChunk {
        DocChunk {
            chunk_id: row.get("chunk_id"),
            content: row.get("content"),
            source: row.get("source"),
            page: row.get::<Option<i64>, _>("page").map(|p| p as u32),
            chunk_index: row.get::<i64, _>("chunk_index") as usize,
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocStore {
    async fn insert_batch(&self, items: Vec<(DocChunk, Vec<f32>)>) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        for (chunk, embedding) in items {
            let blob = Self::serialize_embedding(&embedding);
            sqlx::query(
                "INSERT OR REPLACE INTO doc_chunks
                     (chunk_id, source, page, chunk_index, content, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&chunk.chunk_id)
            .bind(&chunk.source)
            .bind(chunk.page.map(|p| p as i64))
            .bind(chunk.chunk_index as i64)
            .bind(&chunk.content)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;
        }

        tx.commit().await.map_err(ApiError::internal)?;
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<DocSearchResult>, ApiError> {
        let rows = sqlx::query(
            "SELECT chunk_id, source, page, chunk_index, content, embedding FROM doc_chunks",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        let mut results: Vec<DocSearchResult> = rows
            .iter()
            .map(|row| {
                let embedding = Self::deserialize_embedding(row.get::<Vec<u8>, _>("embedding").as_slice());
                DocSearchResult {
                    chunk: Self::row_to_chunk(row),
                    score: Self::cosine_similarity(query_embedding, &embedding),
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM doc_chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(count as usize)
    }

    async fn fingerprint(&self) -> Result<Option<String>, ApiError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM index_meta WHERE key = ?1")
                .bind(FINGERPRINT_KEY)
                .fetch_optional(&self.pool)
                .await
                .map_err(ApiError::internal)?;
        Ok(value)
    }

    async fn set_fingerprint(&self, value: &str) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO index_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value,
                 updated_at = STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(FINGERPRINT_KEY)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM doc_chunks")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        sqlx::query("DELETE FROM index_meta")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, content: &str) -> DocChunk {
        DocChunk {
            chunk_id: id.to_string(),
            content: content.to_string(),
            source: "manual/handbook.txt".to_string(),
            page: None,
            chunk_index: 0,
        }
    }

    async fn temp_store(dir: &tempfile::TempDir) -> SqliteDocStore {
        SqliteDocStore::with_path(dir.path().join("index.db"))
            .await
            .expect("store opens")
    }

    #[tokio::test]
    async fn search_orders_by_cosine_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir).await;

        store
            .insert_batch(vec![
                (chunk("a", "vacation policy"), vec![1.0, 0.0]),
                (chunk("b", "expense policy"), vec![0.0, 1.0]),
                (chunk("c", "travel policy"), vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.chunk_id, "a");
        assert_eq!(results[1].chunk.chunk_id, "c");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn fingerprint_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir).await;

        assert_eq!(store.fingerprint().await.unwrap(), None);
        store.set_fingerprint("abc123").await.unwrap();
        assert_eq!(store.fingerprint().await.unwrap(), Some("abc123".to_string()));
        store.set_fingerprint("def456").await.unwrap();
        assert_eq!(store.fingerprint().await.unwrap(), Some("def456".to_string()));
    }

    #[tokio::test]
    async fn clear_removes_chunks_and_meta() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir).await;

        store
            .insert_batch(vec![(chunk("a", "text"), vec![1.0])])
            .await
            .unwrap();
        store.set_fingerprint("abc").await.unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.fingerprint().await.unwrap(), None);
    }

    #[tokio::test]
    async fn page_numbers_survive_storage() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir).await;

        let mut paged = chunk("p", "page two text");
        paged.source = "manual/guide.pdf".to_string();
        paged.page = Some(2);
        store.insert_batch(vec![(paged, vec![1.0])]).await.unwrap();

        let results = store.search(&[1.0], 1).await.unwrap();
        assert_eq!(results[0].chunk.page, Some(2));
    }
}

//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For large collections, consider the sqlite-vec extension or a dedicated
//! vector database.

use super::{cosine_similarity, Document, SearchResult, VectorStore};
use crate::error::{Result, SvaraError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        source TEXT NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_source ON documents(source);
    CREATE INDEX IF NOT EXISTS idx_documents_indexed_at ON documents(indexed_at);
"#;

impl SqliteVectorStore {
    /// Create a new SQLite vector store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SvaraError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(3)?;
        let indexed_at_str: String = row.get(4)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            source: row.get(1)?,
            content: row.get(2)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, doc))]
    async fn upsert(&self, doc: &Document) -> Result<()> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO documents (id, source, content, embedding, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                doc.id.to_string(),
                doc.source,
                doc.content,
                Self::embedding_to_bytes(&doc.embedding),
                doc.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!("Upserted document {}", doc.id);
        Ok(())
    }

    #[instrument(skip(self, docs))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock_conn()?;
        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO documents (id, source, content, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    doc.id.to_string(),
                    doc.source,
                    doc.content,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, 0.0).await
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, source, content, embedding, indexed_at FROM documents",
        )?;

        let docs = stmt.query_map([], Self::row_to_document)?;

        let mut results: Vec<SearchResult> = docs
            .filter_map(|doc_result| doc_result.ok())
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult {
                    document: doc,
                    score,
                }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_source(&self, source: &str) -> Result<usize> {
        let conn = self.lock_conn()?;

        let deleted = conn.execute("DELETE FROM documents WHERE source = ?1", params![source])?;

        info!("Deleted {} documents from source {}", deleted, source);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_documents(&self) -> Result<Vec<Document>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, source, content, embedding, indexed_at FROM documents ORDER BY indexed_at DESC",
        )?;

        let docs = stmt.query_map([], Self::row_to_document)?;
        Ok(docs.filter_map(|d| d.ok()).collect())
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock_conn()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let doc = Document::new(
            "notes.txt".to_string(),
            "Paris is the capital of France".to_string(),
            vec![1.0, 0.0, 0.0],
        );

        store.upsert(&doc).await.unwrap();
        assert_eq!(store.document_count().await.unwrap(), 1);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].document.content, "Paris is the capital of France");

        let deleted = store.delete_by_source("notes.txt").await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_threshold_and_ordering() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let close = Document::new("a".to_string(), "close".to_string(), vec![1.0, 0.1, 0.0]);
        let far = Document::new("b".to_string(), "far".to_string(), vec![0.0, 1.0, 0.0]);
        store.upsert_batch(&[close, far]).await.unwrap();

        let results = store
            .search_with_threshold(&[1.0, 0.0, 0.0], 10, 0.5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.content, "close");
    }

    #[tokio::test]
    async fn test_embedding_round_trips_through_blob() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let embedding = vec![0.25, -1.5, 3.125];
        let doc = Document::new("a".to_string(), "content".to_string(), embedding.clone());
        store.upsert(&doc).await.unwrap();

        let docs = store.list_documents().await.unwrap();
        assert_eq!(docs[0].embedding, embedding);
    }

    #[tokio::test]
    async fn test_on_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        let store = SqliteVectorStore::new(&path).unwrap();
        let doc = Document::new("a".to_string(), "content".to_string(), vec![1.0]);
        store.upsert(&doc).await.unwrap();

        assert!(path.exists());
        assert_eq!(store.document_count().await.unwrap(), 1);
    }
}

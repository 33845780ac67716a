//! Query retrieval: embed, then nearest-neighbor search.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;
use tracing::debug;

/// Retrieves the stored documents most similar to a query.
///
/// Every retrieval embeds the query first; nothing is cached across calls.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    top_k: usize,
    min_score: f32,
}

impl Retriever {
    /// Create a new retriever with default limits.
    pub fn new(embedder: Arc<dyn Embedder>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            vector_store,
            top_k: 3,
            min_score: 0.0,
        }
    }

    /// Set the number of documents to retrieve.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Retrieve the nearest documents for a query.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query).await?;

        let results = self
            .vector_store
            .search_with_threshold(&query_embedding, self.top_k, self.min_score)
            .await?;

        debug!("Retrieved {} documents for query", results.len());
        Ok(results)
    }
}

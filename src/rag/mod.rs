//! Retrieval-augmented answering.
//!
//! The retriever embeds a query and looks up the nearest stored documents;
//! the answer engine turns the best match into a spoken-style answer.

mod answer;
mod retriever;

pub use answer::{Answer, AnswerEngine, Generator, OpenAIGenerator, NO_MATCH_MESSAGE};
pub use retriever::Retriever;

use crate::vector_store::SearchResult;

/// A retrieved document with its similarity score, for display as a source.
#[derive(Debug, Clone)]
pub struct RetrievedDoc {
    /// Source label of the document.
    pub source: String,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for RetrievedDoc {
    fn from(result: SearchResult) -> Self {
        Self {
            source: result.document.source,
            content: result.document.content,
            score: result.score,
        }
    }
}

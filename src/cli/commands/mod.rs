//! CLI command implementations.

mod ask;
mod config;
mod index;
mod init;
mod list;
mod search;
mod talk;

pub use ask::run_ask;
pub use config::run_config;
pub use index::run_index;
pub use init::run_init;
pub use list::run_list;
pub use search::run_search;
pub use talk::run_talk;

use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvaraError};
use crate::rag::{AnswerEngine, OpenAIGenerator, Retriever};
use crate::vector_store::{MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::sync::Arc;

/// Open the configured vector store backend.
pub(crate) fn open_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    match settings.vector_store.provider.as_str() {
        "sqlite" => Ok(Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?)),
        "memory" => Ok(Arc::new(MemoryVectorStore::new())),
        other => Err(SvaraError::Config(format!(
            "Unknown vector store provider: {}",
            other
        ))),
    }
}

/// Build the configured embedder.
pub(crate) fn build_embedder(settings: &Settings) -> Arc<dyn Embedder> {
    Arc::new(OpenAIEmbedder::with_config(
        settings.openai.api_key(),
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ))
}

/// Assemble the answer engine from settings.
pub(crate) fn build_engine(
    settings: &Settings,
    store: Arc<dyn VectorStore>,
) -> AnswerEngine {
    let embedder = build_embedder(settings);

    let retriever = Retriever::new(embedder, store)
        .with_top_k(settings.retrieval.top_k as usize)
        .with_min_score(settings.retrieval.min_score);

    let generator = Arc::new(OpenAIGenerator::new(
        settings.openai.api_key(),
        &settings.generation.model,
        settings.generation.max_tokens,
        settings.generation.temperature,
    ));

    AnswerEngine::new(retriever, generator)
}

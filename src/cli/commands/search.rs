//! Search command implementation.

use super::{build_embedder, open_store};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::Retriever;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: f32,
    settings: Settings,
) -> Result<()> {
    let store = open_store(&settings)?;
    let embedder = build_embedder(&settings);

    let retriever = Retriever::new(embedder, store)
        .with_top_k(limit)
        .with_min_score(min_score);

    let spinner = Output::spinner("Searching...");

    let results = retriever.retrieve(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            if results.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", results.len()));

                for result in &results {
                    Output::search_result(
                        &result.document.source,
                        result.score,
                        &result.document.content,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

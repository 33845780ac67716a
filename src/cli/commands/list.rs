//! List command implementation.

use super::open_store;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let store = open_store(&settings)?;

    match store.list_documents().await {
        Ok(docs) => {
            if docs.is_empty() {
                Output::info("No documents indexed yet. Use 'svara index <text>' to add some.");
            } else {
                Output::header(&format!("Indexed Documents ({})", docs.len()));
                println!();

                for doc in &docs {
                    Output::document_row(
                        &doc.source,
                        &doc.indexed_at.format("%Y-%m-%d %H:%M").to_string(),
                        &doc.preview(120),
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list documents: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

//! Index command implementation.

use super::{build_embedder, open_store};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SvaraError;
use crate::vector_store::Document;
use anyhow::Result;
use std::io::Read;

/// Run the index command: embed a document and store it in the collection.
pub async fn run_index(
    text: Option<String>,
    file: Option<String>,
    stdin: bool,
    source: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let (content, default_source) = read_content(text, file.as_deref(), stdin)?;

    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(SvaraError::InvalidInput("Document is empty".to_string()).into());
    }

    let source = source.unwrap_or(default_source);

    let store = open_store(&settings)?;
    let embedder = build_embedder(&settings);

    let spinner = Output::spinner("Embedding document...");

    let embedding = match embedder.embed(&content).await {
        Ok(embedding) => embedding,
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Embedding failed: {}", e));
            return Err(e.into());
        }
    };

    let doc = Document::new(source.clone(), content, embedding);
    store.upsert(&doc).await?;

    spinner.finish_and_clear();
    Output::success(&format!("Indexed document from '{}'", source));
    Output::kv("id", &doc.id.to_string());
    Output::kv(
        "documents in collection",
        &store.document_count().await?.to_string(),
    );

    Ok(())
}

/// Resolve the document content and a default source label.
fn read_content(
    text: Option<String>,
    file: Option<&str>,
    stdin: bool,
) -> Result<(String, String)> {
    if let Some(text) = text {
        return Ok((text, "manual".to_string()));
    }

    if let Some(path) = file {
        let expanded = Settings::expand_path(path);
        let content = std::fs::read_to_string(&expanded)
            .map_err(|e| SvaraError::InvalidInput(format!("Cannot read {}: {}", path, e)))?;
        let label = expanded
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path)
            .to_string();
        return Ok((content, label));
    }

    if stdin {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok((content, "stdin".to_string()));
    }

    Err(SvaraError::InvalidInput(
        "Provide document text, --file, or --stdin".to_string(),
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_content_inline_text() {
        let (content, source) =
            read_content(Some("hello".to_string()), None, false).unwrap();
        assert_eq!(content, "hello");
        assert_eq!(source, "manual");
    }

    #[test]
    fn test_read_content_requires_an_input() {
        assert!(read_content(None, None, false).is_err());
    }
}

//! Answer generation from retrieved context.

use super::{RetrievedDoc, Retriever};
use crate::error::{Result, SvaraError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fixed response when retrieval yields no documents.
pub const NO_MATCH_MESSAGE: &str = "No relevant information found.";

/// Trait for LLM text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text from a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// OpenAI chat-completion based generator with fixed sampling parameters.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAIGenerator {
    /// Create a new generator.
    pub fn new(api_key: Option<&str>, model: &str, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client: create_client(api_key),
            model: model.to_string(),
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| SvaraError::Generation(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .max_completion_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build()
            .map_err(|e| SvaraError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvaraError::OpenAI(format!("Generation API error: {}", e)))?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SvaraError::Generation("Empty response from LLM".to_string()))?
            .trim()
            .to_string();

        Ok(text)
    }
}

/// The outcome of answering a query.
#[derive(Debug, Clone)]
pub enum Answer {
    /// A generated answer with the documents it was built from.
    Generated {
        text: String,
        sources: Vec<RetrievedDoc>,
    },
    /// Retrieval found nothing relevant; generation was not invoked.
    NoMatch,
}

impl Answer {
    /// The text to print and speak for this answer.
    pub fn text(&self) -> &str {
        match self {
            Answer::Generated { text, .. } => text,
            Answer::NoMatch => NO_MATCH_MESSAGE,
        }
    }

    /// Source documents, if any.
    pub fn sources(&self) -> &[RetrievedDoc] {
        match self {
            Answer::Generated { sources, .. } => sources,
            Answer::NoMatch => &[],
        }
    }
}

/// Answers questions from the document collection.
pub struct AnswerEngine {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
}

impl AnswerEngine {
    /// Create a new answer engine.
    pub fn new(retriever: Retriever, generator: Arc<dyn Generator>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer a query: embed, retrieve, then generate from the best match.
    ///
    /// If retrieval returns no documents the generator is never called and
    /// [`Answer::NoMatch`] is returned.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn answer(&self, query: &str) -> Result<Answer> {
        info!("Answering query");

        let results = self.retriever.retrieve(query).await?;

        if results.is_empty() {
            debug!("No documents matched the query");
            return Ok(Answer::NoMatch);
        }

        let sources: Vec<RetrievedDoc> = results.into_iter().map(RetrievedDoc::from).collect();

        // The prompt is built from the single best-scoring document only;
        // the rest are reported as sources.
        let prompt = build_prompt(query, &sources[0].content);
        let text = self.generator.generate(&prompt).await?;

        debug!("Generated answer with {} sources", sources.len());

        Ok(Answer::Generated { text, sources })
    }
}

/// Assemble the generation prompt from a query and its best-matching document.
fn build_prompt(query: &str, information: &str) -> String {
    format!(
        "Answer the following query based on the provided information:\n\n\
         Query: {}\n\n\
         Information: {}\n\n\
         Response:",
        query, information
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }

        fn dimensions(&self) -> usize {
            self.0.len()
        }
    }

    struct CountingGenerator {
        calls: AtomicUsize,
        reply: String,
    }

    #[async_trait]
    impl Generator for CountingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_build_prompt_contains_query_and_information() {
        let prompt = build_prompt("What is the capital of France?", "Paris is the capital");
        assert!(prompt.contains("Query: What is the capital of France?"));
        assert!(prompt.contains("Information: Paris is the capital"));
        assert!(prompt.ends_with("Response:"));
    }

    #[tokio::test]
    async fn test_empty_collection_skips_generation() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let embedder = Arc::new(FixedEmbedder(vec![1.0, 0.0]));
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            reply: "should not happen".to_string(),
        });

        let engine = AnswerEngine::new(
            Retriever::new(embedder, store),
            generator.clone(),
        );

        let answer = engine.answer("anything").await.unwrap();
        assert!(matches!(answer, Answer::NoMatch));
        assert_eq!(answer.text(), NO_MATCH_MESSAGE);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_answer_uses_best_match() {
        let store = Arc::new(MemoryVectorStore::new());
        store
            .upsert(&Document::new(
                "facts".to_string(),
                "Paris is the capital of France".to_string(),
                vec![1.0, 0.0],
            ))
            .await
            .unwrap();

        let embedder = Arc::new(FixedEmbedder(vec![1.0, 0.0]));
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            reply: "The capital of France is Paris.".to_string(),
        });

        let engine = AnswerEngine::new(
            Retriever::new(embedder, store as Arc<dyn VectorStore>),
            generator.clone(),
        );

        let answer = engine
            .answer("What is the capital of France?")
            .await
            .unwrap();
        assert_eq!(answer.text(), "The capital of France is Paris.");
        assert_eq!(answer.sources().len(), 1);
        assert_eq!(answer.sources()[0].content, "Paris is the capital of France");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }
}

//! Svara - Voice Question Answering
//!
//! A local-first CLI assistant that answers questions about your own indexed
//! content, by voice or by keyboard.
//!
//! The name "Svara" comes from the Swedish/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svara allows you to:
//! - Index text snippets and files into a local vector database
//! - Ask questions and get AI-powered answers grounded in that content
//! - Hold a spoken conversation: speak a question, hear the answer
//! - Search through your indexed content semantically
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `rag` - Retrieval and answer generation
//! - `voice` - Microphone capture, speech-to-text, text-to-speech
//! - `session` - Interactive conversation loop
//!
//! # Example
//!
//! ```rust,no_run
//! use svara::config::Settings;
//! use svara::rag::{AnswerEngine, Answer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     // Wiring of embedder, store, and generator lives in the CLI layer;
//!     // see `svara::cli::commands` for a complete example.
//!     let _ = settings.sqlite_path();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod rag;
pub mod session;
pub mod vector_store;
pub mod voice;

pub use error::{Result, SvaraError};

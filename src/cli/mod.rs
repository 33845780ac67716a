//! CLI module for Svara.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svara - Voice-driven question answering
///
/// Ask questions about your own documents by voice or text and hear the
/// answer spoken back. The name "Svara" comes from the Scandinavian word
/// for "answer."
#[derive(Parser, Debug)]
#[command(name = "svara")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive voice/text conversation
    Talk {
        /// Disable audio capture and playback (typed input only)
        #[arg(long)]
        text_only: bool,
    },

    /// Add a document to the collection
    Index {
        /// Document text (omit when using --file or --stdin)
        text: Option<String>,

        /// Read the document from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<String>,

        /// Read the document from standard input
        #[arg(long, conflicts_with_all = ["text", "file"])]
        stdin: bool,

        /// Source label stored with the document
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        question: String,
    },

    /// Search for relevant documents
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.25")]
        min_score: f32,
    },

    /// List indexed documents
    List,

    /// Initialize Svara and verify system requirements
    Init,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

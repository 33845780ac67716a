//! Error types for Svara.

use thiserror::Error;

/// Library-level error type for Svara operations.
#[derive(Error, Debug)]
pub enum SvaraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio device error: {0}")]
    Audio(String),

    #[error("Speech recognition failed: {0}")]
    SpeechToText(String),

    #[error("Speech synthesis failed: {0}")]
    TextToSpeech(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SvaraError {
    /// Whether the conversation loop can recover from this error by
    /// abandoning the current turn instead of terminating.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SvaraError::Audio(_)
                | SvaraError::SpeechToText(_)
                | SvaraError::TextToSpeech(_)
                | SvaraError::Embedding(_)
                | SvaraError::Generation(_)
                | SvaraError::OpenAI(_)
                | SvaraError::Http(_)
        )
    }
}

/// Result type alias for Svara operations.
pub type Result<T> = std::result::Result<T, SvaraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_errors_are_recoverable() {
        assert!(SvaraError::Embedding("timeout".to_string()).is_recoverable());
        assert!(SvaraError::SpeechToText("backend down".to_string()).is_recoverable());
        assert!(!SvaraError::Config("missing key".to_string()).is_recoverable());
    }
}

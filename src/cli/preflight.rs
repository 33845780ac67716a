//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, SvaraError};
use crate::openai::is_api_key_available;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// The conversation loop needs an API key for embeddings, generation,
    /// and speech.
    Talk,
    /// Asking questions needs an API key.
    Ask,
    /// Indexing needs an API key for embeddings.
    Index,
    /// Listing only reads the local store.
    List,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Talk | Operation::Ask | Operation::Index => {
            check_api_key(settings)?;
        }
        Operation::List => {
            // No external requirements
        }
    }
    Ok(())
}

/// Check that an OpenAI API key is configured or present in the environment.
fn check_api_key(settings: &Settings) -> Result<()> {
    if is_api_key_available(settings.openai.api_key()) {
        Ok(())
    } else {
        Err(SvaraError::Config(
            "No OpenAI API key. Set openai.api_key in the config file or export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_has_no_requirements() {
        let settings = Settings::default();
        assert!(check(Operation::List, &settings).is_ok());
    }

    #[test]
    fn test_configured_key_passes() {
        let mut settings = Settings::default();
        settings.openai.api_key = Some("sk-test".to_string());
        assert!(check(Operation::Ask, &settings).is_ok());
    }
}

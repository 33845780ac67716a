//! OpenAI client configuration with sensible defaults.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Create an OpenAI client with configured timeout.
///
/// An explicit API key takes precedence; otherwise the `OPENAI_API_KEY`
/// environment variable is used.
pub fn create_client(api_key: Option<&str>) -> Client<OpenAIConfig> {
    create_client_with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    api_key: Option<&str>,
    timeout: Duration,
) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    let config = match api_key {
        Some(key) => OpenAIConfig::default().with_api_key(key),
        None => OpenAIConfig::default(),
    };

    Client::with_config(config).with_http_client(http_client)
}

/// Check if an OpenAI API key is available (configured or via environment).
pub fn is_api_key_available(configured: Option<&str>) -> bool {
    configured.map(|k| !k.is_empty()).unwrap_or(false)
        || std::env::var("OPENAI_API_KEY").map(|k| !k.is_empty()).unwrap_or(false)
}

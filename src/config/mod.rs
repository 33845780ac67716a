//! Configuration module for Svara.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    EmbeddingSettings, GeneralSettings, GenerationSettings, OpenAISettings, RetrievalSettings,
    Settings, VectorStoreSettings, VoiceSettings,
};

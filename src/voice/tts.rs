//! Speech synthesis and playback.

use super::{AudioPlayback, Speaker};
use crate::error::{Result, SvaraError};
use crate::openai::create_client;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, Voice};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Speaks text with the OpenAI speech API through the default output device.
pub struct OpenAISpeaker {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    playback: AudioPlayback,
    model: String,
    voice: String,
    speed: f32,
}

impl OpenAISpeaker {
    /// Create a new speaker around an audio playback instance.
    pub fn new(
        api_key: Option<&str>,
        playback: AudioPlayback,
        model: &str,
        voice: &str,
        speed: f32,
    ) -> Self {
        Self {
            client: create_client(api_key),
            playback,
            model: model.to_string(),
            voice: voice.to_string(),
            speed,
        }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn speech_voice(&self) -> Voice {
        match self.voice.to_lowercase().as_str() {
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy,
        }
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.speech_model())
            .voice(self.speech_voice())
            .speed(self.speed)
            .build()
            .map_err(|e| SvaraError::TextToSpeech(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| SvaraError::TextToSpeech(format!("Speech API error: {}", e)))?;

        debug!(bytes = response.bytes.len(), "synthesized speech");
        Ok(response.bytes.to_vec())
    }
}

#[async_trait]
impl Speaker for OpenAISpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let audio = self.synthesize(text).await?;

        // Playback blocks on the output device until the audio drains.
        tokio::task::block_in_place(|| self.playback.play_mp3(&audio))
    }
}

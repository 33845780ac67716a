//! Speech recognition over captured audio.

use super::capture::{rms, samples_to_wav, AudioCapture, SAMPLE_RATE};
use super::SpeechCapture;
use crate::error::{Result, SvaraError};
use crate::openai::create_client;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Minimum RMS over a whole capture for it to be worth transcribing.
/// Anything quieter is treated as "could not understand".
const MIN_CAPTURE_LEVEL: f32 = 0.003;

/// Recognizes microphone phrases with the OpenAI transcription API.
pub struct WhisperRecognizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    capture: AudioCapture,
    model: String,
}

impl WhisperRecognizer {
    /// Create a new recognizer around an audio capture instance.
    pub fn new(api_key: Option<&str>, capture: AudioCapture, model: &str) -> Self {
        Self {
            client: create_client(api_key),
            capture,
            model: model.to_string(),
        }
    }

    #[instrument(skip(self, wav_bytes), fields(bytes = wav_bytes.len()))]
    async fn transcribe(&self, wav_bytes: Vec<u8>) -> Result<String> {
        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8("query.wav".to_string(), wav_bytes))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| SvaraError::SpeechToText(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| SvaraError::SpeechToText(format!("Whisper API error: {}", e)))?;

        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl SpeechCapture for WhisperRecognizer {
    async fn listen(&self) -> Result<Option<String>> {
        // record_phrase blocks on the audio device, so keep it off the
        // async executor threads' critical path.
        let samples =
            tokio::task::block_in_place(|| self.capture.record_phrase())?;

        if rms(&samples) < MIN_CAPTURE_LEVEL {
            debug!("Capture was silence, skipping transcription");
            return Ok(None);
        }

        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        let text = self.transcribe(wav).await?;

        if text.is_empty() {
            debug!("Transcription came back empty");
            return Ok(None);
        }

        debug!(text = %text, "recognized phrase");
        Ok(Some(text))
    }
}

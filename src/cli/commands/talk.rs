//! Interactive conversation command.

use super::{build_engine, open_store};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::session::Session;
use crate::voice::{
    AudioCapture, AudioPlayback, EndpointConfig, OpenAISpeaker, WhisperRecognizer,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Run the interactive talk command.
pub async fn run_talk(text_only: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Talk, &settings) {
        Output::error(&format!("{}", e));
        return Err(e);
    }

    let store = open_store(&settings)?;
    let engine = build_engine(&settings, store);

    let mut session = Session::new(engine);

    if !text_only {
        // Missing audio devices degrade to a text-only session rather than
        // failing startup.
        let endpoint = EndpointConfig {
            speech_threshold: settings.voice.speech_threshold,
            silence: Duration::from_millis(settings.voice.silence_ms),
            max_phrase: Duration::from_secs(settings.voice.max_phrase_seconds),
        };

        match AudioCapture::new(endpoint) {
            Ok(capture) => {
                let recognizer = WhisperRecognizer::new(
                    settings.openai.api_key(),
                    capture,
                    &settings.voice.stt_model,
                );
                session = session.with_voice_input(Arc::new(recognizer));
            }
            Err(e) => {
                warn!(error = %e, "voice input unavailable");
                Output::warning(&format!("Voice input unavailable: {}", e));
            }
        }

        match AudioPlayback::new() {
            Ok(playback) => {
                let speaker = OpenAISpeaker::new(
                    settings.openai.api_key(),
                    playback,
                    &settings.voice.tts_model,
                    &settings.voice.voice,
                    settings.voice.speed,
                );
                session = session.with_voice_output(Arc::new(speaker));
            }
            Err(e) => {
                warn!(error = %e, "voice output unavailable");
                Output::warning(&format!("Voice output unavailable: {}", e));
            }
        }
    }

    session.run().await
}

//! Voice input and output.
//!
//! Microphone capture with phrase endpointing, speech recognition, speech
//! synthesis, and playback. The session interacts with voice only through
//! the [`SpeechCapture`] and [`Speaker`] traits.

mod capture;
mod playback;
mod stt;
mod tts;

pub use capture::{samples_to_wav, AudioCapture, EndpointConfig, SAMPLE_RATE};
pub use playback::AudioPlayback;
pub use stt::WhisperRecognizer;
pub use tts::OpenAISpeaker;

use crate::error::Result;
use async_trait::async_trait;

/// Captures a spoken phrase and returns the recognized text.
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    /// Block until a phrase is captured and recognized.
    ///
    /// Returns `Ok(None)` when the audio was unintelligible or empty, and
    /// `Err` when capture or the recognition backend failed. Callers treat
    /// the two cases differently, so they must stay distinct.
    async fn listen(&self) -> Result<Option<String>>;
}

/// Speaks text through the default output device.
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Synthesize and play the given text, blocking until playback ends.
    async fn speak(&self, text: &str) -> Result<()>;
}

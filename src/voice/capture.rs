//! Audio capture from the microphone.

use crate::error::{Result, SvaraError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Sample rate for audio capture (16kHz for speech).
pub const SAMPLE_RATE: u32 = 16000;

/// Polling interval while waiting for a phrase to complete.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Phrase endpointing parameters.
#[derive(Debug, Clone, Copy)]
pub struct EndpointConfig {
    /// RMS level above which a frame counts as speech.
    pub speech_threshold: f32,
    /// Trailing silence that ends a phrase.
    pub silence: Duration,
    /// Hard cap on total capture time.
    pub max_phrase: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            speech_threshold: 0.015,
            silence: Duration::from_millis(1200),
            max_phrase: Duration::from_secs(30),
        }
    }
}

/// Captures phrases from the default input device.
///
/// Holds only the negotiated stream configuration; the cpal stream itself is
/// created per capture inside [`record_phrase`](AudioCapture::record_phrase),
/// which blocks the calling thread.
pub struct AudioCapture {
    config: StreamConfig,
    endpoint: EndpointConfig,
}

impl AudioCapture {
    /// Create a new audio capture instance for the default input device.
    pub fn new(endpoint: EndpointConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| SvaraError::Audio("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| SvaraError::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| SvaraError::Audio("no suitable audio config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "audio capture initialized"
        );

        Ok(Self { config, endpoint })
    }

    /// Record a single phrase, blocking until it ends.
    ///
    /// Capture runs until speech has been heard and is followed by the
    /// configured run of trailing silence, or until the phrase cap elapses.
    /// Returns the raw mono samples; an all-silence capture returns whatever
    /// was buffered, which the recognizer discards.
    pub fn record_phrase(&self) -> Result<Vec<f32>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| SvaraError::Audio("no input device".to_string()))?;

        let buffer: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::clone(&buffer);

        let stream = device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = writer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| SvaraError::Audio(e.to_string()))?;

        stream.play().map_err(|e| SvaraError::Audio(e.to_string()))?;

        let started_at = Instant::now();
        let mut consumed = 0usize;
        let mut speech_heard = false;
        let mut trailing_silence = Duration::ZERO;

        loop {
            std::thread::sleep(POLL_INTERVAL);

            let level = {
                let buf = buffer
                    .lock()
                    .map_err(|e| SvaraError::Audio(format!("capture buffer poisoned: {}", e)))?;
                let level = rms(&buf[consumed.min(buf.len())..]);
                consumed = buf.len();
                level
            };

            if level >= self.endpoint.speech_threshold {
                speech_heard = true;
                trailing_silence = Duration::ZERO;
            } else if speech_heard {
                trailing_silence += POLL_INTERVAL;
                if trailing_silence >= self.endpoint.silence {
                    break;
                }
            }

            if started_at.elapsed() >= self.endpoint.max_phrase {
                break;
            }
        }

        drop(stream);

        let samples = buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        debug!(
            samples = samples.len(),
            speech_heard, "phrase capture complete"
        );

        Ok(samples)
    }
}

/// Root-mean-square level of a sample window.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Convert f32 samples to WAV bytes for STT APIs.
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| SvaraError::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| SvaraError::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| SvaraError::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0.0, 0.0]), 0.0);
        assert!((rms(&[0.5, -0.5]) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_samples_to_wav_header() {
        let wav = samples_to_wav(&[0.0, 0.5, -0.5], SAMPLE_RATE).unwrap();
        // RIFF header plus 3 16-bit samples
        assert_eq!(&wav[..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 3 * 2);
    }
}

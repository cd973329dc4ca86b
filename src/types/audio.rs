//! Audio transcription and speech types.

use serde::{Deserialize, Serialize};

use crate::codec::JsonPayload;

/// Verbose transcription result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    /// Task name, `transcribe`.
    #[serde(default)]
    pub task: Option<String>,
    /// Detected or requested language.
    #[serde(default)]
    pub language: Option<String>,
    /// Audio duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Full transcript.
    pub text: String,
    /// Word-level timestamps.
    #[serde(default)]
    pub words: Option<Vec<Word>>,
}

impl JsonPayload for TranscriptionResponse {}

/// A transcribed word with its timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// The word.
    pub word: String,
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds.
    pub end: f64,
}

/// Text-to-speech models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeechModel {
    /// `tts-1`
    #[serde(rename = "tts-1")]
    Tts1,
    /// `tts-1-hd`
    #[serde(rename = "tts-1-hd")]
    Tts1Hd,
}

/// Voices for speech synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    /// Alloy
    Alloy,
    /// Echo
    Echo,
    /// Fable
    Fable,
    /// Onyx
    Onyx,
    /// Nova
    Nova,
    /// Shimmer
    Shimmer,
}

/// Output encodings for synthesized speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3
    Mp3,
    /// Opus
    Opus,
    /// AAC
    Aac,
    /// FLAC
    Flac,
    /// WAV
    Wav,
    /// Raw 24 kHz PCM
    Pcm,
}

/// Speech synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Model ID.
    pub model: SpeechModel,
    /// Text to speak.
    pub input: String,
    /// Voice.
    pub voice: Voice,
    /// Output encoding, `mp3` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<AudioFormat>,
    /// Playback speed, 0.25 to 4.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl SpeechRequest {
    /// Creates a request with the default format and speed.
    pub fn new(model: SpeechModel, input: impl Into<String>, voice: Voice) -> Self {
        Self {
            model,
            input: input.into(),
            voice,
            response_format: None,
            speed: None,
        }
    }

    /// Sets the output encoding.
    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Sets the playback speed.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }
}

impl JsonPayload for SpeechRequest {}

//! OpenAI API client.
//!
//! Builds typed [`Endpoint`]s for the chat, transcription and speech APIs and
//! runs them through a [`Webservice`].

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use std::sync::Arc;
use tracing::instrument;

use crate::codec::Encodable;
use crate::config::OpenAIConfig;
use crate::endpoint::{Endpoint, EndpointBuilder};
use crate::errors::{WebserviceError, WebserviceResult};
use crate::multipart::MultipartForm;
use crate::transport::{EventStream, ReqwestTransport, Webservice};
use crate::types::{
    ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse,
    ChatCompletionStreamingResponse, ChatModel, SpeechRequest, TranscriptionResponse,
};

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
const AUDIO_TRANSCRIPTIONS_PATH: &str = "audio/transcriptions";
const AUDIO_SPEECH_PATH: &str = "audio/speech";

const TRANSCRIPTION_MODEL: &str = "whisper-1";
const TRANSCRIPTION_FORMAT: &str = "verbose_json";
const TRANSCRIPTION_FILENAME: &str = "audio.m4a";
const TRANSCRIPTION_MIME_TYPE: &str = "audio/mp4";

const MIN_SPEECH_SPEED: f64 = 0.25;
const MAX_SPEECH_SPEED: f64 = 4.0;

/// OpenAI API client.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct OpenAI {
    config: OpenAIConfig,
    webservice: Webservice,
}

impl OpenAI {
    /// Creates a client backed by reqwest.
    pub fn new(config: OpenAIConfig) -> WebserviceResult<Self> {
        let transport = ReqwestTransport::with_user_agent(&config.user_agent)?;
        let webservice =
            Webservice::with_transport(Arc::new(transport)).max_body_size(config.max_body_size);
        Ok(Self::with_webservice(config, webservice))
    }

    /// Creates a client that sends through an existing [`Webservice`].
    pub fn with_webservice(config: OpenAIConfig, webservice: Webservice) -> Self {
        Self { config, webservice }
    }

    /// Creates a client configured from `OPENAI_*` environment variables.
    pub fn from_env() -> WebserviceResult<Self> {
        Self::new(OpenAIConfig::from_env()?)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Creates a chat completion.
    pub async fn create_chat_completion(
        &self,
        model: ChatModel,
        messages: Vec<ChatCompletionMessage>,
    ) -> WebserviceResult<ChatCompletionResponse> {
        self.send_chat_completion(ChatCompletionRequest::new(model, messages))
            .await
    }

    /// Sends a fully specified chat completion request.
    ///
    /// The `stream` flag is forced to `false`.
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    pub async fn send_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> WebserviceResult<ChatCompletionResponse> {
        validate_messages(&request.messages)?;
        let request = request.with_stream(false);

        let endpoint = self
            .authorized::<ChatCompletionResponse>(CHAT_COMPLETIONS_PATH)?
            .header(CONTENT_TYPE.as_str(), mime::APPLICATION_JSON.as_ref())
            .body(request.encode()?)
            .build()?;

        self.webservice.execute(endpoint).await
    }

    /// Creates a streamed chat completion.
    ///
    /// Validation happens up front; the request itself is sent when the
    /// returned stream is first polled.
    pub fn create_chat_completion_stream(
        &self,
        model: ChatModel,
        messages: Vec<ChatCompletionMessage>,
    ) -> WebserviceResult<EventStream<ChatCompletionStreamingResponse>> {
        self.stream_chat_completion(ChatCompletionRequest::new(model, messages))
    }

    /// Streams a fully specified chat completion request.
    ///
    /// The `stream` flag is forced to `true`.
    pub fn stream_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> WebserviceResult<EventStream<ChatCompletionStreamingResponse>> {
        validate_messages(&request.messages)?;
        let request = request.with_stream(true);
        tracing::debug!(model = %request.model, messages = request.messages.len(), "Preparing chat completion stream");

        let endpoint = self
            .authorized::<ChatCompletionStreamingResponse>(CHAT_COMPLETIONS_PATH)?
            .header(CONTENT_TYPE.as_str(), mime::APPLICATION_JSON.as_ref())
            .header(ACCEPT.as_str(), mime::TEXT_EVENT_STREAM.as_ref())
            .body(request.encode()?)
            .build()?;

        Ok(self.webservice.execute_streaming(endpoint))
    }

    /// Transcribes audio with word-level timestamps.
    ///
    /// `language` is an ISO-639-1 code such as `en`; when `None` the language
    /// is detected.
    #[instrument(skip(self, audio))]
    pub async fn create_audio_transcription(
        &self,
        audio: impl Into<Bytes>,
        language: Option<&str>,
    ) -> WebserviceResult<TranscriptionResponse> {
        let audio = audio.into();
        if audio.is_empty() {
            return Err(WebserviceError::validation_param(
                "Audio data cannot be empty",
                "file",
            ));
        }

        let mut form = MultipartForm::new();
        form.add_repeated_field("timestamp_granularities[]", ["word"])
            .add_field("model", TRANSCRIPTION_MODEL)
            .add_field("response_format", TRANSCRIPTION_FORMAT);
        if let Some(language) = language {
            form.add_field("language", language);
        }
        form.add_file("file", TRANSCRIPTION_FILENAME, TRANSCRIPTION_MIME_TYPE, audio);

        let (body, content_type) = form.finalize();
        tracing::debug!(bytes = body.len(), "Multipart body assembled");

        let endpoint = self
            .authorized::<TranscriptionResponse>(AUDIO_TRANSCRIPTIONS_PATH)?
            .header(CONTENT_TYPE.as_str(), content_type)
            .body(body)
            .build()?;

        self.webservice.execute(endpoint).await
    }

    /// Synthesizes speech and returns the encoded audio.
    #[instrument(skip(self, request), fields(model = ?request.model, voice = ?request.voice))]
    pub async fn create_speech(&self, request: SpeechRequest) -> WebserviceResult<Bytes> {
        if request.input.trim().is_empty() {
            return Err(WebserviceError::validation_param(
                "Speech input cannot be empty",
                "input",
            ));
        }
        if let Some(speed) = request.speed {
            if !(MIN_SPEECH_SPEED..=MAX_SPEECH_SPEED).contains(&speed) {
                return Err(WebserviceError::validation_param(
                    format!(
                        "Speed must be between {} and {}, got {}",
                        MIN_SPEECH_SPEED, MAX_SPEECH_SPEED, speed
                    ),
                    "speed",
                ));
            }
        }

        let endpoint = self
            .authorized::<Bytes>(AUDIO_SPEECH_PATH)?
            .header(CONTENT_TYPE.as_str(), mime::APPLICATION_JSON.as_ref())
            .body(request.encode()?)
            .build()?;

        self.webservice.execute(endpoint).await
    }

    /// Starts a `POST` to `path` with the bearer token and configured deadline.
    fn authorized<T>(&self, path: &str) -> WebserviceResult<EndpointBuilder<T>> {
        let url = self.config.endpoint_url(path)?;

        Ok(Endpoint::builder(url)
            .method(Method::POST)
            .header(
                AUTHORIZATION.as_str(),
                format!("Bearer {}", self.config.api_key()),
            )
            .timeout(self.config.timeout))
    }
}

fn validate_messages(messages: &[ChatCompletionMessage]) -> WebserviceResult<()> {
    if messages.is_empty() {
        return Err(WebserviceError::validation_param(
            "At least one message is required",
            "messages",
        ));
    }
    Ok(())
}

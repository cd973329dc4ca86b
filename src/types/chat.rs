//! Chat completion types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::schema::ResponseFormat;
use crate::codec::JsonPayload;

/// Chat models accepted by the completions endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatModel {
    /// `gpt-4o-2024-08-06`
    #[serde(rename = "gpt-4o-2024-08-06")]
    Gpt4o20240806,
    /// `chatgpt-4o-latest`
    #[default]
    #[serde(rename = "chatgpt-4o-latest")]
    Chatgpt4oLatest,
    /// `gpt-4o-mini-2024-07-18`
    #[serde(rename = "gpt-4o-mini-2024-07-18")]
    Gpt4oMini20240718,
    /// `gpt-4-turbo-2024-04-09`
    #[serde(rename = "gpt-4-turbo-2024-04-09")]
    Gpt4Turbo20240409,
}

impl ChatModel {
    /// All known models.
    pub const ALL: [ChatModel; 4] = [
        ChatModel::Gpt4o20240806,
        ChatModel::Chatgpt4oLatest,
        ChatModel::Gpt4oMini20240718,
        ChatModel::Gpt4Turbo20240409,
    ];

    /// Wire name of the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatModel::Gpt4o20240806 => "gpt-4o-2024-08-06",
            ChatModel::Chatgpt4oLatest => "chatgpt-4o-latest",
            ChatModel::Gpt4oMini20240718 => "gpt-4o-mini-2024-07-18",
            ChatModel::Gpt4Turbo20240409 => "gpt-4-turbo-2024-04-09",
        }
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End user.
    User,
    /// System instructions.
    System,
    /// Model output.
    Assistant,
    /// Tool result.
    Tool,
}

/// Chat completion request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model ID.
    pub model: ChatModel,
    /// Conversation so far.
    pub messages: Vec<ChatCompletionMessage>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Number of choices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Whether to stream the response as server-sent events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Token bias map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<String, i32>>,
    /// Presence penalty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Frequency penalty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Structured output format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatCompletionRequest {
    /// Creates a request for `model` with `messages`.
    pub fn new(model: ChatModel, messages: Vec<ChatCompletionMessage>) -> Self {
        Self {
            model,
            messages,
            ..Default::default()
        }
    }

    /// Sets the stream flag.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the structured output format.
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

impl JsonPayload for ChatCompletionRequest {}

/// A complete chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionMessage {
    /// Author role.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Optional participant name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Refusal text, when the model declined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    /// Tool calls requested by the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatCompletionMessage {
    /// Creates a message with the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            refusal: None,
            tool_calls: None,
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Incremental message content in a streamed chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionMessageDelta {
    /// Role, present on the first chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Content fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Participant name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Refusal fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    /// Tool call fragments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// Tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID.
    pub id: String,
    /// Call type.
    #[serde(rename = "type")]
    pub call_type: ToolCallType,
    /// Function to call.
    pub function: ToolFunction,
}

/// Tool call type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallType {
    /// Function call.
    Function,
}

/// Function name and JSON-encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFunction {
    /// Function name.
    pub name: String,
    /// Arguments as a JSON string.
    pub arguments: String,
}

/// Log probability of one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLogprob {
    /// Token text.
    pub token: String,
    /// Log probability.
    pub logprob: f64,
    /// UTF-8 bytes of the token.
    #[serde(default)]
    pub bytes: Option<Vec<u8>>,
}

/// Token usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens.
    pub prompt_tokens: u32,
    /// Completion tokens.
    pub completion_tokens: u32,
    /// Total tokens.
    pub total_tokens: u32,
}

/// Chat completion response.
///
/// `model` is kept as a string: the API reports dated snapshots that are not
/// always in [`ChatModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion ID.
    pub id: String,
    /// Generated choices.
    pub choices: Vec<ChatCompletionChoice>,
    /// Unix timestamp.
    pub created: i64,
    /// Model that produced the completion.
    pub model: String,
    /// Service tier.
    #[serde(default)]
    pub service_tier: Option<String>,
    /// Backend fingerprint.
    #[serde(default)]
    pub system_fingerprint: Option<String>,
    /// Object type.
    pub object: String,
    /// Token usage.
    pub usage: Usage,
}

impl ChatCompletionResponse {
    /// Content of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

impl JsonPayload for ChatCompletionResponse {}

/// One choice of a chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    /// Why generation stopped.
    pub finish_reason: String,
    /// Choice index.
    pub index: u32,
    /// Generated message.
    pub message: ChatCompletionMessage,
    /// Token log probabilities.
    #[serde(default)]
    pub logprobs: Option<Vec<TokenLogprob>>,
}

/// One chunk of a streamed chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionStreamingResponse {
    /// Completion ID, shared by all chunks.
    pub id: String,
    /// Choice deltas.
    pub choices: Vec<ChatCompletionStreamingChoice>,
    /// Unix timestamp.
    pub created: i64,
    /// Model that produced the completion.
    pub model: String,
    /// Service tier.
    #[serde(default)]
    pub service_tier: Option<String>,
    /// Backend fingerprint.
    #[serde(default)]
    pub system_fingerprint: Option<String>,
    /// Object type.
    pub object: String,
    /// Token usage, only on the final chunk when requested.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletionStreamingResponse {
    /// Content fragment of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }
}

impl JsonPayload for ChatCompletionStreamingResponse {}

/// One choice delta of a streamed chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionStreamingChoice {
    /// Why generation stopped, on the last chunk.
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Choice index.
    pub index: u32,
    /// Message delta.
    pub delta: ChatCompletionMessageDelta,
    /// Token log probabilities.
    #[serde(default)]
    pub logprobs: Option<Vec<TokenLogprob>>,
}

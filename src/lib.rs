//! ChatGPT Webservice
//!
//! Typed HTTP transport for JSON/REST APIs, with a client for the OpenAI
//! chat, transcription and speech endpoints built on top of it.
//!
//! # Features
//!
//! - **Typed endpoints**: an [`Endpoint<T>`] carries its response type, so
//!   [`Webservice::execute`] returns a decoded `T`
//! - **Streaming**: `text/event-stream` bodies decode lazily into an
//!   [`EventStream<T>`], reassembling events split across reads
//! - **Multipart uploads**: byte-exact `multipart/form-data` bodies
//! - **Deadlines**: every call carries its own timeout, reported separately
//!   from other transport failures
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chatgpt_webservice::{ChatCompletionMessage, ChatModel, OpenAI, OpenAIConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAI::new(OpenAIConfig::builder().api_key("sk-your-key").build()?)?;
//!
//!     let response = client
//!         .create_chat_completion(
//!             ChatModel::Gpt4oMini20240718,
//!             vec![ChatCompletionMessage::user("Hello!")],
//!         )
//!         .await?;
//!
//!     println!("{}", response.content().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! # Streaming Example
//!
//! ```rust,no_run
//! use chatgpt_webservice::{ChatCompletionMessage, ChatModel, OpenAI};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAI::from_env()?;
//!
//!     let mut stream = client.create_chat_completion_stream(
//!         ChatModel::Chatgpt4oLatest,
//!         vec![ChatCompletionMessage::user("Tell me a story")],
//!     )?;
//!
//!     while let Some(chunk) = stream.next().await {
//!         if let Some(content) = chunk?.content() {
//!             print!("{}", content);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Custom Endpoints
//!
//! ```rust,no_run
//! use chatgpt_webservice::{Endpoint, JsonPayload, Webservice};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Status {
//!     healthy: bool,
//! }
//!
//! impl JsonPayload for Status {}
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let webservice = Webservice::new()?;
//! let endpoint = Endpoint::<Status>::builder("https://example.com/status".parse()?).build()?;
//! let status = webservice.execute(endpoint).await?;
//! println!("healthy: {}", status.healthy);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod multipart;
pub mod observability;
pub mod openai;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use codec::{Decodable, Encodable, JsonPayload};
pub use config::{OpenAIConfig, OpenAIConfigBuilder};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use errors::{DecodeError, EncodeError, TransportError, WebserviceError, WebserviceResult};
pub use multipart::{MultipartForm, MultipartPart};
pub use openai::OpenAI;
pub use transport::{EventStream, HttpTransport, ReqwestTransport, Webservice};

// Type re-exports
pub use types::{
    AudioFormat, ChatCompletionChoice, ChatCompletionMessage, ChatCompletionMessageDelta,
    ChatCompletionRequest, ChatCompletionResponse, ChatCompletionStreamingChoice,
    ChatCompletionStreamingResponse, ChatModel, JsonParameters, JsonSchema, JsonSchemaProperty,
    JsonSchemaType, ResponseFormat, Role, SpeechModel, SpeechRequest, TokenLogprob, ToolCall,
    ToolCallType, ToolFunction, TranscriptionResponse, Usage, Voice, Word,
};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

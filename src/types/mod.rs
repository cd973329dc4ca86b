//! Request and response payloads for the OpenAI API.

mod audio;
mod chat;
mod schema;

pub use audio::{AudioFormat, SpeechModel, SpeechRequest, TranscriptionResponse, Voice, Word};
pub use chat::{
    ChatCompletionChoice, ChatCompletionMessage, ChatCompletionMessageDelta, ChatCompletionRequest,
    ChatCompletionResponse, ChatCompletionStreamingChoice, ChatCompletionStreamingResponse,
    ChatModel, Role, TokenLogprob, ToolCall, ToolCallType, ToolFunction, Usage,
};
pub use schema::{JsonParameters, JsonSchema, JsonSchemaProperty, JsonSchemaType, ResponseFormat};

//! Integration tests using WireMock
//!
//! These drive the real reqwest transport against a local mock server,
//! covering status handling, deadlines, event streams and the OpenAI
//! request shapes end to end.

mod openai;
mod webservice;

use chatgpt_webservice::{OpenAI, OpenAIConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "sk-integration-key";

/// Helper to create a mock server
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Helper to create an OpenAI client pointed at the mock server
pub fn client_for(server: &MockServer) -> OpenAI {
    let config = OpenAIConfig::builder()
        .api_key(TEST_API_KEY)
        .base_url(format!("{}/v1", server.uri()))
        .build()
        .expect("valid config");
    OpenAI::new(config).expect("client builds")
}

/// Helper to create a mock that requires the bearer token
pub fn mock_with_auth(path_matcher: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(path_matcher))
        .and(header("Authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
}

/// Helper to create an event-stream response
pub fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

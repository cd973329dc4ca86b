//! Integration tests for the OpenAI client

use super::*;
use chatgpt_webservice::{
    AudioFormat, ChatCompletionMessage, ChatModel, SpeechModel, SpeechRequest, Voice,
    WebserviceError,
};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::body_partial_json;

#[tokio::test]
async fn test_chat_completion_integration_success() {
    let mock_server = setup_mock_server().await;

    let response_body = json!({
        "id": "chatcmpl-integration-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-4o-mini-2024-07-18",
        "system_fingerprint": "fp_44709d6fcb",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Integration test response"
            },
            "logprobs": null,
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 5,
            "total_tokens": 15
        }
    });

    mock_with_auth("/v1/chat/completions")
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini-2024-07-18",
            "stream": false,
            "messages": [{"role": "user", "content": "Test message"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .create_chat_completion(
            ChatModel::Gpt4oMini20240718,
            vec![ChatCompletionMessage::user("Test message")],
        )
        .await
        .unwrap();

    assert_eq!(response.id, "chatcmpl-integration-123");
    assert_eq!(response.content(), Some("Integration test response"));
    assert_eq!(response.usage.total_tokens, 15);
}

#[tokio::test]
async fn test_chat_completion_integration_authentication_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Invalid API key",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .create_chat_completion(ChatModel::default(), vec![ChatCompletionMessage::user("Hi")])
        .await
        .unwrap_err();

    assert!(matches!(err, WebserviceError::HttpStatus { status_code: 401 }));
}

#[tokio::test]
async fn test_chat_completion_stream_integration() {
    let mock_server = setup_mock_server().await;

    let body = concat!(
        "data: {\"id\":\"chatcmpl-1\",\"object\":\"chat.completion.chunk\",\"created\":1,",
        "\"model\":\"chatgpt-4o-latest\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"chatcmpl-1\",\"object\":\"chat.completion.chunk\",\"created\":1,",
        "\"model\":\"chatgpt-4o-latest\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Once upon\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"chatcmpl-1\",\"object\":\"chat.completion.chunk\",\"created\":1,",
        "\"model\":\"chatgpt-4o-latest\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\" a time\"},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );

    mock_with_auth("/v1/chat/completions")
        .and(header("Accept", "text/event-stream"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(sse_response(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut stream = client
        .create_chat_completion_stream(
            ChatModel::Chatgpt4oLatest,
            vec![ChatCompletionMessage::user("Tell me a story")],
        )
        .unwrap();

    let mut text = String::new();
    let mut chunks = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        text.push_str(chunk.content().unwrap_or_default());
        chunks += 1;
    }

    assert_eq!(chunks, 3);
    assert_eq!(text, "Once upon a time");
}

#[tokio::test]
async fn test_audio_transcription_integration() {
    let mock_server = setup_mock_server().await;

    mock_with_auth("/v1/audio/transcriptions")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "task": "transcribe",
            "language": "german",
            "duration": 1.2,
            "text": "Guten Tag",
            "words": [
                {"word": "Guten", "start": 0.0, "end": 0.5},
                {"word": "Tag", "start": 0.6, "end": 1.1}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let audio = vec![0u8, 0, 0, 0x20, b'f', b't', b'y', b'p', 0xff, 0xfe];
    let response = client
        .create_audio_transcription(audio.clone(), Some("de"))
        .await
        .unwrap();

    assert_eq!(response.text, "Guten Tag");
    assert_eq!(response.words.unwrap().len(), 2);

    let requests = mock_server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("multipart content type");

    let mut expected = Vec::new();
    for (name, value) in [
        ("timestamp_granularities[]", "word"),
        ("model", "whisper-1"),
        ("response_format", "verbose_json"),
        ("language", "de"),
    ] {
        expected.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    expected.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"audio.m4a\"\r\nContent-Type: audio/mp4\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    expected.extend_from_slice(&audio);
    expected.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    assert_eq!(request.body, expected);
}

#[tokio::test]
async fn test_create_speech_integration() {
    let mock_server = setup_mock_server().await;
    let audio = vec![0x49u8, 0x44, 0x33, 0x04, 0x00, 0x00, 0xff, 0xfb];

    mock_with_auth("/v1/audio/speech")
        .and(body_partial_json(json!({
            "model": "tts-1",
            "voice": "shimmer",
            "input": "Good morning",
            "response_format": "mp3"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(audio.clone(), "audio/mpeg"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let bytes = client
        .create_speech(
            SpeechRequest::new(SpeechModel::Tts1, "Good morning", Voice::Shimmer)
                .with_format(AudioFormat::Mp3),
        )
        .await
        .unwrap();

    assert_eq!(bytes.as_ref(), audio.as_slice());
}

#[test]
fn test_invalid_base_url_rejected() {
    let result = chatgpt_webservice::OpenAIConfig::builder()
        .api_key(TEST_API_KEY)
        .base_url("not a url")
        .build();

    assert!(matches!(result, Err(WebserviceError::Validation { .. })));
}

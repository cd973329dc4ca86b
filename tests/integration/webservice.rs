//! Integration tests for the transport client

use super::*;
use bytes::Bytes;
use chatgpt_webservice::{DecodeError, Endpoint, Webservice, WebserviceError};
use futures::StreamExt;
use http::Method;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

#[tokio::test]
async fn test_execute_success() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"healthy": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap();
    let endpoint = Endpoint::<Value>::builder(url(&mock_server, "/status"))
        .build()
        .unwrap();

    let value = webservice.execute(endpoint).await.unwrap();
    assert_eq!(value, json!({"healthy": true}));
}

#[tokio::test]
async fn test_execute_not_found() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>missing</html>"))
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap();
    let endpoint = Endpoint::<Value>::builder(url(&mock_server, "/missing"))
        .build()
        .unwrap();

    let err = webservice.execute(endpoint).await.unwrap_err();
    assert!(matches!(err, WebserviceError::HttpStatus { status_code: 404 }));
}

#[tokio::test]
async fn test_no_content_is_failure() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap();
    let endpoint = Endpoint::<Bytes>::builder(url(&mock_server, "/thing"))
        .method(Method::DELETE)
        .build()
        .unwrap();

    let err = webservice.execute(endpoint).await.unwrap_err();
    assert_eq!(err.status_code(), Some(204));
}

#[tokio::test]
async fn test_redirect_is_failure() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/final"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/final"))
        .respond_with(ResponseTemplate::new(200).set_body_string("followed"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap();
    let endpoint = Endpoint::<Bytes>::builder(url(&mock_server, "/moved"))
        .build()
        .unwrap();

    let err = webservice.execute(endpoint).await.unwrap_err();
    assert_eq!(err.status_code(), Some(302));
}

#[tokio::test]
async fn test_execute_body_over_limit() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 4096]))
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap().max_body_size(1024);
    let endpoint = Endpoint::<Bytes>::builder(url(&mock_server, "/large"))
        .build()
        .unwrap();

    let err = webservice.execute(endpoint).await.unwrap_err();
    assert!(matches!(
        err,
        WebserviceError::Decode(DecodeError::Overflow { limit: 1024 })
    ));
}

#[tokio::test]
async fn test_execute_deadline() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap();
    let endpoint = Endpoint::<Value>::builder(url(&mock_server, "/slow"))
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = webservice.execute(endpoint).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
}

#[tokio::test]
async fn test_duplicate_header_last_wins() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(header("x-request-tag", "second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap();
    let endpoint = Endpoint::<Value>::builder(url(&mock_server, "/tagged"))
        .method(Method::POST)
        .header("X-Request-Tag", "first")
        .header("x-request-tag", "second")
        .body("{}")
        .build()
        .unwrap();

    webservice.execute(endpoint).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let values: Vec<_> = requests[0].headers.get_all("x-request-tag").iter().collect();
    assert_eq!(values.len(), 1);
}

#[tokio::test]
async fn test_streaming_events() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .respond_with(sse_response(
            ": keep-alive\n\ndata: {\"n\":1}\n\ndata: {\"n\":2}\r\n\r\ndata: [DONE]\n\ndata: {\"n\":3}\n\n",
        ))
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap();
    let endpoint = Endpoint::<Value>::builder(url(&mock_server, "/events"))
        .method(Method::POST)
        .build()
        .unwrap();

    let events: Vec<Value> = webservice
        .execute_streaming(endpoint)
        .map(|event| event.unwrap())
        .collect()
        .await;

    assert_eq!(events, vec![json!({"n": 1}), json!({"n": 2})]);
}

#[tokio::test]
async fn test_streaming_status_failure() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("data: {\"n\":1}\n\n"))
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap();
    let endpoint = Endpoint::<Value>::builder(url(&mock_server, "/events"))
        .method(Method::POST)
        .build()
        .unwrap();

    let results: Vec<_> = webservice.execute_streaming(endpoint).collect().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].as_ref().unwrap_err().status_code(), Some(500));
}

#[tokio::test]
async fn test_streaming_malformed_event() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(sse_response("data: {\"n\":1}\n\ndata: {bad}\n\ndata: {\"n\":2}\n\n"))
        .mount(&mock_server)
        .await;

    let webservice = Webservice::new().unwrap();
    let endpoint = Endpoint::<Value>::builder(url(&mock_server, "/events"))
        .method(Method::POST)
        .build()
        .unwrap();

    let results: Vec<_> = webservice.execute_streaming(endpoint).collect().await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap(), &json!({"n": 1}));
    assert!(matches!(
        results[1],
        Err(WebserviceError::Decode(DecodeError::Json { .. }))
    ));
}

//! Request building, response parsing and a live round trip against a local server.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use eventmanager::providers::huggingface::{
    build_request, context_response, parse_response, HfParameters, HuggingFaceProvider,
    InferenceTask,
};
use eventmanager::providers::{GenerationRequest, ProviderError, TextGenerator};

// ---------------------------------------------------------------------------
// build_request
// ---------------------------------------------------------------------------

#[test]
fn conversational_body_carries_parameters() {
    let body = build_request(
        InferenceTask::Conversational,
        &GenerationRequest::prompt("any tips for venues?"),
        Some(HfParameters::default()),
    );
    let json = serde_json::to_value(&body).expect("serialize");
    assert_eq!(json["inputs"]["text"], "any tips for venues?");
    assert_eq!(json["inputs"]["past_user_inputs"], serde_json::json!([]));
    assert_eq!(json["inputs"]["generated_responses"], serde_json::json!([]));
    assert_eq!(json["parameters"]["max_length"], 500);
    assert!((json["parameters"]["temperature"].as_f64().unwrap_or_default() - 0.9).abs() < 1e-6);
    assert!(
        (json["parameters"]["repetition_penalty"].as_f64().unwrap_or_default() - 1.2).abs() < 1e-6
    );
}

#[test]
fn conversational_context_adds_one_exchange() {
    let request = GenerationRequest {
        prompt: "and after that?".to_owned(),
        context: Some("tell me about the event".to_owned()),
    };
    let json = serde_json::to_value(build_request(InferenceTask::Conversational, &request, None))
        .expect("serialize");
    assert_eq!(
        json["inputs"]["past_user_inputs"],
        serde_json::json!(["tell me about the event"])
    );
    assert_eq!(
        json["inputs"]["generated_responses"],
        serde_json::json!([context_response("tell me about the event")])
    );
    assert!(json.get("parameters").is_none());
}

#[test]
fn text2text_body_is_a_bare_prompt() {
    let json = serde_json::to_value(build_request(
        InferenceTask::Text2Text,
        &GenerationRequest::prompt("Summarize this event"),
        None,
    ))
    .expect("serialize");
    assert_eq!(json, serde_json::json!({ "inputs": "Summarize this event" }));
}

#[test]
fn context_responses_are_canned() {
    assert_eq!(
        context_response("greeting"),
        "Hello! How can I help you with event planning?"
    );
    assert_eq!(
        context_response("new event"),
        "I can help you create an event. Just let me know what you need!"
    );
    assert_eq!(
        context_response("weather"),
        "I'm here to help. What would you like to know?"
    );
}

// ---------------------------------------------------------------------------
// parse_response
// ---------------------------------------------------------------------------

#[test]
fn parses_single_object() {
    let text = parse_response(r#"{"generated_text": "  Sounds fun!  "}"#);
    assert_eq!(text.ok().as_deref(), Some("Sounds fun!"));
}

#[test]
fn parses_first_of_batch() {
    let text = parse_response(r#"[{"generated_text": "first"}, {"generated_text": "second"}]"#);
    assert_eq!(text.ok().as_deref(), Some("first"));
}

#[test]
fn error_payload_is_a_failure() {
    let err = parse_response(r#"{"error": "Model is currently loading"}"#);
    assert!(matches!(err, Err(ProviderError::NoText(msg)) if msg.contains("loading")));
}

#[test]
fn blank_generation_is_a_failure() {
    assert!(matches!(
        parse_response(r#"{"generated_text": "   "}"#),
        Err(ProviderError::NoText(_))
    ));
    assert!(matches!(parse_response("[]"), Err(ProviderError::NoText(_))));
}

#[test]
fn undecodable_body_is_a_parse_error() {
    assert!(matches!(
        parse_response("<html>bad gateway</html>"),
        Err(ProviderError::Parse(_))
    ));
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

/// Serve one JSON response and hand the raw request back to the test.
async fn serve_json_once(body: &str) -> (String, oneshot::Receiver<String>) {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) => panic!("listener should bind: {err}"),
    };
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(err) => panic!("listener should expose local addr: {err}"),
    };

    let (tx, rx) = oneshot::channel();
    let body_owned = body.to_owned();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let request = read_request(&mut socket).await;
            let _ = tx.send(request);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body_owned}",
                body_owned.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    (format!("http://{addr}/models/test"), rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let read = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        raw.extend_from_slice(chunk.get(..read).unwrap_or_default());
        let text = String::from_utf8_lossy(&raw).into_owned();
        if let Some((head, body)) = text.split_once("\r\n\r\n") {
            let expected = head
                .lines()
                .find_map(|l| {
                    l.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or_default();
            if body.len() >= expected {
                return text;
            }
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

#[tokio::test]
async fn provider_posts_json_with_bearer_token() {
    let (url, request_rx) = serve_json_once(r#"[{"generated_text": "Great choice!"}]"#).await;
    let provider = HuggingFaceProvider::new(url, InferenceTask::Text2Text, Duration::from_secs(5))
        .expect("client builds")
        .with_token(Some("hf_testtoken".to_owned()));

    let text = provider
        .generate(&GenerationRequest::prompt("Summarize"))
        .await;
    assert_eq!(text.ok().as_deref(), Some("Great choice!"));

    let request = request_rx.await.expect("request captured");
    assert!(request.starts_with("POST /models/test"));
    assert!(request
        .to_ascii_lowercase()
        .contains("authorization: bearer hf_testtoken"));
    assert!(request.ends_with(r#"{"inputs":"Summarize"}"#));
}

#[tokio::test]
async fn blank_token_sends_no_authorization() {
    let (url, request_rx) = serve_json_once(r#"{"generated_text": "ok"}"#).await;
    let provider =
        HuggingFaceProvider::new(url, InferenceTask::Conversational, Duration::from_secs(5))
            .expect("client builds")
            .with_token(Some("   ".to_owned()));

    assert!(provider
        .generate(&GenerationRequest::prompt("hello"))
        .await
        .is_ok());
    let request = request_rx.await.expect("request captured");
    assert!(!request.to_ascii_lowercase().contains("authorization:"));
}

#[test]
fn debug_output_redacts_token() {
    let provider = HuggingFaceProvider::new(
        "http://localhost/model",
        InferenceTask::Text2Text,
        Duration::from_secs(1),
    )
    .expect("client builds")
    .with_token(Some("hf_secretvalue".to_owned()));
    let shown = format!("{provider:?}");
    assert!(!shown.contains("hf_secretvalue"));
    assert!(shown.contains("__REDACTED__"));
    assert_eq!(provider.task(), InferenceTask::Text2Text);
    assert_eq!(provider.endpoint(), "http://localhost/model");
}

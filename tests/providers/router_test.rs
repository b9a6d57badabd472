//! Primary-then-fallback routing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use eventmanager::providers::router::FallbackChain;
use eventmanager::providers::{GenerationRequest, ProviderError, TextGenerator};

/// Scripted generator that counts its calls.
struct Scripted {
    name: &'static str,
    reply: Option<&'static str>,
    calls: AtomicUsize,
}

impl Scripted {
    fn ok(name: &'static str, reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Some(reply),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for Scripted {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(text) => Ok(text.to_owned()),
            None => Err(ProviderError::HttpStatus {
                status: 503,
                body: format!("{} unavailable", self.name),
            }),
        }
    }

    fn endpoint(&self) -> &str {
        self.name
    }
}

fn request() -> GenerationRequest {
    GenerationRequest::prompt("tell me something")
}

#[tokio::test]
async fn primary_success_skips_fallback() {
    let primary = Scripted::ok("large", "from large");
    let fallback = Scripted::ok("medium", "from medium");
    let chain = FallbackChain::new(
        primary.clone(),
        Some(fallback.clone() as Arc<dyn TextGenerator>),
    );

    let text = chain.generate(&request()).await;
    assert_eq!(text.ok().as_deref(), Some("from large"));
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn primary_failure_tries_fallback_once() {
    let primary = Scripted::failing("large");
    let fallback = Scripted::ok("medium", "from medium");
    let chain = FallbackChain::new(
        primary.clone(),
        Some(fallback.clone() as Arc<dyn TextGenerator>),
    );

    let text = chain.generate(&request()).await;
    assert_eq!(text.ok().as_deref(), Some("from medium"));
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn both_failing_returns_fallback_error() {
    let primary = Scripted::failing("large");
    let fallback = Scripted::failing("medium");
    let chain = FallbackChain::new(primary, Some(fallback.clone() as Arc<dyn TextGenerator>));

    match chain.generate(&request()).await {
        Err(ProviderError::HttpStatus { body, .. }) => assert_eq!(body, "medium unavailable"),
        other => panic!("expected fallback error, got {other:?}"),
    }
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn no_fallback_returns_primary_error() {
    let primary = Scripted::failing("large");
    let chain = FallbackChain::new(primary, None);
    assert!(!chain.has_fallback());
    assert_eq!(chain.endpoint(), "large");
    assert!(chain.generate(&request()).await.is_err());
}

#[test]
fn attempts_count_the_fallback() {
    let with_fallback = FallbackChain::new(
        Scripted::failing("large"),
        Some(Scripted::failing("medium") as Arc<dyn TextGenerator>),
    );
    assert_eq!(with_fallback.attempts(), 2);
    assert_eq!(FallbackChain::new(Scripted::failing("large"), None).attempts(), 1);
}

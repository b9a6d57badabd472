//! Hugging Face inference API provider.
//!
//! Two request shapes are supported:
//! - conversational: `{"inputs": {"text", "past_user_inputs", "generated_responses"}, "parameters": {..}}`
//! - text-to-text: `{"inputs": "<prompt>"}`
//!
//! Responses arrive either as `{"generated_text": ..}` or as a one-element
//! array of that object; `{"error": ..}` is a failure.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_http_response, GenerationRequest, ProviderError, TextGenerator};

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Which request body the endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceTask {
    /// Dialogue models taking a conversation object.
    Conversational,
    /// Instruction models taking a plain prompt string.
    Text2Text,
}

/// Inference API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct HfRequest {
    /// Model input.
    pub inputs: HfInputs,
    /// Generation parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HfParameters>,
}

/// Model input: a conversation or a bare prompt.
#[doc(hidden)]
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HfInputs {
    /// Conversational input.
    Conversation(HfConversation),
    /// Text-to-text prompt.
    Prompt(String),
}

/// Conversational input object.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct HfConversation {
    /// Latest user message.
    pub text: String,
    /// Earlier user messages.
    pub past_user_inputs: Vec<String>,
    /// Earlier model replies, aligned with `past_user_inputs`.
    pub generated_responses: Vec<String>,
}

/// Generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HfParameters {
    /// Maximum generated length.
    pub max_length: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Penalty for repeated tokens.
    pub repetition_penalty: f32,
}

impl Default for HfParameters {
    fn default() -> Self {
        Self {
            max_length: 500,
            temperature: 0.9,
            repetition_penalty: 1.2,
        }
    }
}

/// Inference API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HfResponse {
    /// A single generation.
    Single(HfGenerated),
    /// A batch of generations; the first is used.
    Batch(Vec<HfGenerated>),
    /// An API-level error.
    Failure(HfFailure),
}

/// One generation.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct HfGenerated {
    /// Generated text.
    pub generated_text: String,
}

/// API-level error payload.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct HfFailure {
    /// Error description.
    pub error: String,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Hugging Face inference endpoint.
#[derive(Clone)]
pub struct HuggingFaceProvider {
    url: String,
    task: InferenceTask,
    parameters: Option<HfParameters>,
    token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HuggingFaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceProvider")
            .field("url", &self.url)
            .field("task", &self.task)
            .field("parameters", &self.parameters)
            .field("token", &self.token.as_ref().map(|_| "__REDACTED__"))
            .finish()
    }
}

impl HuggingFaceProvider {
    /// Create a provider whose HTTP client gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Request` if the HTTP client cannot be built.
    pub fn new(
        url: impl Into<String>,
        task: InferenceTask,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            task,
            parameters: None,
            token: None,
            client,
        })
    }

    /// Send generation parameters with every request.
    pub fn with_parameters(mut self, parameters: HfParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Authenticate with a bearer token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Request body shape this provider sends.
    pub fn task(&self) -> InferenceTask {
        self.task
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Canned model reply paired with earlier user context.
#[doc(hidden)]
pub fn context_response(context: &str) -> &'static str {
    if context.contains("greet") {
        "Hello! How can I help you with event planning?"
    } else if context.contains("event") {
        "I can help you create an event. Just let me know what you need!"
    } else {
        "I'm here to help. What would you like to know?"
    }
}

/// Build an inference request body.
#[doc(hidden)]
pub fn build_request(
    task: InferenceTask,
    request: &GenerationRequest,
    parameters: Option<HfParameters>,
) -> HfRequest {
    let inputs = match task {
        InferenceTask::Conversational => {
            let context = request.context.as_deref().filter(|c| !c.is_empty());
            HfInputs::Conversation(HfConversation {
                text: request.prompt.clone(),
                past_user_inputs: context.map(|c| vec![c.to_owned()]).unwrap_or_default(),
                generated_responses: context
                    .map(|c| vec![context_response(c).to_owned()])
                    .unwrap_or_default(),
            })
        }
        InferenceTask::Text2Text => HfInputs::Prompt(request.prompt.clone()),
    };
    HfRequest { inputs, parameters }
}

/// Extract the generated text from a response body.
///
/// # Errors
///
/// Returns `ProviderError::Parse` for undecodable bodies and
/// `ProviderError::NoText` for error payloads or blank generations.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: HfResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let text = match resp {
        HfResponse::Single(generated) => generated.generated_text,
        HfResponse::Batch(batch) => batch
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| ProviderError::NoText("empty batch".to_owned()))?,
        HfResponse::Failure(failure) => return Err(ProviderError::NoText(failure.error)),
    };

    if text.trim().is_empty() {
        return Err(ProviderError::NoText("blank generation".to_owned()));
    }
    Ok(text.trim().to_owned())
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl TextGenerator for HuggingFaceProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = build_request(self.task, request, self.parameters);

        let mut call = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(token) = &self.token {
            call = call.bearer_auth(token);
        }

        let response = call.send().await?;
        let payload = check_http_response(response).await?;
        debug!(endpoint = %self.url, bytes = payload.len(), "generation received");
        parse_response(&payload)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

//! Primary-then-fallback routing across text-generation endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{GenerationRequest, ProviderError, TextGenerator};

/// Tries the primary generator, then at most one fallback.
#[derive(Clone)]
pub struct FallbackChain {
    primary: Arc<dyn TextGenerator>,
    fallback: Option<Arc<dyn TextGenerator>>,
}

impl FallbackChain {
    /// Chain `primary` with an optional `fallback`.
    pub fn new(primary: Arc<dyn TextGenerator>, fallback: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { primary, fallback }
    }

    /// Whether a fallback endpoint is configured.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[async_trait]
impl TextGenerator for FallbackChain {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        match self.primary.generate(request).await {
            Ok(text) => Ok(text),
            Err(primary_err) => {
                let Some(fallback) = &self.fallback else {
                    return Err(primary_err);
                };
                warn!(
                    endpoint = %self.primary.endpoint(),
                    fallback = %fallback.endpoint(),
                    error = %primary_err,
                    "primary generator failed, trying fallback"
                );
                fallback.generate(request).await
            }
        }
    }

    fn endpoint(&self) -> &str {
        self.primary.endpoint()
    }

    fn attempts(&self) -> u32 {
        let fallback = self.fallback.as_ref().map_or(0, |f| f.attempts());
        self.primary.attempts().saturating_add(fallback)
    }
}

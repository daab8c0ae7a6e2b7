//! Text-generation capability seam and retrying client wrapper

use crate::llm::messages::{Generation, GenerationRequest};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Errors the text-generation capability can fail with
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// Auth/validation style provider failures; never retried
    #[error("Provider error: {0}")]
    Provider(String),

    /// The call exceeded its deadline; retried
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// The provider asked us to back off; retried with backoff
    #[error("Rate limited: {0}")]
    RateLimited(String),
}

impl GenerationError {
    /// Whether this error class is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::RateLimited(_))
    }
}

/// The opaque text-generation capability consumed by the lab.
///
/// Both the coach-response path and the judge path depend on this seam;
/// they differ only in the composed prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the given request
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError>;
}

/// Client wrapper adding a wall-clock deadline and retry with exponential
/// backoff around any [`TextGenerator`].
///
/// Retry strategy follows the platform convention: base delay doubles per
/// attempt (500ms, 1s, 2s, ...) with random jitter, retryable classes only.
#[derive(Clone)]
pub struct GenerationClient {
    generator: Arc<dyn TextGenerator>,
    request_timeout: Duration,
    max_retries: u32,
}

impl GenerationClient {
    /// Create a client around a generator with the given deadline per call
    pub fn new(generator: Arc<dyn TextGenerator>, request_timeout: Duration) -> Self {
        Self {
            generator,
            request_timeout,
            max_retries: 1,
        }
    }

    /// Override the number of retries after the first attempt
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The configured per-call deadline
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Run one attempt under the deadline
    async fn attempt(&self, request: GenerationRequest) -> Result<Generation, GenerationError> {
        match timeout(self.request_timeout, self.generator.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.request_timeout)),
        }
    }

    /// Generate with retry on transient failures.
    ///
    /// Provider errors return immediately; timeouts and rate limits are
    /// retried up to `max_retries` times with exponential backoff and jitter.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<Generation, GenerationError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match self.attempt(request.clone()).await {
                Ok(generation) => {
                    if attempt > 0 {
                        debug!(attempt, "generation succeeded after retry");
                    }
                    return Ok(generation);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        warn!(error = %error, "non-retryable generation error");
                        return Err(error);
                    }

                    if attempt < self.max_retries {
                        let base_delay_ms = 500u64 * 2u64.pow(attempt);
                        let jitter_ms = {
                            let mut rng = rand::thread_rng();
                            rng.gen_range(0..=base_delay_ms / 2)
                        };
                        let delay = Duration::from_millis(base_delay_ms + jitter_ms);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = self.max_retries + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "retrying generation after failure"
                        );
                        sleep(delay).await;
                    }

                    last_error = Some(error);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| GenerationError::Provider("no attempts were made".to_string())))
    }
}

//! Completion client with failure classification and bounded backoff.

use super::failure::FailureClass;
use super::transport::{CompletionRequest, CompletionTransport, Message, Role};
use crate::config::CompletionConfig;
use crate::error::{Result, SolaceError};
use crate::types::Turn;
use std::time::Duration;
use tracing::{error, info, warn};

/// Returned when the service answered without text.
pub const NO_TEXT_FALLBACK: &str = "No text response received.";

/// Blocks the calling thread between retries.
///
/// Injected so tests can record delays instead of waiting.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

impl<F> Sleeper for F
where
    F: Fn(Duration),
{
    fn sleep(&self, duration: Duration) {
        self(duration)
    }
}

/// Sleeps with [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How often and how patiently transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_base: f64,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_retries` retries with `backoff_base^n`
    /// seconds before retry `n`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `backoff_base` is negative or not finite.
    pub fn new(max_retries: u32, backoff_base: f64) -> Result<Self> {
        if !backoff_base.is_finite() || backoff_base < 0.0 {
            return Err(SolaceError::Config(format!(
                "backoff base must be a finite non-negative number, got {}",
                backoff_base
            )));
        }
        Ok(Self {
            max_retries,
            backoff_base,
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_base(&self) -> f64 {
        self.backoff_base
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let secs = self.backoff_base.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: 2.0,
        }
    }
}

/// Turns transcripts into completion requests and retries transient failures.
///
/// The client holds configuration only; it has no notion of who is logged in.
pub struct CompletionClient<T, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    model: String,
    instructions: String,
    retry: RetryPolicy,
}

impl<T: CompletionTransport> CompletionClient<T, ThreadSleeper> {
    /// Creates a client with the default retry policy.
    pub fn new(transport: T, model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            transport,
            sleeper: ThreadSleeper,
            model: model.into(),
            instructions: instructions.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Creates a client from the `[completion]` config section.
    pub fn from_config(transport: T, config: &CompletionConfig) -> Result<Self> {
        let retry = RetryPolicy::new(config.max_retries, config.backoff_base)?;
        Ok(Self::new(transport, config.model.clone(), config.instructions.clone())
            .with_retry_policy(retry))
    }
}

impl<T: CompletionTransport, S: Sleeper> CompletionClient<T, S> {
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the sleeper used between retries.
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> CompletionClient<T, S2> {
        CompletionClient {
            transport: self.transport,
            sleeper,
            model: self.model,
            instructions: self.instructions,
            retry: self.retry,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds the provider request for a transcript.
    ///
    /// The first message is always a single system message carrying the
    /// effective instructions. A leading system-notice turn is replaced by
    /// it rather than kept alongside.
    pub fn build_request(
        &self,
        transcript: &[Turn],
        override_instructions: Option<&str>,
    ) -> CompletionRequest {
        let instructions = override_instructions
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(self.instructions.as_str());

        let mut input: Vec<Message> = transcript
            .iter()
            .map(|turn| Message::new(Role::from(turn.speaker), turn.text.clone()))
            .collect();

        match input.first_mut() {
            Some(first) if first.role == Role::System => first.content = instructions.to_string(),
            _ => input.insert(0, Message::new(Role::System, instructions)),
        }

        CompletionRequest {
            model: self.model.clone(),
            input,
        }
    }

    /// Asks the service to continue `transcript` and returns its reply.
    ///
    /// Rate limits, timeouts and connection failures are retried up to the
    /// policy's budget, sleeping `base^attempt` seconds before each retry.
    /// Every other failure is returned immediately.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` if `transcript` is empty (no request is made)
    /// - `TransientProvider` once the retry budget is spent
    /// - `ClientConfig` for rejected requests or credentials
    /// - `Server` for provider-side and unclassified status failures
    /// - `Provider` for anything else
    pub fn respond(
        &self,
        transcript: &[Turn],
        override_instructions: Option<&str>,
    ) -> Result<String> {
        if transcript.is_empty() {
            error!("Empty transcript passed to respond()");
            return Err(SolaceError::EmptyInput);
        }

        let request = self.build_request(transcript, override_instructions);
        let mut attempt: u32 = 0;

        loop {
            info!(
                model = %request.model,
                attempt = attempt + 1,
                messages = request.input.len(),
                "Calling completion service"
            );

            let failure = match self.transport.complete(&request) {
                Ok(text) => return Ok(reply_text(text)),
                Err(failure) => failure,
            };

            match failure.class() {
                FailureClass::Transient => {
                    attempt += 1;
                    if attempt > self.retry.max_retries {
                        error!("Exceeded retries for transient error: {}", failure);
                        return Err(SolaceError::TransientProvider {
                            attempts: self.retry.max_retries,
                            failure,
                        });
                    }
                    let wait = self.retry.delay(attempt);
                    warn!(
                        "{} on attempt {} - retrying in {:.1} seconds",
                        failure.kind,
                        attempt,
                        wait.as_secs_f64()
                    );
                    self.sleeper.sleep(wait);
                }
                FailureClass::ClientConfig => {
                    error!("Non-retryable provider error: {}", failure);
                    return Err(SolaceError::ClientConfig(failure));
                }
                FailureClass::Server => {
                    error!("Server error, giving up: {}", failure);
                    return Err(SolaceError::Server(failure));
                }
                FailureClass::Other => {
                    error!("Unexpected provider error: {}", failure);
                    return Err(SolaceError::Provider(failure));
                }
            }
        }
    }
}

fn reply_text(text: Option<String>) -> String {
    text.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_TEXT_FALLBACK.to_string())
}

//! Blocking HTTP transport for an OpenAI-style Responses endpoint.

use super::failure::{FailureKind, ProviderFailure};
use super::transport::{CompletionRequest, CompletionTransport};
use crate::config::CompletionConfig;
use crate::error::{Result, SolaceError};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Sends completion requests as `POST {base_url}/responses`.
#[derive(Debug)]
pub struct HttpTransport {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SolaceError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: responses_endpoint(base_url),
            api_key: api_key.into(),
        })
    }

    /// Builds a transport from config, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            SolaceError::Config(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Self::new(
            &config.base_url,
            api_key,
            config.timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CompletionTransport for HttpTransport {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<Option<String>, ProviderFailure> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(classify_request_error)?;

        let status = response.status();
        let body = response.text().map_err(classify_request_error)?;
        debug!(status = status.as_u16(), "Completion response: {}", body);

        if !status.is_success() {
            return Err(ProviderFailure::new(
                FailureKind::from_status(status.as_u16()),
                parse_error_message(status, &body),
            ));
        }

        let payload: ResponsePayload = serde_json::from_str(&body).map_err(|e| {
            ProviderFailure::new(FailureKind::ResponseValidation, e.to_string())
        })?;
        Ok(payload.output_text())
    }
}

fn responses_endpoint(base_url: &str) -> String {
    format!("{}/responses", base_url.trim().trim_end_matches('/'))
}

fn classify_request_error(error: reqwest::Error) -> ProviderFailure {
    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_connect() {
        FailureKind::Connection
    } else if error.is_decode() {
        FailureKind::ResponseValidation
    } else if error.is_builder() {
        FailureKind::BadRequest
    } else {
        FailureKind::Other
    };
    ProviderFailure::new(kind, error.to_string())
}

#[derive(Debug, Deserialize)]
struct ResponsePayload {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsePayload {
    /// Concatenates every `output_text` content part.
    fn output_text(&self) -> Option<String> {
        if let Some(text) = self.output_text.as_deref().filter(|t| !t.is_empty()) {
            return Some(text.to_string());
        }

        let text: String = self
            .output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorFields>,
}

#[derive(Debug, Deserialize)]
struct ErrorFields {
    message: Option<String>,
}

fn parse_error_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.error)
        .and_then(|error| error.message)
        .filter(|message| !message.is_empty());

    match message {
        Some(message) => message,
        None if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        None => body.to_string(),
    }
}

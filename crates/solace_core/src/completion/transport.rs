//! The request/response boundary to the completion service.

use super::failure::ProviderFailure;
use crate::types::Speaker;
use serde::{Deserialize, Serialize};

/// Provider-side role of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl From<Speaker> for Role {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::Human => Role::User,
            Speaker::Assistant => Role::Assistant,
            Speaker::SystemNotice => Role::System,
        }
    }
}

/// One provider-shaped message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Payload sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub input: Vec<Message>,
}

/// Performs one blocking completion call.
///
/// Implementations return `Ok(None)` when the service answered without any
/// text, and classify every failure into a [`ProviderFailure`].
pub trait CompletionTransport {
    fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderFailure>;
}

impl<T: CompletionTransport + ?Sized> CompletionTransport for &T {
    fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderFailure> {
        (**self).complete(request)
    }
}

impl<T: CompletionTransport + ?Sized> CompletionTransport for Box<T> {
    fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderFailure> {
        (**self).complete(request)
    }
}

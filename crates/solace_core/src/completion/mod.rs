//! Client for the remote text-completion service.

mod client;
mod failure;
mod http;
mod transport;

pub use client::{
    CompletionClient, RetryPolicy, Sleeper, ThreadSleeper, NO_TEXT_FALLBACK,
};
pub use failure::{FailureClass, FailureKind, ProviderFailure};
pub use http::HttpTransport;
pub use transport::{CompletionRequest, CompletionTransport, Message, Role};

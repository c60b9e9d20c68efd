//! Closed failure taxonomy for the completion service.

use std::fmt;
use thiserror::Error;

/// What went wrong on a completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// 429: too many requests.
    RateLimited,
    /// The request did not complete in time.
    Timeout,
    /// The service could not be reached.
    Connection,
    /// 400.
    BadRequest,
    /// 401.
    Authentication,
    /// 403.
    PermissionDenied,
    /// 404, usually an unknown model.
    NotFound,
    /// 409.
    Conflict,
    /// 422.
    Unprocessable,
    /// The service answered with a body we could not interpret.
    ResponseValidation,
    /// 5xx.
    InternalServer,
    /// Any status code without a dedicated kind.
    UnexpectedStatus(u16),
    /// Anything else.
    Other,
}

/// How the retry loop treats a [`FailureKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Worth waiting for: retried with backoff.
    Transient,
    /// The request or our credentials are wrong: fail fast.
    ClientConfig,
    /// The provider is broken: fail fast.
    Server,
    /// Unclassified: fail fast.
    Other,
}

impl FailureKind {
    /// Maps an HTTP status code to a failure kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 => Self::Timeout,
            409 => Self::Conflict,
            422 => Self::Unprocessable,
            429 => Self::RateLimited,
            500..=599 => Self::InternalServer,
            other => Self::UnexpectedStatus(other),
        }
    }

    /// Retry class of this kind.
    pub fn class(self) -> FailureClass {
        match self {
            Self::RateLimited | Self::Timeout | Self::Connection => FailureClass::Transient,
            Self::BadRequest
            | Self::Authentication
            | Self::PermissionDenied
            | Self::NotFound
            | Self::Conflict
            | Self::Unprocessable
            | Self::ResponseValidation => FailureClass::ClientConfig,
            Self::InternalServer | Self::UnexpectedStatus(_) => FailureClass::Server,
            Self::Other => FailureClass::Other,
        }
    }

    pub fn is_transient(self) -> bool {
        self.class() == FailureClass::Transient
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limited"),
            Self::Timeout => write!(f, "timed out"),
            Self::Connection => write!(f, "connection failed"),
            Self::BadRequest => write!(f, "bad request"),
            Self::Authentication => write!(f, "authentication failed"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::NotFound => write!(f, "not found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Unprocessable => write!(f, "unprocessable entity"),
            Self::ResponseValidation => write!(f, "unexpected response shape"),
            Self::InternalServer => write!(f, "internal server error"),
            Self::UnexpectedStatus(status) => write!(f, "HTTP {}", status),
            Self::Other => write!(f, "unexpected failure"),
        }
    }
}

/// A failed completion call as reported by a transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ProviderFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn class(&self) -> FailureClass {
        self.kind.class()
    }
}

//! Error types for solace_core operations.

use crate::completion::ProviderFailure;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for solace_core operations.
#[derive(Error, Debug)]
pub enum SolaceError {
    /// Secret or passcode was empty.
    #[error("invalid credential input: secret and passcode must be non-empty")]
    InvalidCredentialInput,

    /// A stored password hash could not be parsed.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    /// The password hasher itself failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// A user field failed its validation predicate.
    #[error("invalid user {field}: {reason}")]
    InvalidUserData {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A user with this email already exists.
    #[error("user e-mail already exists: {0}")]
    DuplicateUser(String),

    /// No user is registered under this email.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Secret or passcode did not match the stored hash.
    #[error("invalid password/passcode for e-mail: {0}")]
    InvalidCredentials(String),

    /// Reading or writing the backing store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// A completion was requested for an empty transcript.
    #[error("transcript must contain at least one turn")]
    EmptyInput,

    /// Transient provider failures persisted past the retry budget.
    #[error("provider still failing after {attempts} retries: {failure}")]
    TransientProvider {
        /// Number of retries performed before giving up
        attempts: u32,
        /// The last failure observed
        #[source]
        failure: ProviderFailure,
    },

    /// The provider rejected the request or our credentials.
    #[error("provider rejected request: {0}")]
    ClientConfig(#[source] ProviderFailure),

    /// The provider failed on its side.
    #[error("provider server error: {0}")]
    Server(#[source] ProviderFailure),

    /// Any other provider failure.
    #[error("provider error: {0}")]
    Provider(#[source] ProviderFailure),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    Config(String),
}

impl SolaceError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCredentialInput => Some("Both the password and the passcode must be filled in."),
            Self::InvalidCredentials(_) => Some("Check the password and passcode and try again."),
            Self::UserNotFound(_) => Some("Register first with 'solace register'."),
            Self::DuplicateUser(_) => Some("Use a different e-mail address or log in instead."),
            Self::Storage(_) => {
                Some("The change was not saved. Check permissions and free space of the data directory.")
            }
            Self::ClientConfig(_) => {
                Some("Check the API key environment variable and the model name in config.toml.")
            }
            Self::TransientProvider { .. } => Some("The service is busy or unreachable. Try again later."),
            Self::Config(_) => Some("Fix config.toml or remove it to fall back to defaults."),
            _ => None,
        }
    }
}

/// Failure of the durable store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing file does not exist.
    #[error("store not found at {}", path.display())]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The stored content is not valid JSON.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// Path of the undecodable file
        path: PathBuf,
        /// Underlying parser error
        #[source]
        source: serde_json::Error,
    },

    /// The document could not be serialized.
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// OS-level failure while reading or writing.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

/// Why a single stored user record was rejected.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The record is not a JSON object.
    #[error("record is not an object")]
    NotAnObject,

    /// `id` is missing or not a UUID.
    #[error("invalid id format: {0}")]
    InvalidId(String),

    /// A required field is missing or has the wrong type.
    #[error("missing or invalid field '{0}'")]
    MissingField(&'static str),

    /// `password_hash` is not valid base64.
    #[error("password hash is not valid base64: {0}")]
    InvalidHash(String),

    /// The decoded fields violate a user invariant.
    #[error("{field}: {reason}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Convenience Result type for solace_core operations.
pub type Result<T> = std::result::Result<T, SolaceError>;

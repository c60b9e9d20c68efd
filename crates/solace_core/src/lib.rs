//! Solace Core Library
//!
//! Authenticated chat sessions backed by a persisted user directory:
//! - Salted, slow hashing of a secret + passcode pair
//! - A user directory kept in a single JSON document
//! - A completion client with classified failures and bounded backoff
//!
//! # Quick Start
//!
//! ```
//! use solace_core::{MemoryStore, UserDirectory};
//!
//! let mut directory = UserDirectory::new(MemoryStore::new());
//! directory.create("Ada", "ada@example.com", "s3cret", "1815").unwrap();
//!
//! let user = directory.authenticate("ada@example.com", "s3cret", "1815").unwrap();
//! assert_eq!(user.name(), "Ada");
//! assert!(directory.authenticate("ada@example.com", "s3cret", "0000").is_err());
//! ```
//!
//! # Chatting
//!
//! A [`ChatSession`] works on a copy of a user's transcript and writes it
//! back when it ends. Any [`CompletionTransport`] can answer:
//!
//! ```
//! use solace_core::{
//!     ChatSession, CompletionClient, CompletionRequest, CompletionTransport, MemoryStore,
//!     ProviderFailure, UserDirectory,
//! };
//!
//! struct Echo;
//!
//! impl CompletionTransport for Echo {
//!     fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderFailure> {
//!         Ok(request.input.last().map(|m| format!("echo: {}", m.content)))
//!     }
//! }
//!
//! let mut directory = UserDirectory::new(MemoryStore::new());
//! directory.create("Ada", "ada@example.com", "s3cret", "1815").unwrap();
//!
//! let client = CompletionClient::new(Echo, "o4-mini", "Be brief.");
//! let user = directory.authenticate("ada@example.com", "s3cret", "1815").unwrap();
//! let mut session = ChatSession::begin(user);
//!
//! assert_eq!(session.send(&client, "hello", None).unwrap(), "echo: hello");
//! session.end(&mut directory).unwrap();
//!
//! assert_eq!(directory.get("ada@example.com").unwrap().transcript().len(), 3);
//! ```

pub mod completion;
mod config;
pub mod credentials;
mod directory;
mod error;
mod session;
mod store;
mod types;
mod user;

pub use completion::{
    CompletionClient, CompletionRequest, CompletionTransport, FailureClass, FailureKind,
    HttpTransport, Message, ProviderFailure, RetryPolicy, Role, Sleeper, ThreadSleeper,
    NO_TEXT_FALLBACK,
};
pub use config::{CompletionConfig, Config, StorageConfig, CONFIG_FILE};
pub use directory::{LoadReport, ProfileUpdate, UserDirectory};
pub use error::{RecordError, Result, SolaceError, StoreError};
pub use session::{ChatSession, SESSION_CONTINUED, SESSION_STARTED};
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
pub use types::{Speaker, Turn};
pub use user::{is_valid_email, User, MAX_LOCAL_PART_LEN};

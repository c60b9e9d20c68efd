//! Chat session lifecycle for an authenticated user.

use crate::completion::{CompletionClient, CompletionTransport, Sleeper};
use crate::directory::UserDirectory;
use crate::error::{Result, SolaceError};
use crate::store::DocumentStore;
use crate::types::Turn;
use crate::user::User;
use tracing::{info, warn};
use uuid::Uuid;

/// Notice appended when a user without history starts chatting.
pub const SESSION_STARTED: &str = "Chat session started...";

/// Notice appended when a user with history starts chatting.
pub const SESSION_CONTINUED: &str = "Continuing previous chat session from here...";

/// Active chat for one user.
///
/// A session works on a copy of the user's transcript. Nothing reaches the
/// store until [`ChatSession::end`] writes the copy back through the
/// directory.
#[derive(Debug, Clone)]
pub struct ChatSession {
    user_id: Uuid,
    email: String,
    transcript: Vec<Turn>,
    /// Index of the first turn added by this session.
    started_at: usize,
}

impl ChatSession {
    /// Starts a session from an authenticated user.
    pub fn begin(user: &User) -> Self {
        let mut transcript = user.transcript().to_vec();
        let notice = if transcript.is_empty() {
            SESSION_STARTED
        } else {
            SESSION_CONTINUED
        };
        let started_at = transcript.len();
        transcript.push(Turn::notice(notice));

        info!(user_id = %user.id(), turns = started_at, "Chat session started");
        Self {
            user_id: user.id(),
            email: user.email().to_string(),
            transcript,
            started_at,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Turns appended since the session began, including the opening notice.
    pub fn new_turns(&self) -> &[Turn] {
        &self.transcript[self.started_at..]
    }

    /// Sends one message and records the exchange.
    ///
    /// On success the human turn and the reply are appended. On a provider
    /// failure the human turn stays, an `error fetching response` notice is
    /// appended, and the error is returned; the session remains usable.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for a blank message (the transcript is left untouched),
    /// or any error from [`CompletionClient::respond`].
    pub fn send<T, S>(
        &mut self,
        client: &CompletionClient<T, S>,
        message: &str,
        override_instructions: Option<&str>,
    ) -> Result<String>
    where
        T: CompletionTransport,
        S: Sleeper,
    {
        if message.trim().is_empty() {
            return Err(SolaceError::EmptyInput);
        }

        self.transcript.push(Turn::human(message));
        match client.respond(&self.transcript, override_instructions) {
            Ok(reply) => {
                self.transcript.push(Turn::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                warn!(user_id = %self.user_id, "Completion failed: {}", e);
                self.transcript
                    .push(Turn::notice(format!("error fetching response: {}", e)));
                Err(e)
            }
        }
    }

    /// Writes the transcript back to the user and persists the directory.
    pub fn end<S: DocumentStore>(self, directory: &mut UserDirectory<S>) -> Result<()> {
        let added = self.transcript.len() - self.started_at;
        directory.replace_transcript(&self.email, self.transcript)?;
        info!(user_id = %self.user_id, added, "Chat session saved");
        Ok(())
    }
}

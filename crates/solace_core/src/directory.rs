//! The user directory: all registered users plus an e-mail index.

use crate::credentials;
use crate::error::{Result, SolaceError, StoreError};
use crate::store::DocumentStore;
use crate::types::Turn;
use crate::user::{validate_email, validate_name, User};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Outcome of [`UserDirectory::load`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Records turned into users.
    pub loaded: usize,
    /// Records skipped because they were malformed or duplicated.
    pub skipped: usize,
}

/// A batch of profile edits applied and persisted together.
///
/// All present fields are validated before any of them is applied.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    name: Option<String>,
    email: Option<String>,
    credentials: Option<(String, String)>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn credentials(mut self, secret: impl Into<String>, passcode: impl Into<String>) -> Self {
        self.credentials = Some((secret.into(), passcode.into()));
        self
    }

    /// True if the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.credentials.is_none()
    }
}

/// In-memory collection of users backed by a [`DocumentStore`].
///
/// The directory is the only owner of users and of the e-mail index. Every
/// mutating call writes the whole collection back to the store before
/// returning. If that write fails, the in-memory change is undone and the
/// storage error is returned.
///
/// Not reentrant: callers on several threads must serialize access.
pub struct UserDirectory<S: DocumentStore> {
    store: S,
    users: Vec<User>,
    by_email: HashMap<String, usize>,
}

impl<S: DocumentStore> UserDirectory<S> {
    /// Creates an empty directory without reading the store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            users: Vec::new(),
            by_email: HashMap::new(),
        }
    }

    /// Creates a directory and loads it from the store.
    pub fn open(store: S) -> Result<Self> {
        let mut directory = Self::new(store);
        directory.load()?;
        Ok(directory)
    }

    /// Replaces the in-memory state with the store's content.
    ///
    /// An absent or undecodable document yields an empty directory, and each
    /// malformed record is skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store cannot be read at all. The directory is
    /// left empty and must not be persisted.
    pub fn load(&mut self) -> Result<LoadReport> {
        self.users.clear();
        self.by_email.clear();

        let document = match self.store.read() {
            Ok(document) => document,
            Err(StoreError::NotFound { path }) => {
                warn!("User data file not found at {}. Starting with no users.", path.display());
                return Ok(LoadReport::default());
            }
            Err(e @ StoreError::Decode { .. }) => {
                error!("Failed to decode user data, starting with no users: {}", e);
                return Ok(LoadReport::default());
            }
            Err(e) => {
                error!("Failed to read user data: {}", e);
                return Err(e.into());
            }
        };

        let records = match document {
            Value::Array(records) => records,
            other => {
                error!(
                    "User data did not contain a JSON list (found {}). Cannot load users.",
                    json_kind(&other)
                );
                return Ok(LoadReport::default());
            }
        };

        let mut report = LoadReport::default();
        for record in &records {
            match User::from_record(record) {
                Ok(user) if self.by_email.contains_key(user.email()) => {
                    warn!("Skipping duplicate email loaded: {}", user.email());
                    report.skipped += 1;
                }
                Ok(user) => {
                    self.by_email.insert(user.email().to_string(), self.users.len());
                    self.users.push(user);
                    report.loaded += 1;
                }
                Err(e) => {
                    warn!("Skipping user record due to data error: {}", e);
                    report.skipped += 1;
                }
            }
        }

        info!(
            loaded = report.loaded,
            skipped = report.skipped,
            "Loaded user directory"
        );
        Ok(report)
    }

    /// Writes the whole collection to the store.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if encoding or writing fails. The error is never
    /// swallowed: a failed persist means the change is not durable.
    pub fn persist(&mut self) -> Result<()> {
        let records = self
            .users
            .iter()
            .map(User::to_record)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if let Err(e) = self.store.write(&Value::Array(records)) {
            error!("Failed to save user data: {}", e);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// All users in insertion order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Looks a user up by e-mail.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if no user has this e-mail.
    pub fn get(&self, email: &str) -> Result<&User> {
        let position = self.position(email)?;
        Ok(&self.users[position])
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a new user and persists the directory.
    ///
    /// # Errors
    ///
    /// - `DuplicateUser` if the e-mail is taken
    /// - `InvalidCredentialInput` if secret or passcode is empty
    /// - `InvalidUserData` if name or e-mail is invalid
    /// - `Storage` if the directory could not be saved
    pub fn create(
        &mut self,
        name: &str,
        email: &str,
        secret: &str,
        passcode: &str,
    ) -> Result<&User> {
        if self.by_email.contains_key(email) {
            warn!("User e-mail already exists: {}", email);
            return Err(SolaceError::DuplicateUser(email.to_string()));
        }

        let password_hash = credentials::hash(secret, passcode)?;
        let user = User::new(name, email, password_hash)?;

        let position = self.users.len();
        self.by_email.insert(user.email().to_string(), position);
        self.users.push(user);

        if let Err(e) = self.persist() {
            self.users.pop();
            self.by_email.remove(email);
            return Err(e);
        }

        let user = &self.users[position];
        info!(user_id = %user.id(), "Created user {}", user.email());
        Ok(user)
    }

    /// Checks credentials and returns the matching user.
    ///
    /// A legacy bcrypt hash is replaced by an Argon2id hash and persisted on
    /// the first successful login. If that write fails the old hash is kept
    /// and the login still succeeds.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the e-mail is unknown
    /// - `InvalidCredentials` if secret or passcode do not match
    /// - `MalformedHash` if the stored hash is unreadable
    pub fn authenticate(&mut self, email: &str, secret: &str, passcode: &str) -> Result<&User> {
        let position = match self.position(email) {
            Ok(position) => position,
            Err(e) => {
                warn!("User not found: {}", email);
                return Err(e);
            }
        };

        let matches = match self.users[position].verify_credentials(secret, passcode) {
            Ok(matches) => matches,
            Err(SolaceError::InvalidCredentialInput) => false,
            Err(e) => return Err(e),
        };

        if !matches {
            warn!("Invalid password/passcode for e-mail: {}", email);
            return Err(SolaceError::InvalidCredentials(email.to_string()));
        }

        if credentials::is_legacy(self.users[position].password_hash()) {
            self.upgrade_hash(position, secret, passcode);
        }
        Ok(&self.users[position])
    }

    /// Changes a user's display name.
    pub fn rename(&mut self, email: &str, new_name: &str) -> Result<()> {
        self.update_profile(email, ProfileUpdate::new().name(new_name))
    }

    /// Moves a user to a new e-mail address, re-keying the index.
    pub fn change_email(&mut self, email: &str, new_email: &str) -> Result<()> {
        self.update_profile(email, ProfileUpdate::new().email(new_email))
    }

    /// Replaces a user's secret and passcode.
    pub fn change_credentials(
        &mut self,
        email: &str,
        new_secret: &str,
        new_passcode: &str,
    ) -> Result<()> {
        self.update_profile(
            email,
            ProfileUpdate::new().credentials(new_secret, new_passcode),
        )
    }

    /// Applies a batch of profile edits and persists once.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if `email` is unknown
    /// - `InvalidUserData` / `InvalidCredentialInput` if a new value is invalid
    /// - `DuplicateUser` if the new e-mail belongs to another user
    /// - `Storage` if saving fails, in which case nothing is changed
    pub fn update_profile(&mut self, email: &str, update: ProfileUpdate) -> Result<()> {
        let position = self.position(email)?;

        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(new_email) = &update.email {
            validate_email(new_email)?;
            if new_email != email && self.by_email.contains_key(new_email) {
                warn!("User e-mail already exists: {}", new_email);
                return Err(SolaceError::DuplicateUser(new_email.clone()));
            }
        }
        let password_hash = match &update.credentials {
            Some((secret, passcode)) => Some(credentials::hash(secret, passcode)?),
            None => None,
        };

        let snapshot = self.users[position].clone();
        let user = &mut self.users[position];

        if let Some(name) = update.name {
            info!("Changing user name '{}' to '{}'", user.name(), name);
            user.set_name(name)?;
        }
        if let Some(hash) = password_hash {
            info!("Changing credentials for {}", user.email());
            user.set_password_hash(hash)?;
        }
        if let Some(new_email) = update.email {
            if new_email != email {
                info!("Changing user e-mail '{}' to '{}'", email, new_email);
                user.set_email(new_email.clone())?;
                self.by_email.remove(email);
                self.by_email.insert(new_email, position);
            }
        }

        self.commit_or_restore(position, snapshot)
    }

    /// Replaces a user's transcript and persists.
    ///
    /// This is how a chat session flushes its history when it ends.
    pub fn replace_transcript(&mut self, email: &str, transcript: Vec<Turn>) -> Result<()> {
        let position = self.position(email)?;
        let snapshot = self.users[position].clone();
        self.users[position].set_transcript(transcript);
        self.commit_or_restore(position, snapshot)
    }

    /// Removes a user and persists. Returns the removed user.
    pub fn delete(&mut self, email: &str) -> Result<User> {
        let position = self.position(email)?;
        let user = self.users.remove(position);
        self.reindex();

        if let Err(e) = self.persist() {
            self.users.insert(position, user);
            self.reindex();
            return Err(e);
        }

        info!(user_id = %user.id(), "Deleted user {}", user.email());
        Ok(user)
    }

    fn position(&self, email: &str) -> Result<usize> {
        self.by_email
            .get(email)
            .copied()
            .ok_or_else(|| SolaceError::UserNotFound(email.to_string()))
    }

    fn upgrade_hash(&mut self, position: usize, secret: &str, passcode: &str) {
        let snapshot = self.users[position].clone();
        let result = credentials::hash(secret, passcode)
            .and_then(|hash| self.users[position].set_password_hash(hash))
            .and_then(|()| self.commit_or_restore(position, snapshot));

        let user = &self.users[position];
        match result {
            Ok(()) => info!(user_id = %user.id(), "Upgraded legacy password hash for {}", user.email()),
            Err(e) => warn!("Keeping legacy password hash for {}: {}", user.email(), e),
        }
    }

    fn commit_or_restore(&mut self, position: usize, snapshot: User) -> Result<()> {
        if let Err(e) = self.persist() {
            self.users[position] = snapshot;
            self.reindex();
            return Err(e);
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.by_email = self
            .users
            .iter()
            .enumerate()
            .map(|(position, user)| (user.email().to_string(), position))
            .collect();
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

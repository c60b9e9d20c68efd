//! The user entity and its on-disk record form.

use crate::credentials;
use crate::error::{RecordError, Result, SolaceError, StoreError};
use crate::types::Turn;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;
use uuid::Uuid;

/// Maximum length of the part before `@`.
pub const MAX_LOCAL_PART_LEN: usize = 30;

fn email_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        let pattern = format!(
            r"^[A-Za-z0-9](?:[A-Za-z0-9._%+-]{{0,{inner}}}[A-Za-z0-9])?@[A-Za-z0-9](?:[A-Za-z0-9.-]*[A-Za-z0-9])?\.[A-Za-z]{{2,}}$",
            inner = MAX_LOCAL_PART_LEN - 2,
        );
        Regex::new(&pattern).expect("email regex must compile")
    })
}

/// Returns true if `email` matches the accepted address grammar.
///
/// The local part is 1 to 30 characters, starts and ends alphanumeric and
/// the address never contains `..`. The top-level domain label is at least
/// two letters.
pub fn is_valid_email(email: &str) -> bool {
    !email.contains("..") && email_regex().is_match(email)
}

/// A registered user.
///
/// Every constructor and setter validates its input, so a `User` value always
/// satisfies the field invariants. The `id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    name: String,
    email: String,
    password_hash: Vec<u8>,
    transcript: Vec<Turn>,
}

impl User {
    /// Creates a new user with a freshly minted id and an empty transcript.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: Vec<u8>,
    ) -> Result<Self> {
        Self::from_parts(Uuid::new_v4(), name, email, password_hash, Vec::new())
    }

    /// Assembles a user from already-known parts, validating each one.
    pub fn from_parts(
        id: Uuid,
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: Vec<u8>,
        transcript: Vec<Turn>,
    ) -> Result<Self> {
        let name = name.into();
        let email = email.into();

        if id.is_nil() {
            return Err(invalid("id", "must not be the nil UUID"));
        }
        validate_name(&name)?;
        validate_email(&email)?;
        validate_password_hash(&password_hash)?;

        Ok(Self {
            id,
            name,
            email,
            password_hash,
            transcript,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &[u8] {
        &self.password_hash
    }

    /// The conversation history, oldest first.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Checks a secret/passcode pair against this user's stored hash.
    pub fn verify_credentials(&self, secret: &str, passcode: &str) -> Result<bool> {
        credentials::verify(secret, passcode, &self.password_hash)
    }

    pub(crate) fn set_name(&mut self, name: String) -> Result<()> {
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub(crate) fn set_email(&mut self, email: String) -> Result<()> {
        validate_email(&email)?;
        self.email = email;
        Ok(())
    }

    pub(crate) fn set_password_hash(&mut self, password_hash: Vec<u8>) -> Result<()> {
        validate_password_hash(&password_hash)?;
        self.password_hash = password_hash;
        Ok(())
    }

    pub(crate) fn set_transcript(&mut self, transcript: Vec<Turn>) -> Vec<Turn> {
        std::mem::replace(&mut self.transcript, transcript)
    }

    /// Encodes the user as its on-disk JSON record.
    pub fn to_record(&self) -> std::result::Result<Value, StoreError> {
        let record = UserRecord {
            id: self.id.to_string(),
            name: &self.name,
            email: &self.email,
            password_hash: BASE64.encode(&self.password_hash),
            transcript: &self.transcript,
        };
        serde_json::to_value(record).map_err(StoreError::Encode)
    }

    /// Decodes one on-disk record.
    ///
    /// A missing or malformed transcript is replaced by an empty one with a
    /// warning; every other defect rejects the record.
    pub fn from_record(value: &Value) -> std::result::Result<Self, RecordError> {
        let fields = value.as_object().ok_or(RecordError::NotAnObject)?;

        let id = match fields.get("id") {
            Some(Value::String(raw)) => {
                Uuid::parse_str(raw).map_err(|_| RecordError::InvalidId(raw.clone()))?
            }
            Some(other) => return Err(RecordError::InvalidId(other.to_string())),
            None => return Err(RecordError::InvalidId("missing".to_string())),
        };

        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingField("name"))?;
        let email = fields
            .get("email")
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingField("email"))?;

        let encoded_hash = fields
            .get("password_hash")
            .or_else(|| fields.get("hashed_password"))
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingField("password_hash"))?;
        let password_hash = BASE64
            .decode(encoded_hash)
            .map_err(|e| RecordError::InvalidHash(e.to_string()))?;

        let transcript = match fields.get("transcript").or_else(|| fields.get("chat_history")) {
            Some(items @ Value::Array(_)) => {
                serde_json::from_value::<Vec<Turn>>(items.clone()).unwrap_or_else(|e| {
                    warn!(user_id = %id, "Invalid transcript item ({}), resetting transcript", e);
                    Vec::new()
                })
            }
            _ => {
                warn!(user_id = %id, "Missing or invalid transcript, resetting");
                Vec::new()
            }
        };

        Self::from_parts(id, name, email, password_hash, transcript).map_err(|e| match e {
            SolaceError::InvalidUserData { field, reason } => {
                RecordError::Validation { field, reason }
            }
            other => RecordError::Validation {
                field: "record",
                reason: other.to_string(),
            },
        })
    }
}

#[derive(Serialize)]
struct UserRecord<'a> {
    id: String,
    name: &'a str,
    email: &'a str,
    password_hash: String,
    transcript: &'a [Turn],
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid("name", "must be a non-empty string"));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<()> {
    if !is_valid_email(email) {
        return Err(invalid(
            "email",
            format!("'{}' is not a valid e-mail address", email),
        ));
    }
    Ok(())
}

fn validate_password_hash(password_hash: &[u8]) -> Result<()> {
    if password_hash.is_empty() {
        return Err(invalid("password_hash", "must not be empty"));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SolaceError {
    SolaceError::InvalidUserData {
        field,
        reason: reason.into(),
    }
}

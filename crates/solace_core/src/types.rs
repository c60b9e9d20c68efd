//! Core data types for conversation transcripts.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    /// The logged-in user.
    Human,

    /// The completion service.
    Assistant,

    /// A notice emitted by the application itself.
    SystemNotice,
}

impl Speaker {
    /// The tag written to disk and shown in front of each turn.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Human => "You",
            Self::Assistant => "AI",
            Self::SystemNotice => "System",
        }
    }

    /// Parses a stored tag. Accepts display tags and role-style names.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "You" | "human" | "user" => Some(Self::Human),
            "AI" | "assistant" => Some(Self::Assistant),
            "System" | "system" => Some(Self::SystemNotice),
            _ => None,
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for Speaker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for Speaker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Speaker::from_tag(&tag)
            .ok_or_else(|| de::Error::custom(format!("unknown speaker tag: {}", tag)))
    }
}

/// One entry of a transcript.
///
/// Stored as a two-element array `[speaker, text]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Who said it.
    pub speaker: Speaker,
    /// What was said.
    pub text: String,
}

impl Turn {
    /// Creates a turn.
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    /// A turn typed by the user.
    pub fn human(text: impl Into<String>) -> Self {
        Self::new(Speaker::Human, text)
    }

    /// A turn returned by the completion service.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    /// A notice produced by the application.
    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(Speaker::SystemNotice, text)
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

impl Serialize for Turn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.speaker, &self.text).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Turn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (speaker, text) = <(Speaker, String)>::deserialize(deserializer)?;
        Ok(Self { speaker, text })
    }
}

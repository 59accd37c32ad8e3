//! Conversation Content
//!
//! Multi-part message format shared by the runner, sessions and providers.

use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input
    User,
    /// Model response
    Model,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// A single piece of message content
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Text content
    pub text: String,

    /// Whether this part is a thought summary rather than answer text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            thought: false,
        }
    }

    pub fn thought(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            thought: true,
        }
    }
}

/// A message: a role plus an ordered list of parts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    /// Create a single-part user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    /// Create a single-part model message
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![Part::text(text)])
    }

    /// Answer text: non-thought parts concatenated in order
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.thought)
            .map(|p| p.text.as_str())
            .collect()
    }

    /// Thought summary text, if the model produced any
    pub fn thoughts(&self) -> Option<String> {
        let thoughts: String = self
            .parts
            .iter()
            .filter(|p| p.thought)
            .map(|p| p.text.as_str())
            .collect();
        (!thoughts.is_empty()).then_some(thoughts)
    }

    /// Copy of this content without thought parts
    pub fn without_thoughts(&self) -> Self {
        Self {
            role: self.role,
            parts: self.parts.iter().filter(|p| !p.thought).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|p| p.text.is_empty())
    }
}

/// A latitude/longitude pair in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Shortest round-trip form: `40.7580, -73.9855` renders as `40.758, -73.9855`.
impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

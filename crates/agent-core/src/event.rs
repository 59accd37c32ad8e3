//! Runner Events
//!
//! Every turn produces a sequence of events: the user's message, zero or more
//! partial model chunks, then one final model event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Content;
use crate::provider::{GroundingMetadata, LlmResponse, TokenUsage};

/// Author recorded on user events
pub const USER_AUTHOR: &str = "user";

/// A single item in a session history or a runner event stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,

    /// Groups all events of one `Runner::run` call
    pub invocation_id: String,

    /// `"user"` or the agent's name
    pub author: String,

    pub content: Option<Content>,

    /// Incremental chunk of a streamed response
    #[serde(default)]
    pub partial: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding: Option<GroundingMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,

    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(invocation_id: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            content: None,
            partial: false,
            grounding: None,
            usage: None,
            timestamp: Utc::now(),
        }
    }

    /// Event recording the user's message
    pub fn user(invocation_id: impl Into<String>, content: Content) -> Self {
        let mut event = Self::new(invocation_id, USER_AUTHOR);
        event.content = Some(content);
        event
    }

    /// Event carrying a model response (or chunk) authored by `agent`
    pub fn from_response(
        invocation_id: impl Into<String>,
        agent: impl Into<String>,
        response: LlmResponse,
    ) -> Self {
        let mut event = Self::new(invocation_id, agent);
        event.content = response.content;
        event.partial = response.partial;
        event.grounding = response.grounding.filter(|g| !g.is_empty());
        event.usage = response.usage;
        event
    }

    /// The terminal event of a turn: complete, with content
    pub fn is_final_response(&self) -> bool {
        !self.partial && self.content.is_some()
    }

    /// Answer text of this event, excluding thought summaries
    pub fn text(&self) -> Option<String> {
        self.content
            .as_ref()
            .map(Content::text)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Part, Role};

    #[test]
    fn test_final_response_detection() {
        let mut chunk = LlmResponse::text("gemini-2.5-flash", "Hel");
        chunk.partial = true;
        let partial = Event::from_response("inv", "agent", chunk);
        assert!(!partial.is_final_response());

        let done = Event::from_response("inv", "agent", LlmResponse::text("gemini-2.5-flash", "Hello"));
        assert!(done.is_final_response());
        assert_eq!(done.text().as_deref(), Some("Hello"));

        let empty = Event::new("inv", "agent");
        assert!(!empty.is_final_response());
    }

    #[test]
    fn test_text_skips_thoughts() {
        let mut event = Event::new("inv", "agent");
        event.content = Some(Content::new(
            Role::Model,
            vec![Part::thought("Thinking about Tokyo"), Part::text("It is 9pm.")],
        ));
        assert_eq!(event.text().as_deref(), Some("It is 9pm."));

        event.content = Some(Content::new(Role::Model, vec![Part::thought("only thoughts")]));
        assert!(event.is_final_response());
        assert_eq!(event.text(), None);
    }
}

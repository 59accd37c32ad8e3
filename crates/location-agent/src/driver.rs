//! Conversation Driver
//!
//! Sends one question per call to the location agent and collects the final
//! answer text.

use std::sync::Arc;

use agent_core::{
    Agent, AgentConfig, Content, Coordinates, InMemorySessionService, LlmProvider, Result,
    RunConfig, Runner, SessionKey, SessionService,
};
use futures::StreamExt;

/// Returned when a turn produced no final answer text
pub const NO_RESPONSE: &str = "No response received";

/// A runner plus the identifiers of the session it talks to
pub struct AgentSession {
    pub runner: Runner,
    pub user_id: String,
    pub session_id: String,
}

impl AgentSession {
    /// Ask a question in this session
    pub async fn ask(&self, question: &str, location: Option<Coordinates>) -> Result<String> {
        ask_agent(&self.runner, &self.user_id, &self.session_id, question, location).await
    }
}

/// Build a runner over an in-memory session service and open one session
pub async fn create_agent_runner(
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    app_name: &str,
    user_id: &str,
    session_id: &str,
) -> Result<AgentSession> {
    let agent = Arc::new(Agent::new(provider, config)?);
    let sessions = Arc::new(InMemorySessionService::new());

    sessions
        .create_session(&SessionKey::new(app_name, user_id, session_id))
        .await?;

    Ok(AgentSession {
        runner: Runner::new(app_name, agent, sessions),
        user_id: user_id.to_string(),
        session_id: session_id.to_string(),
    })
}

/// The user message for `question`, with a location note appended when
/// coordinates are known
pub fn build_message(question: &str, location: Option<Coordinates>) -> Content {
    let text = match location {
        Some(coords) => format!("{question}\n\n[Location context: I'm near coordinates {coords}]"),
        None => question.to_string(),
    };
    Content::user(text)
}

/// Submit `question` and return the final answer text.
///
/// Multiple final events are joined with newlines. A turn without any final
/// answer text yields [`NO_RESPONSE`]; remote failures are returned as errors.
pub async fn ask_agent(
    runner: &Runner,
    user_id: &str,
    session_id: &str,
    question: &str,
    location: Option<Coordinates>,
) -> Result<String> {
    let message = build_message(question, location);
    let config = RunConfig {
        location,
        ..RunConfig::default()
    };

    let mut events = runner.run(user_id, session_id, message, config).await?;

    let mut response_parts = Vec::new();
    while let Some(event) = events.next().await {
        let event = event?;
        if event.is_final_response() {
            if let Some(text) = event.text() {
                response_parts.push(text);
            }
        }
    }

    tracing::debug!(session = session_id, parts = response_parts.len(), "Collected response");

    if response_parts.is_empty() {
        Ok(NO_RESPONSE.to_string())
    } else {
        Ok(response_parts.join("\n"))
    }
}

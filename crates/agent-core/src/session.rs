//! Session Management
//!
//! Sessions hold the event history of one conversation, keyed by
//! application, user and session identifiers.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::event::Event;
use crate::message::Content;

/// Identifies a session
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// A conversation session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,

    /// Event history, oldest first
    pub events: Vec<Event>,

    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(key: SessionKey) -> Self {
        let now = Utc::now();
        Self {
            key,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Contents to replay to the model, thought summaries stripped
    pub fn history(&self) -> Vec<Content> {
        self.events
            .iter()
            .filter(|e| !e.partial)
            .filter_map(|e| e.content.as_ref())
            .map(Content::without_thoughts)
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

/// Session storage
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Create a new, empty session. Fails if the key is already taken.
    async fn create_session(&self, key: &SessionKey) -> Result<Session>;

    /// Load a session by key
    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>>;

    /// Append an event to an existing session
    async fn append_event(&self, key: &SessionKey, event: Event) -> Result<()>;

    /// Delete a session (no-op if absent)
    async fn delete_session(&self, key: &SessionKey) -> Result<()>;

    /// List sessions for an app and user, most recently active first
    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>>;
}

/// In-memory session service (process lifetime only)
#[derive(Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<SessionKey, Session>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> AgentError {
    AgentError::Session("session store lock poisoned".into())
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create_session(&self, key: &SessionKey) -> Result<Session> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        if sessions.contains_key(key) {
            return Err(AgentError::Session(format!("session {key} already exists")));
        }

        let session = Session::new(key.clone());
        sessions.insert(key.clone(), session.clone());
        tracing::debug!(session = %key, "Created session");
        Ok(session)
    }

    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(key).cloned())
    }

    async fn append_event(&self, key: &SessionKey, event: Event) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| AgentError::SessionNotFound(key.to_string()))?;
        session.events.push(event);
        session.touch();
        Ok(())
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.remove(key);
        Ok(())
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        let mut result: Vec<_> = sessions
            .values()
            .filter(|s| s.key.app_name == app_name && s.key.user_id == user_id)
            .cloned()
            .collect();

        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SessionKey {
        SessionKey::new("app", "user", "s1")
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let store = InMemorySessionService::new();
        store.create_session(&key()).await.unwrap();

        let loaded = store.get_session(&key()).await.unwrap();
        assert_eq!(loaded.unwrap().key, key());
        assert!(store
            .get_session(&SessionKey::new("app", "user", "other"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = InMemorySessionService::new();
        store.create_session(&key()).await.unwrap();
        assert!(matches!(
            store.create_session(&key()).await,
            Err(AgentError::Session(_))
        ));
    }

    #[tokio::test]
    async fn test_append_requires_session() {
        let store = InMemorySessionService::new();
        let event = Event::user("inv", Content::user("hi"));
        assert!(matches!(
            store.append_event(&key(), event.clone()).await,
            Err(AgentError::SessionNotFound(_))
        ));

        store.create_session(&key()).await.unwrap();
        store.append_event(&key(), event).await.unwrap();
        assert_eq!(store.get_session(&key()).await.unwrap().unwrap().event_count(), 1);

        store.delete_session(&key()).await.unwrap();
        assert!(store.list_sessions("app", "user").await.unwrap().is_empty());
    }

    #[test]
    fn test_history_skips_partials_and_thoughts() {
        use crate::message::{Part, Role};

        let mut session = Session::new(key());
        session.events.push(Event::user("inv", Content::user("Where is the Louvre?")));

        let mut partial = Event::new("inv", "agent");
        partial.content = Some(Content::model("Rue"));
        partial.partial = true;
        session.events.push(partial);

        let mut done = Event::new("inv", "agent");
        done.content = Some(Content::new(
            Role::Model,
            vec![Part::thought("plan"), Part::text("Rue de Rivoli, Paris.")],
        ));
        session.events.push(done);

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text(), "Rue de Rivoli, Paris.");
        assert!(history[1].thoughts().is_none());
    }
}

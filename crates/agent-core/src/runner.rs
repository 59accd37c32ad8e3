//! Runner
//!
//! Drives one agent turn per `run` call: records the user message in the
//! session, calls the provider once, and yields the resulting events.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::agent::Agent;
use crate::error::{AgentError, Result};
use crate::event::Event;
use crate::message::{Content, Coordinates, Part, Role};
use crate::provider::{GroundingMetadata, LlmResponse};
use crate::session::{SessionKey, SessionService};

/// Capacity of the per-turn event channel
const EVENT_BUFFER: usize = 64;

/// Stream of events produced by one turn
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Event>> + Send>>;

/// How the provider is called
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingMode {
    /// One complete response per turn
    #[default]
    None,
    /// Server-sent events: partial chunks, then an aggregated final event
    Sse,
}

/// Per-call options
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    pub streaming: StreamingMode,

    /// Retrieval hint forwarded to location-aware grounding tools
    pub location: Option<Coordinates>,
}

/// Executes an agent against sessions from a session service
#[derive(Clone)]
pub struct Runner {
    app_name: String,
    agent: Arc<Agent>,
    sessions: Arc<dyn SessionService>,
}

impl Runner {
    pub fn new(
        app_name: impl Into<String>,
        agent: Arc<Agent>,
        sessions: Arc<dyn SessionService>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            agent,
            sessions,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn sessions(&self) -> &Arc<dyn SessionService> {
        &self.sessions
    }

    /// Submit `new_message` to an existing session.
    ///
    /// The session must already exist; a missing session is reported here
    /// rather than through the stream. Remote failures arrive as an `Err`
    /// item and end the stream. Dropping the stream during a streamed turn
    /// stops reading the provider; whatever arrived so far is stored as the
    /// model's answer.
    pub async fn run(
        &self,
        user_id: &str,
        session_id: &str,
        new_message: Content,
        config: RunConfig,
    ) -> Result<EventStream> {
        let key = SessionKey::new(&self.app_name, user_id, session_id);
        if self.sessions.get_session(&key).await?.is_none() {
            return Err(AgentError::SessionNotFound(key.to_string()));
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let runner = self.clone();

        tokio::spawn(async move {
            if let Err(e) = runner.run_turn(&key, new_message, &config, &tx).await {
                tracing::debug!(session = %key, error = %e, "Turn failed");
                let _ = tx.send(Err(e)).await;
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn run_turn(
        &self,
        key: &SessionKey,
        new_message: Content,
        config: &RunConfig,
        tx: &mpsc::Sender<Result<Event>>,
    ) -> Result<()> {
        let invocation_id = Uuid::new_v4().to_string();
        let author = self.agent.name().to_string();

        self.sessions
            .append_event(key, Event::user(&invocation_id, new_message))
            .await?;

        let session = self
            .sessions
            .get_session(key)
            .await?
            .ok_or_else(|| AgentError::SessionNotFound(key.to_string()))?;

        let request = self
            .agent
            .config()
            .build_request(session.history(), config.location);
        let provider = self.agent.provider();

        tracing::debug!(
            session = %key,
            invocation = %invocation_id,
            model = %request.model,
            turns = request.contents.len(),
            streaming = ?config.streaming,
            "Running agent turn"
        );

        let response = match config.streaming {
            StreamingMode::None => {
                let mut response = provider.generate(&request).await?;
                response.partial = false;
                response
            }
            StreamingMode::Sse => {
                let mut stream = provider.generate_stream(&request).await?;
                let mut aggregate = ResponseAggregator::new(&request.model);

                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    aggregate.push(&chunk);

                    if chunk.content.is_none() {
                        continue;
                    }
                    let mut event = Event::from_response(&invocation_id, &author, chunk);
                    event.partial = true;
                    if tx.send(Ok(event)).await.is_err() {
                        // History must keep alternating user and model turns
                        tracing::debug!(
                            session = %key,
                            invocation = %invocation_id,
                            "Event stream dropped mid-turn; keeping the partial answer"
                        );
                        break;
                    }
                }

                aggregate.finish()
            }
        };

        let final_event = Event::from_response(&invocation_id, &author, response);
        self.sessions.append_event(key, final_event.clone()).await?;
        let _ = tx.send(Ok(final_event)).await;

        Ok(())
    }
}

/// Folds streamed chunks into one complete response
struct ResponseAggregator {
    model: String,
    parts: Vec<Part>,
    last: Option<LlmResponse>,
    grounding: GroundingMetadata,
}

impl ResponseAggregator {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            parts: Vec::new(),
            last: None,
            grounding: GroundingMetadata::default(),
        }
    }

    fn push(&mut self, chunk: &LlmResponse) {
        if let Some(content) = &chunk.content {
            for part in &content.parts {
                match self.parts.last_mut() {
                    Some(prev) if prev.thought == part.thought => prev.text.push_str(&part.text),
                    _ => self.parts.push(part.clone()),
                }
            }
        }

        if let Some(grounding) = &chunk.grounding {
            self.grounding.sources.extend(grounding.sources.iter().cloned());
            if grounding.widget_context_token.is_some() {
                self.grounding
                    .widget_context_token
                    .clone_from(&grounding.widget_context_token);
            }
        }

        self.last = Some(chunk.clone());
    }

    fn finish(self) -> LlmResponse {
        let last = self.last;
        LlmResponse {
            content: (!self.parts.is_empty()).then(|| Content::new(Role::Model, self.parts)),
            model: last.as_ref().map_or(self.model, |l| l.model.clone()),
            usage: last.as_ref().and_then(|l| l.usage.clone()),
            finish_reason: last.and_then(|l| l.finish_reason),
            grounding: (!self.grounding.is_empty()).then_some(self.grounding),
            partial: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentBuilder;
    use crate::planner::BuiltInPlanner;
    use crate::provider::{
        GroundingSource, LlmProvider, LlmRequest, ProviderInfo, ResponseStream, TokenUsage,
    };
    use crate::session::InMemorySessionService;
    use crate::tool::ToolReference;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with fixed chunks and records every request
    struct ScriptedProvider {
        chunks: Vec<&'static str>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedProvider {
        fn new(chunks: Vec<&'static str>) -> Self {
            Self {
                chunks,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "scripted".into(),
                endpoint: "memory".into(),
                supports_streaming: true,
            }
        }

        async fn health_check(&self, _model: &str) -> Result<bool> {
            Ok(true)
        }

        async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(LlmResponse::text(&request.model, self.chunks.concat()))
        }

        async fn generate_stream(&self, request: &LlmRequest) -> Result<ResponseStream> {
            self.requests.lock().unwrap().push(request.clone());
            let model = request.model.clone();
            let chunks: Vec<Result<LlmResponse>> = self
                .chunks
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    let mut chunk = LlmResponse::text(&model, *text);
                    chunk.partial = true;
                    chunk.finish_reason = None;
                    if i == 0 {
                        chunk.grounding = Some(GroundingMetadata {
                            sources: vec![GroundingSource {
                                title: Some("Louvre Museum".into()),
                                ..Default::default()
                            }],
                            widget_context_token: None,
                        });
                    }
                    chunk.usage = Some(TokenUsage {
                        total_tokens: 10,
                        ..Default::default()
                    });
                    Ok(chunk)
                })
                .collect();
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }

    /// Streams one chunk, then holds the next until released
    struct GatedProvider {
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl LlmProvider for GatedProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "gated".into(),
                endpoint: "memory".into(),
                supports_streaming: true,
            }
        }

        async fn health_check(&self, _model: &str) -> Result<bool> {
            Ok(true)
        }

        async fn generate(&self, _request: &LlmRequest) -> Result<LlmResponse> {
            Err(AgentError::Provider("streaming only".into()))
        }

        async fn generate_stream(&self, request: &LlmRequest) -> Result<ResponseStream> {
            let first = LlmResponse::text(&request.model, "Take ");
            let second = LlmResponse::text(&request.model, "the metro.");
            let release = self.release.clone();

            let stream = futures::stream::once(async move { Ok(first) }).chain(
                futures::stream::once(async move {
                    release.notified().await;
                    Ok(second)
                }),
            );
            Ok(Box::pin(stream))
        }
    }

    async fn runner(provider: Arc<dyn LlmProvider>) -> Runner {
        let config = AgentBuilder::new("maps_helper")
            .model("gemini-2.5-flash")
            .instruction("Use the maps tool.")
            .tool(ToolReference::google_maps())
            .planner(BuiltInPlanner::with_thoughts())
            .build()
            .unwrap();
        let agent = Arc::new(Agent::new(provider, config).unwrap());
        let sessions = Arc::new(InMemorySessionService::new());
        sessions
            .create_session(&SessionKey::new("app", "u", "s"))
            .await
            .unwrap();
        Runner::new("app", agent, sessions)
    }

    async fn collect(stream: EventStream) -> Vec<Event> {
        stream.map(|e| e.unwrap()).collect().await
    }

    #[tokio::test]
    async fn test_single_final_event() {
        let provider = Arc::new(ScriptedProvider::new(vec!["Walk along the Seine."]));
        let runner = runner(provider.clone()).await;

        let events = collect(
            runner
                .run("u", "s", Content::user("Eiffel Tower to Louvre?"), RunConfig::default())
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(events.len(), 1);
        assert!(events[0].is_final_response());
        assert_eq!(events[0].author, "maps_helper");
        assert_eq!(events[0].text().as_deref(), Some("Walk along the Seine."));

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].contents, vec![Content::user("Eiffel Tower to Louvre?")]);
    }

    #[tokio::test]
    async fn test_streaming_yields_partials_then_final() {
        let provider = Arc::new(ScriptedProvider::new(vec!["Take ", "the ", "metro."]));
        let runner = runner(provider).await;

        let config = RunConfig {
            streaming: StreamingMode::Sse,
            location: None,
        };
        let events = collect(runner.run("u", "s", Content::user("How?"), config).await.unwrap()).await;

        assert_eq!(events.len(), 4);
        assert!(events[..3].iter().all(|e| e.partial));
        let last = events.last().unwrap();
        assert!(last.is_final_response());
        assert_eq!(last.text().as_deref(), Some("Take the metro."));
        assert_eq!(last.grounding.as_ref().unwrap().sources.len(), 1);
        assert_eq!(last.usage.as_ref().unwrap().total_tokens, 10);

        let session = runner
            .sessions()
            .get_session(&SessionKey::new("app", "u", "s"))
            .await
            .unwrap()
            .unwrap();
        // user event + aggregated final event; partials are not persisted
        assert_eq!(session.event_count(), 2);
    }

    #[tokio::test]
    async fn test_history_carries_over_between_turns() {
        let provider = Arc::new(ScriptedProvider::new(vec!["Sure."]));
        let runner = runner(provider.clone()).await;

        for question in ["First?", "Second?"] {
            collect(
                runner
                    .run("u", "s", Content::user(question), RunConfig::default())
                    .await
                    .unwrap(),
            )
            .await;
        }

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[1].contents.len(), 3);
        assert_eq!(requests[1].contents[1], Content::model("Sure."));
    }

    #[tokio::test]
    async fn test_missing_session_is_an_error() {
        let runner = runner(Arc::new(ScriptedProvider::new(vec!["x"]))).await;
        let result = runner
            .run("u", "nope", Content::user("hi"), RunConfig::default())
            .await;
        assert!(matches!(result, Err(AgentError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_dropped_stream_still_records_model_turn() {
        let release = Arc::new(tokio::sync::Notify::new());
        let runner = runner(Arc::new(GatedProvider {
            release: release.clone(),
        }))
        .await;
        let key = SessionKey::new("app", "u", "s");
        let config = RunConfig {
            streaming: StreamingMode::Sse,
            location: None,
        };

        let mut events = runner.run("u", "s", Content::user("How?"), config).await.unwrap();
        assert!(events.next().await.unwrap().unwrap().partial);
        drop(events);
        release.notify_one();

        let mut session = runner.sessions().get_session(&key).await.unwrap().unwrap();
        for _ in 0..1000 {
            if session.event_count() == 2 {
                break;
            }
            tokio::task::yield_now().await;
            session = runner.sessions().get_session(&key).await.unwrap().unwrap();
        }

        assert_eq!(
            session.history(),
            vec![Content::user("How?"), Content::model("Take the metro.")]
        );
    }

    #[test]
    fn test_aggregator_merges_thoughts_separately() {
        let mut aggregate = ResponseAggregator::new("gemini-2.5-flash");
        for part in [Part::thought("a"), Part::thought("b"), Part::text("c"), Part::text("d")] {
            aggregate.push(&LlmResponse {
                content: Some(Content::new(Role::Model, vec![part])),
                model: "gemini-2.5-flash".into(),
                usage: None,
                finish_reason: None,
                grounding: None,
                partial: true,
            });
        }

        let response = aggregate.finish();
        let content = response.content.unwrap();
        assert_eq!(content.parts, vec![Part::thought("ab"), Part::text("cd")]);
        assert!(!response.partial);
    }
}

//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` over the Gemini REST API. Hosted tools
//! such as Google Maps grounding run on Google's side; this provider only
//! declares them in the request and surfaces the grounding metadata.

mod config;
mod types;

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    provider::{LlmProvider, LlmRequest, LlmResponse, ProviderInfo, ResponseStream},
};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use google_cloud_auth::credentials::{self, CacheableResource, Credentials};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

pub use config::{Backend, GeminiConfig};
use types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Gemini LLM provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    /// Application Default Credentials, for Vertex AI without a fixed token
    credentials: Option<Credentials>,
}

impl GeminiProvider {
    /// Create from configuration.
    ///
    /// Vertex AI without a fixed access token loads Application Default
    /// Credentials here, so a missing credential setup fails before any call.
    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {e}")))?;

        let credentials = match &config.backend {
            Backend::VertexAi {
                access_token: None, ..
            } => Some(
                credentials::Builder::default()
                    .build()
                    .map_err(|e| AgentError::Config(format!("Google Cloud credentials: {e}")))?,
            ),
            _ => None,
        };

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(GeminiConfig::from_env()?)
    }

    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn model_url(&self, model: &str, method: Option<&str>) -> String {
        // Accept full resource names as well as bare ids
        let id = model.rsplit('/').next().unwrap_or(model);
        let base = self.config.endpoint();
        match method {
            Some(method) => format!("{base}/models/{id}:{method}"),
            None => format!("{base}/models/{id}"),
        }
    }

    async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        match (&self.config.backend, &self.credentials) {
            (Backend::AiStudio { api_key }, _) => Ok(builder.header("x-goog-api-key", api_key)),
            (
                Backend::VertexAi {
                    access_token: Some(token),
                    ..
                },
                _,
            ) => Ok(builder.bearer_auth(token)),
            (Backend::VertexAi { .. }, Some(credentials)) => {
                // Tokens are cached and refreshed by the credentials object
                let headers = match credentials
                    .headers(Default::default())
                    .await
                    .map_err(|e| AgentError::Auth(format!("Google Cloud credentials: {e}")))?
                {
                    CacheableResource::New { data, .. } => data,
                    CacheableResource::NotModified => {
                        return Err(AgentError::Auth(
                            "Google Cloud credentials returned no headers".into(),
                        ));
                    }
                };
                Ok(builder.headers(headers))
            }
            (Backend::VertexAi { .. }, None) => Err(AgentError::Config(
                "Vertex AI needs an access token or Application Default Credentials".into(),
            )),
        }
    }

    /// Map non-success statuses onto agent errors
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| match e.error.status {
                Some(code) => format!("{code}: {}", e.error.message),
                None => e.error.message,
            })
            .unwrap_or(body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(message),
            s if s.is_server_error() => AgentError::ProviderUnavailable(message),
            s => AgentError::Http {
                status: s.as_u16(),
                message,
            },
        })
    }

    async fn post(&self, url: &str, request: &LlmRequest) -> Result<Response> {
        let body = GenerateContentRequest::from(request);

        tracing::debug!(url, model = %request.model, tools = request.tools.len(), "Gemini request");

        let response = self
            .authorize(self.client.post(url))
            .await?
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        Self::check_response(response).await
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: self.config.backend_name().into(),
            endpoint: self.config.endpoint(),
            supports_streaming: true,
        }
    }

    async fn health_check(&self, model: &str) -> Result<bool> {
        let url = self.model_url(model, None);
        let request = match self.authorize(self.client.get(&url)).await {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                return Ok(false);
            }
        };
        let result = request.send().await;

        match result {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                tracing::warn!("Gemini health check failed: HTTP {}", response.status());
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let url = self.model_url(&request.model, Some("generateContent"));
        let response = self.post(&url, request).await?;

        let wire: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;

        wire.into_llm_response(&request.model, false)
    }

    async fn generate_stream(&self, request: &LlmRequest) -> Result<ResponseStream> {
        let url = self.model_url(&request.model, Some("streamGenerateContent?alt=sse"));
        let response = self.post(&url, request).await?;
        let model = request.model.clone();

        let stream = response
            .bytes_stream()
            .eventsource()
            .filter(|event| {
                // Comment-only and keep-alive events carry no payload
                futures::future::ready(!matches!(event, Ok(e) if e.data.trim().is_empty()))
            })
            .map(move |event| {
                let event = event.map_err(|e| AgentError::Provider(format!("stream error: {e}")))?;
                let wire: GenerateContentResponse = serde_json::from_str(&event.data)
                    .map_err(|e| AgentError::Parse(format!("bad stream chunk: {e}")))?;
                wire.into_llm_response(&model, true)
            });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{
        message::Content,
        planner::BuiltInPlanner,
        tool::ToolReference,
    };
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::from_config(GeminiConfig::ai_studio("test-key").with_base_url(server.uri()))
            .unwrap()
    }

    fn maps_request() -> LlmRequest {
        let mut request = LlmRequest::new(
            "gemini-2.5-flash",
            vec![Content::user("What restaurants are near Times Square?")],
        );
        request.tools = vec![ToolReference::google_maps()];
        BuiltInPlanner::with_thoughts().apply(&mut request.generation);
        request
    }

    #[test]
    fn test_model_url() {
        let provider =
            GeminiProvider::from_config(GeminiConfig::ai_studio("k")).unwrap();
        assert_eq!(
            provider.model_url("gemini-2.5-flash", Some("generateContent")),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            provider.model_url("publishers/google/models/gemini-2.5-flash", None),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash"
        );
    }

    #[tokio::test]
    async fn test_generate_sends_maps_tool() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "tools": [{"googleMaps": {}}],
                "generationConfig": {"thinkingConfig": {"includeThoughts": true}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "According to Google Maps, try Carmine's."}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server).generate(&maps_request()).await.unwrap();
        assert_eq!(
            response.content.unwrap().text(),
            "According to Google Maps, try Carmine's."
        );
        assert!(!response.partial);
    }

    #[tokio::test]
    async fn test_generate_stream() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Try \"}]}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Carmine's.\"}]},\"finishReason\":\"STOP\"}]}\r\n\r\n",
        );
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let chunks: Vec<LlmResponse> = provider(&server)
            .generate_stream(&maps_request())
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.partial));
        assert_eq!(chunks[1].content.as_ref().unwrap().text(), "Carmine's.");
    }

    #[tokio::test]
    async fn test_generate_stream_multiline_data() {
        let server = MockServer::start().await;
        // One event split over two data lines, then a keep-alive comment
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\n",
            "data: \"parts\":[{\"text\":\"Take the metro.\"}]}}]}\r\n\r\n",
            ": keep-alive\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:streamGenerateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let chunks: Vec<Result<LlmResponse>> = provider(&server)
            .generate_stream(&maps_request())
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(chunks.len(), 1);
        let chunk = chunks.into_iter().next().unwrap().unwrap();
        assert_eq!(chunk.content.unwrap().text(), "Take the metro.");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server).generate(&maps_request()).await.unwrap_err();
        match err {
            AgentError::Auth(message) => assert!(message.contains("API key not valid")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider(&server).generate(&maps_request()).await.unwrap_err();
        assert!(matches!(err, AgentError::ProviderUnavailable(m) if m == "overloaded"));
    }

    #[tokio::test]
    async fn test_vertex_static_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("authorization", "Bearer vertex-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Near the Louvre."}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = GeminiConfig::vertex_ai("p", "us-central1")
            .with_access_token("vertex-token")
            .with_base_url(server.uri());
        let provider = GeminiProvider::from_config(config).unwrap();
        assert!(provider.credentials.is_none());

        let response = provider.generate(&maps_request()).await.unwrap();
        assert_eq!(response.content.unwrap().text(), "Near the Louvre.");
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models/gemini-2.5-flash"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "models/gemini-2.5-flash"})))
            .mount(&server)
            .await;

        let provider = provider(&server);
        assert!(provider.health_check("gemini-2.5-flash").await.unwrap());
        assert!(!provider.health_check("gemini-9").await.unwrap());
    }
}

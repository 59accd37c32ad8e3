//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for model backends so the runner never depends
//! on a specific service. The Gemini implementation lives in `agent-runtime`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{LlmProvider, LlmRequest};
//!
//! let provider = GeminiProvider::from_env()?;
//! let response = provider.generate(&request).await?;
//! ```

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;
use crate::message::{Content, Coordinates};
use crate::planner::ThinkingConfig;
use crate::tool::ToolReference;

/// Sampling and thinking options for a generation call.
///
/// Unset fields are left to the service defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for sampling (0.0 = deterministic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p nucleus sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Thinking settings, installed by the planner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,
}

/// A single generation request assembled by the runner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,

    /// System instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    /// Conversation so far, oldest first, ending with the new user turn
    pub contents: Vec<Content>,

    /// Hosted tools the model may use
    #[serde(default)]
    pub tools: Vec<ToolReference>,

    /// Retrieval hint for location-aware grounding tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,

    #[serde(default)]
    pub generation: GenerationOptions,
}

impl LlmRequest {
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            contents,
            tools: Vec::new(),
            location: None,
            generation: GenerationOptions::default(),
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    #[serde(default)]
    pub thoughts_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Other(String),
}

/// A source the model's answer was grounded on
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Maps place identifier, for Maps-grounded sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

/// Grounding attribution returned with a response
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingMetadata {
    #[serde(default)]
    pub sources: Vec<GroundingSource>,

    /// Context token for rendering the Maps widget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_context_token: Option<String>,
}

impl GroundingMetadata {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.widget_context_token.is_none()
    }
}

/// Response (or streamed chunk) from a provider
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated content (absent for empty or blocked candidates)
    pub content: Option<Content>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason (typically only on the last chunk)
    pub finish_reason: Option<FinishReason>,

    /// Grounding attribution (if the model used a grounding tool)
    pub grounding: Option<GroundingMetadata>,

    /// Whether this is an incremental chunk of a streamed response
    pub partial: bool,
}

impl LlmResponse {
    /// A complete, single-part text response
    pub fn text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            content: Some(Content::model(text)),
            model: model.into(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
            grounding: None,
            partial: false,
        }
    }
}

/// Stream type for streamed generation
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<LlmResponse>> + Send>>;

/// Provider metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "Gemini (AI Studio)")
    pub name: String,

    /// Base endpoint requests are sent to
    pub endpoint: String,

    /// Whether streaming is supported
    pub supports_streaming: bool,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new model backends.
/// The runner works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get provider information and capabilities
    fn info(&self) -> ProviderInfo;

    /// Check if the provider is reachable and can serve `model`
    async fn health_check(&self, model: &str) -> Result<bool>;

    /// Generate a complete response
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse>;

    /// Generate a streamed response; every item has `partial == true`
    async fn generate_stream(&self, request: &LlmRequest) -> Result<ResponseStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.temperature, None);
        assert_eq!(opts.max_output_tokens, None);
        assert!(opts.thinking.is_none());
    }

    #[test]
    fn test_text_response() {
        let response = LlmResponse::text("gemini-2.5-flash", "Hello");
        assert!(!response.partial);
        assert_eq!(response.content.unwrap().text(), "Hello");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    }
}

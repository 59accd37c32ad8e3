//! Gemini `generateContent` wire format and conversions.

use agent_core::{
    error::{AgentError, Result},
    message::{Content, Part, Role},
    provider::{
        FinishReason, GenerationOptions, GroundingMetadata, GroundingSource, LlmRequest,
        LlmResponse, TokenUsage,
    },
    tool::ToolReference,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<WireContent>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<WireContent>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<GoogleMaps>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleMaps {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enable_widget: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Debug, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<WireThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireThinkingConfig {
    pub include_thoughts: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<i32>,
}

impl From<&Content> for WireContent {
    fn from(content: &Content) -> Self {
        Self {
            role: Some(content.role.to_string()),
            parts: content
                .parts
                .iter()
                .map(|p| WirePart {
                    text: Some(p.text.clone()),
                    thought: p.thought,
                })
                .collect(),
        }
    }
}

impl From<&ToolReference> for WireTool {
    fn from(tool: &ToolReference) -> Self {
        match tool {
            ToolReference::GoogleMaps { enable_widget } => Self {
                google_maps: Some(GoogleMaps {
                    enable_widget: *enable_widget,
                }),
                ..Default::default()
            },
            ToolReference::GoogleSearch => Self {
                google_search: Some(GoogleSearch {}),
                ..Default::default()
            },
        }
    }
}

fn generation_config(opts: &GenerationOptions) -> Option<GenerationConfig> {
    if *opts == GenerationOptions::default() {
        return None;
    }

    Some(GenerationConfig {
        temperature: opts.temperature,
        top_p: opts.top_p,
        max_output_tokens: opts.max_output_tokens,
        thinking_config: opts.thinking.as_ref().map(|t| WireThinkingConfig {
            include_thoughts: t.include_thoughts,
            thinking_budget: t.thinking_budget,
        }),
    })
}

impl From<&LlmRequest> for GenerateContentRequest {
    fn from(request: &LlmRequest) -> Self {
        Self {
            contents: request.contents.iter().map(WireContent::from).collect(),
            system_instruction: request.system_instruction.as_ref().map(|text| WireContent {
                role: None,
                parts: vec![WirePart {
                    text: Some(text.clone()),
                    thought: false,
                }],
            }),
            tools: request.tools.iter().map(WireTool::from).collect(),
            tool_config: request.location.map(|c| ToolConfig {
                retrieval_config: RetrievalConfig {
                    lat_lng: LatLng {
                        latitude: c.latitude,
                        longitude: c.longitude,
                    },
                },
            }),
            generation_config: generation_config(&request.generation),
        }
    }
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    pub usage_metadata: Option<UsageMetadata>,

    pub model_version: Option<String>,

    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<WireContent>,
    pub finish_reason: Option<String>,
    pub grounding_metadata: Option<WireGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub thoughts_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,

    pub google_maps_widget_context_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
    pub maps: Option<MapsChunk>,
}

#[derive(Debug, Deserialize)]
pub struct WebChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
    pub place_id: Option<String>,
}

/// Error envelope returned with non-success statuses
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

fn finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            FinishReason::ContentFilter
        }
        other => FinishReason::Other(other.to_string()),
    }
}

impl From<WireGroundingMetadata> for GroundingMetadata {
    fn from(wire: WireGroundingMetadata) -> Self {
        let sources = wire
            .grounding_chunks
            .into_iter()
            .filter_map(|chunk| match (chunk.maps, chunk.web) {
                (Some(maps), _) => Some(GroundingSource {
                    uri: maps.uri,
                    title: maps.title,
                    place_id: maps.place_id,
                }),
                (None, Some(web)) => Some(GroundingSource {
                    uri: web.uri,
                    title: web.title,
                    place_id: None,
                }),
                (None, None) => None,
            })
            .collect();

        Self {
            sources,
            widget_context_token: wire.google_maps_widget_context_token,
        }
    }
}

impl GenerateContentResponse {
    /// Convert the first candidate into a provider response
    pub fn into_llm_response(self, model: &str, partial: bool) -> Result<LlmResponse> {
        let Self {
            candidates,
            usage_metadata,
            model_version,
            prompt_feedback,
        } = self;

        let candidate = candidates.into_iter().next();

        if candidate.is_none() {
            if let Some(reason) = prompt_feedback.and_then(|f| f.block_reason) {
                return Err(AgentError::Provider(format!("prompt blocked: {reason}")));
            }
        }

        let (content, finish, grounding) = candidate.map_or((None, None, None), |c| {
            let content = c.content.map(|wire| {
                let parts: Vec<Part> = wire
                    .parts
                    .into_iter()
                    .filter_map(|p| {
                        p.text.map(|text| Part {
                            text,
                            thought: p.thought,
                        })
                    })
                    .collect();
                Content::new(Role::Model, parts)
            });
            (
                content.filter(|c| !c.parts.is_empty()),
                c.finish_reason.as_deref().map(finish_reason),
                c.grounding_metadata.map(GroundingMetadata::from),
            )
        });

        Ok(LlmResponse {
            content,
            model: model_version.unwrap_or_else(|| model.to_string()),
            usage: usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                thoughts_tokens: u.thoughts_token_count,
                total_tokens: u.total_token_count,
            }),
            finish_reason: finish,
            grounding,
            partial,
        })
    }
}

//! Gemini provider configuration

use agent_core::error::{AgentError, Result};

const AI_STUDIO_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_VERTEX_LOCATION: &str = "us-central1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which Google endpoint serves the model
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Gemini Developer API, keyed by an API key
    AiStudio { api_key: String },

    /// Vertex AI. Authorized through Application Default Credentials
    /// unless a static access token is given.
    VertexAi {
        project: String,
        location: String,
        access_token: Option<String>,
    },
}

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub backend: Backend,

    /// Override for the models endpoint (proxies, tests)
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn ai_studio(api_key: impl Into<String>) -> Self {
        Self {
            backend: Backend::AiStudio {
                api_key: api_key.into(),
            },
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn vertex_ai(project: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            backend: Backend::VertexAi {
                project: project.into(),
                location: location.into(),
                access_token: None,
            },
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Use a fixed bearer token instead of Application Default Credentials.
    /// No effect on the AI Studio backend.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        if let Backend::VertexAi { access_token, .. } = &mut self.backend {
            *access_token = Some(token.into());
        }
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`.
    ///
    /// `GOOGLE_GENAI_USE_VERTEXAI=true` (or `1`) selects Vertex AI, which
    /// needs `GOOGLE_CLOUD_PROJECT`; `GOOGLE_CLOUD_ACCESS_TOKEN` optionally
    /// overrides Application Default Credentials. Otherwise
    /// `GOOGLE_API_KEY` or `GEMINI_API_KEY` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let use_vertex = var("GOOGLE_GENAI_USE_VERTEXAI")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"));

        let mut config = if use_vertex {
            let project = var("GOOGLE_CLOUD_PROJECT").ok_or_else(|| {
                AgentError::Config("GOOGLE_CLOUD_PROJECT must be set for Vertex AI".into())
            })?;
            let location =
                var("GOOGLE_CLOUD_LOCATION").unwrap_or_else(|| DEFAULT_VERTEX_LOCATION.into());
            let config = Self::vertex_ai(project, location);
            match var("GOOGLE_CLOUD_ACCESS_TOKEN") {
                Some(token) => config.with_access_token(token),
                None => config,
            }
        } else {
            let api_key = var("GOOGLE_API_KEY")
                .or_else(|| var("GEMINI_API_KEY"))
                .ok_or_else(|| {
                    AgentError::Config(
                        "GOOGLE_API_KEY (or GEMINI_API_KEY) must be set, \
                         or set GOOGLE_GENAI_USE_VERTEXAI=true"
                            .into(),
                    )
                })?;
            Self::ai_studio(api_key)
        };

        config.base_url = var("GEMINI_BASE_URL");
        if let Some(timeout) = var("GEMINI_TIMEOUT_SECS") {
            config.timeout_secs = timeout.trim().parse().map_err(|_| {
                AgentError::Config(format!("GEMINI_TIMEOUT_SECS is not a number: {timeout}"))
            })?;
        }

        Ok(config)
    }

    /// Base URL that `models/{model}:{method}` is appended to
    pub fn endpoint(&self) -> String {
        if let Some(base) = &self.base_url {
            return base.trim_end_matches('/').to_string();
        }

        match &self.backend {
            Backend::AiStudio { .. } => AI_STUDIO_BASE_URL.into(),
            Backend::VertexAi {
                project, location, ..
            } => {
                let host = if location == "global" {
                    "aiplatform.googleapis.com".to_string()
                } else {
                    format!("{location}-aiplatform.googleapis.com")
                };
                format!("https://{host}/v1/projects/{project}/locations/{location}/publishers/google")
            }
        }
    }

    pub const fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::AiStudio { .. } => "Gemini (AI Studio)",
            Backend::VertexAi { .. } => "Gemini (Vertex AI)",
        }
    }
}

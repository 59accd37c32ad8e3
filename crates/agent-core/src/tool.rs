//! Hosted Tool References
//!
//! Grounding tools are executed by the model service itself. The agent only
//! declares which ones the model may use; nothing here runs locally.

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// A built-in, service-side tool the model may call during generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolReference {
    /// Google Maps grounding: places, businesses, directions, reviews
    GoogleMaps {
        /// Ask the service for a context token usable by the Maps widget
        #[serde(default)]
        enable_widget: bool,
    },
    /// Google Search grounding
    GoogleSearch,
}

impl ToolReference {
    /// Maps grounding with default settings
    pub const fn google_maps() -> Self {
        Self::GoogleMaps {
            enable_widget: false,
        }
    }

    pub const fn google_search() -> Self {
        Self::GoogleSearch
    }

    /// Name the model sees for this tool
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GoogleMaps { .. } => "google_maps",
            Self::GoogleSearch => "google_search",
        }
    }

    /// Check that the hosted tool is offered for `model`.
    ///
    /// Built-in grounding only exists on Gemini models, and not on the 1.x
    /// generation. Accepts bare ids (`gemini-2.5-flash`) as well as resource
    /// paths (`projects/p/locations/l/publishers/google/models/gemini-2.5-flash`).
    pub fn check_model(&self, model: &str) -> Result<()> {
        let id = model.rsplit('/').next().unwrap_or(model);

        if !id.starts_with("gemini-") {
            return Err(AgentError::Config(format!(
                "{} tool is not supported for model {model}",
                self.name()
            )));
        }

        if id.starts_with("gemini-1") {
            return Err(AgentError::Config(format!(
                "{} tool cannot be used with Gemini 1.x models ({model})",
                self.name()
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for ToolReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        assert_eq!(ToolReference::google_maps().name(), "google_maps");
        assert_eq!(ToolReference::google_search().to_string(), "google_search");
    }

    #[test]
    fn test_model_support() {
        let maps = ToolReference::google_maps();
        assert!(maps.check_model("gemini-2.5-flash").is_ok());
        assert!(maps
            .check_model("projects/p/locations/us-central1/publishers/google/models/gemini-2.0-flash")
            .is_ok());
        assert!(matches!(maps.check_model("gemini-1.5-pro"), Err(AgentError::Config(_))));
        assert!(matches!(maps.check_model("llama3.2"), Err(AgentError::Config(_))));
    }
}

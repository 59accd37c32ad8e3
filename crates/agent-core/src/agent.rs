//! Agent Definition
//!
//! An agent is a validated, read-only configuration (model, instruction,
//! hosted tools, planner) bound to the provider that serves it.

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{Content, Coordinates};
use crate::planner::BuiltInPlanner;
use crate::provider::{GenerationOptions, LlmProvider, LlmRequest};
use crate::tool::ToolReference;

/// Agent configuration
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Identifier-style name, used as the author of model events
    pub name: String,

    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,

    /// One-line description of what the agent does
    pub description: String,

    /// System instruction sent with every request
    pub instruction: String,

    /// Hosted tools the model may use
    pub tools: Vec<ToolReference>,

    pub planner: Option<BuiltInPlanner>,

    pub generation: GenerationOptions,

    /// Reject configurations without any tool
    pub require_grounding: bool,
}

impl AgentConfig {
    /// Check every field; fails with `AgentError::Config` on the first problem
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.name) {
            return Err(AgentError::Config(format!(
                "agent name '{}' must be a non-empty identifier",
                self.name
            )));
        }
        if self.name == crate::event::USER_AUTHOR {
            return Err(AgentError::Config("agent name 'user' is reserved".into()));
        }
        if self.model.trim().is_empty() {
            return Err(AgentError::Config("model identifier is required".into()));
        }
        if self.instruction.trim().is_empty() {
            return Err(AgentError::Config("instruction must not be empty".into()));
        }
        if self.require_grounding && self.tools.is_empty() {
            return Err(AgentError::Config(
                "grounding is required but no tool is configured".into(),
            ));
        }

        for (i, tool) in self.tools.iter().enumerate() {
            if self.tools[..i].iter().any(|t| t.name() == tool.name()) {
                return Err(AgentError::Config(format!("tool '{tool}' is listed twice")));
            }
            tool.check_model(&self.model)?;
        }

        Ok(())
    }

    /// Build the request for one turn from the session history
    pub fn build_request(&self, contents: Vec<Content>, location: Option<Coordinates>) -> LlmRequest {
        let mut generation = self.generation.clone();
        if let Some(planner) = &self.planner {
            planner.apply(&mut generation);
        }

        LlmRequest {
            model: self.model.clone(),
            system_instruction: Some(self.instruction.clone()),
            contents,
            tools: self.tools.clone(),
            location,
            generation,
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A configured agent bound to its provider
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl Agent {
    /// Bind a configuration to a provider, validating it first
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for agent configuration
pub struct AgentBuilder {
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: AgentConfig {
                name: name.into(),
                model: String::new(),
                description: String::new(),
                instruction: String::new(),
                tools: Vec::new(),
                planner: None,
                generation: GenerationOptions::default(),
                require_grounding: false,
            },
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.description = description.into();
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.instruction = instruction.into();
        self
    }

    pub fn tool(mut self, tool: ToolReference) -> Self {
        self.config.tools.push(tool);
        self
    }

    pub fn planner(mut self, planner: BuiltInPlanner) -> Self {
        self.config.planner = Some(planner);
        self
    }

    pub fn require_grounding(mut self, required: bool) -> Self {
        self.config.require_grounding = required;
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = Some(temp);
        self
    }

    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.config.generation.max_output_tokens = Some(max);
        self
    }

    pub fn build(self) -> Result<AgentConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> AgentBuilder {
        AgentBuilder::new("maps_helper")
            .model("gemini-2.5-flash")
            .instruction("Use the maps tool.")
            .tool(ToolReference::google_maps())
            .require_grounding(true)
    }

    #[test]
    fn test_valid_config() {
        let config = builder().planner(BuiltInPlanner::with_thoughts()).build().unwrap();
        assert_eq!(config.tools.len(), 1);
    }

    #[test]
    fn test_missing_fields_fail_fast() {
        assert!(matches!(builder().instruction("  ").build(), Err(AgentError::Config(_))));
        assert!(matches!(builder().model("").build(), Err(AgentError::Config(_))));
        assert!(matches!(
            AgentBuilder::new("bad name").model("gemini-2.5-flash").instruction("x").build(),
            Err(AgentError::Config(_))
        ));
        assert!(matches!(
            AgentBuilder::new("user").model("gemini-2.5-flash").instruction("x").build(),
            Err(AgentError::Config(_))
        ));
    }

    #[test]
    fn test_grounding_requires_tool() {
        let result = AgentBuilder::new("maps_helper")
            .model("gemini-2.5-flash")
            .instruction("Use the maps tool.")
            .require_grounding(true)
            .build();
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_duplicate_and_unsupported_tools() {
        assert!(builder().tool(ToolReference::google_maps()).build().is_err());
        assert!(builder().model("gemini-1.5-flash").build().is_err());
    }

    #[test]
    fn test_build_request_applies_planner() {
        let config = builder().planner(BuiltInPlanner::with_thoughts()).build().unwrap();
        let request = config.build_request(vec![Content::user("hi")], Some(Coordinates::new(1.0, 2.0)));

        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.system_instruction.as_deref(), Some("Use the maps tool."));
        assert_eq!(request.tools, vec![ToolReference::google_maps()]);
        assert!(request.generation.thinking.unwrap().include_thoughts);
        assert_eq!(request.location, Some(Coordinates::new(1.0, 2.0)));
    }
}

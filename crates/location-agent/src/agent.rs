//! Location-aware agent definition

use agent_core::{AgentBuilder, AgentConfig, BuiltInPlanner, Result, ToolReference};

pub const AGENT_NAME: &str = "location_aware_assistant";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable that overrides [`DEFAULT_MODEL`]
pub const MODEL_ENV: &str = "LOCATION_AGENT_MODEL";

pub const DESCRIPTION: &str = "A location-aware AI assistant that answers location-based questions. \
You MUST use the google_maps tool to get information about places, businesses, directions, \
and other real-time data. Do not rely on your internal knowledge.";

/// System instruction for the location agent
pub const INSTRUCTION: &str = r"You are a helpful location-aware assistant with access to Google Maps data. **Your primary rule is to ALWAYS use the `google_maps` tool for any location-based questions.** Your internal knowledge is outdated, so you must rely on the tool for accuracy.

You can help users with:

🗺️ **Location Information:**
- Find specific places, addresses, and businesses
- Provide current business hours, reviews, and contact information
- Give directions and navigation help
- Share details about attractions and points of interest

🌍 **Travel & Local Help:**
- Recommend restaurants, hotels, and attractions
- Suggest things to do based on user interests
- Provide local insights and travel tips
- Help with trip planning and itineraries

**Guidelines:**
- **MUST USE TOOL**: For any queries about places, businesses, directions, hours, and other real-time data, you must use the `google_maps` tool. Do not answer from memory.
- **ATTRIBUTE**: Provide proper attribution to Google Maps when using map data (e.g., 'According to Google Maps...').
- **CLARIFY**: Ask for clarification if a user's location or request is unclear.
- **BE HELPFUL**: Be friendly, informative, and focus on providing current, practical information that helps the user.";

/// The location agent, using the model named by `LOCATION_AGENT_MODEL` if set
pub fn root_agent() -> Result<AgentConfig> {
    let model = std::env::var(MODEL_ENV)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.into());
    root_agent_with_model(model)
}

/// The location agent on an explicit model
pub fn root_agent_with_model(model: impl Into<String>) -> Result<AgentConfig> {
    AgentBuilder::new(AGENT_NAME)
        .model(model)
        .description(DESCRIPTION)
        .instruction(INSTRUCTION)
        .tool(ToolReference::google_maps())
        .planner(BuiltInPlanner::with_thoughts())
        .require_grounding(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::AgentError;

    #[test]
    fn test_root_agent_integrity() {
        let agent = root_agent_with_model(DEFAULT_MODEL).unwrap();
        assert_eq!(agent.name, AGENT_NAME);
        assert!(!agent.instruction.trim().is_empty());
        assert!(!agent.tools.is_empty());
        assert_eq!(agent.tools[0], ToolReference::google_maps());
        assert!(agent.planner.as_ref().unwrap().thinking.include_thoughts);
        assert!(agent.require_grounding);
    }

    #[test]
    fn test_instruction_names_the_tool() {
        assert!(INSTRUCTION.contains("`google_maps`"));
        assert!(DESCRIPTION.contains("google_maps"));
    }

    #[test]
    fn test_unsupported_model_fails_at_startup() {
        assert!(matches!(
            root_agent_with_model("gemini-1.5-pro"),
            Err(AgentError::Config(_))
        ));
    }
}

//! Built-in Planner
//!
//! Delegates planning to the model's native thinking mode.

use serde::{Deserialize, Serialize};

use crate::provider::GenerationOptions;

/// Thinking settings forwarded to the model
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingConfig {
    /// Return thought summaries alongside the answer
    #[serde(default)]
    pub include_thoughts: bool,

    /// Token budget for thinking (`None` lets the model decide)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<i32>,
}

/// Planner that relies on the model's own thinking rather than prompting
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltInPlanner {
    pub thinking: ThinkingConfig,
}

impl BuiltInPlanner {
    pub const fn new(thinking: ThinkingConfig) -> Self {
        Self { thinking }
    }

    /// Planner that asks for thought summaries
    pub const fn with_thoughts() -> Self {
        Self::new(ThinkingConfig {
            include_thoughts: true,
            thinking_budget: None,
        })
    }

    /// Install this planner's thinking config on outgoing generation options
    pub fn apply(&self, options: &mut GenerationOptions) {
        options.thinking = Some(self.thinking.clone());
    }
}

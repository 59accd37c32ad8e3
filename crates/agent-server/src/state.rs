//! Application State

use agent_core::Runner;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Runner for the location agent; sessions live in its session service
    pub runner: Runner,
}

impl AppState {
    pub fn new(runner: Runner) -> Self {
        Self { runner }
    }

    pub fn model(&self) -> &str {
        &self.runner.agent().config().model
    }
}

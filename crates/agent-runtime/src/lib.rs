//! # agent-runtime
//!
//! Runtime providers for the location agent.
//!
//! ## Providers
//!
//! - **Gemini** (default): Google's Gemini models through AI Studio or
//!   Vertex AI, including hosted Google Maps grounding
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::GeminiProvider;
//!
//! let provider = Arc::new(GeminiProvider::from_env()?);
//! let agent = Agent::new(provider, config)?;
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{Backend, GeminiConfig, GeminiProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, Content, Event, LlmProvider, Result, Role, Runner, Session, ToolReference,
};

//! # agent-core
//!
//! Core agent types with a provider-agnostic model abstraction and hosted
//! (service-side) grounding tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Runner                              │
//! │  ┌──────────────┐  ┌─────────────────┐  ┌─────────────────┐  │
//! │  │   Session    │  │     Agent       │  │   LlmProvider   │  │
//! │  │   Service    │──│ (config, tools, │──│   (Strategy)    │  │
//! │  │              │  │    planner)     │  │                 │  │
//! │  └──────────────┘  └─────────────────┘  └─────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait keeps the runner independent of the model
//! service; `agent-runtime` supplies the Gemini implementation.

pub mod agent;
pub mod error;
pub mod event;
pub mod message;
pub mod planner;
pub mod provider;
pub mod runner;
pub mod session;
pub mod tool;

pub use agent::{Agent, AgentBuilder, AgentConfig};
pub use error::{AgentError, Result};
pub use event::Event;
pub use message::{Content, Coordinates, Part, Role};
pub use planner::{BuiltInPlanner, ThinkingConfig};
pub use provider::LlmProvider;
pub use runner::{EventStream, RunConfig, Runner, StreamingMode};
pub use session::{InMemorySessionService, Session, SessionKey, SessionService};
pub use tool::ToolReference;

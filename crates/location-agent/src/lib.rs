//! # location-agent
//!
//! A single assistant that answers location questions by delegating to the
//! hosted Google Maps grounding tool. There is no local place logic: the
//! crate is the agent definition plus a small conversation driver.
//!
//! ```text
//! question ──► build_message ──► Runner::run ──► final events ──► answer
//!  (+ lat/lng)   (location note)    (Gemini +        (joined text, or
//!                                    google_maps)     "No response received")
//! ```

pub mod agent;
pub mod driver;

pub use agent::{root_agent, AGENT_NAME, DEFAULT_MODEL};
pub use driver::{ask_agent, build_message, create_agent_runner, AgentSession, NO_RESPONSE};

//! Shared setup for the example drivers.

pub mod drivers;

use std::sync::Arc;

use agent_core::{Coordinates, LlmProvider};
use agent_runtime::GeminiProvider;
use location_agent::{create_agent_runner, root_agent, AgentSession};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load `.env` and install logging.
///
/// Defaults to `warn` so log lines don't interleave with printed answers;
/// set `RUST_LOG=debug` to see request and turn details.
pub fn init() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub use drivers::{quick_start, simple_usage};

/// Gemini provider from the environment plus the location agent, with one
/// session opened
pub async fn connect(app_name: &str, user_id: &str, session_id: &str) -> anyhow::Result<AgentSession> {
    let provider: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::from_env()?);
    connect_with(provider, app_name, user_id, session_id).await
}

/// The location agent over `provider`, with one session opened
pub async fn connect_with(
    provider: Arc<dyn LlmProvider>,
    app_name: &str,
    user_id: &str,
    session_id: &str,
) -> anyhow::Result<AgentSession> {
    tracing::debug!(provider = %provider.info().name, "Provider ready");

    let session = create_agent_runner(provider, root_agent()?, app_name, user_id, session_id).await?;
    Ok(session)
}

/// First `max_chars` characters of `text`
pub fn preview(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

/// Print a section heading followed by an underline
pub fn heading(title: &str, underline: usize) {
    println!("{title}");
    println!("{}", "-".repeat(underline));
}

/// One scripted question for the usage tour
pub struct Example {
    pub title: &'static str,
    pub underline: usize,
    pub question: &'static str,
    /// Shorter form echoed in the transcript
    pub label: &'static str,
    pub location: Option<Coordinates>,
}

/// Questions asked by `simple-usage`, in order
pub const EXAMPLES: &[Example] = &[
    Example {
        title: "1. 🍽️ Finding Restaurants",
        underline: 30,
        question: "What are some good restaurants near Times Square in New York?",
        label: "What are some good restaurants near Times Square in New York?",
        // Times Square
        location: Some(Coordinates::new(40.7580, -73.9855)),
    },
    Example {
        title: "2. ✈️ Travel Recommendations",
        underline: 30,
        question: "I'm visiting Paris for 3 days. What are the must-see attractions and good places to eat?",
        label: "I'm visiting Paris for 3 days. What are the must-see attractions and good places to eat?",
        location: Some(Coordinates::new(48.8566, 2.3522)),
    },
    Example {
        title: "3. 🕐 Local Information",
        underline: 25,
        question: "What time is it in Tokyo right now? Also, what's the weather like there?",
        label: "What time is it in Tokyo right now? Also, what's the weather like there?",
        location: None,
    },
    Example {
        title: "4. 🗺️ Directions and Navigation",
        underline: 35,
        question: "How do I get from the Eiffel Tower to the Louvre Museum in Paris? What's the best way to travel?",
        label: "How do I get from the Eiffel Tower to the Louvre Museum in Paris?",
        // Eiffel Tower
        location: Some(Coordinates::new(48.8584, 2.2945)),
    },
    Example {
        title: "5. 🏨 Hotel and Accommodation",
        underline: 30,
        question: "I need a hotel near Central Park in New York. What are some good options with good reviews?",
        label: "I need a hotel near Central Park in New York. What are some good options?",
        location: Some(Coordinates::new(40.7829, -73.9654)),
    },
    Example {
        title: "6. 📏 Distance and Travel Time",
        underline: 35,
        question: "How far is it from London to Paris? What are the different ways to travel between these cities?",
        label: "How far is it from London to Paris? What are the travel options?",
        location: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("short", 100), "short");
        assert_eq!(preview("abcdef", 3), "abc");
        assert_eq!(preview("🗺️ map", 1), "🗺");
    }

    #[test]
    fn test_examples_table() {
        assert_eq!(EXAMPLES.len(), 6);
        assert_eq!(EXAMPLES.iter().filter(|e| e.location.is_none()).count(), 2);
        assert!(EXAMPLES.iter().all(|e| e.question.starts_with(&e.label[..10])));
    }
}

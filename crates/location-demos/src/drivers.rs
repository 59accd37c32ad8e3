//! The two example drivers.
//!
//! Each driver takes a `connect` step so the whole run, including provider
//! setup, sits inside the single top-level catch. Failures are printed with
//! troubleshooting steps and the driver still returns `Ok(())`.

use std::future::Future;

use location_agent::AgentSession;

use crate::{heading, preview, EXAMPLES};

/// Quick start: two questions to check the agent is configured and reachable
pub async fn quick_start<F, Fut>(connect: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<AgentSession>>,
{
    println!("🚀 Location-Aware Agent - Quick Start Test");
    println!("{}", "=".repeat(50));

    if let Err(e) = quick_test(connect().await).await {
        tracing::debug!(error = ?e, "Quick test failed");
        println!("\n❌ Quick test failed: {e}");
        print_quick_start_troubleshooting();
    }

    Ok(())
}

async fn quick_test(session: anyhow::Result<AgentSession>) -> anyhow::Result<()> {
    let session = session?;

    println!("\n1. 🌍 Testing basic functionality...");
    let response = session
        .ask("What are some famous landmarks in New York City?", None)
        .await?;
    println!("✅ Success! Response: {}...", preview(&response, 100));

    println!("\n2. 📍 Testing location context...");
    let response = session
        .ask(
            "What restaurants are near Times Square in New York? I'm looking for good places to eat.",
            None,
        )
        .await?;
    println!("✅ Success! Response: {}...", preview(&response, 100));

    println!("\n🎉 Quick test completed successfully!");
    println!("\n✅ Your location-aware agent is working correctly!");

    println!("\n📚 What you can do next:");
    println!("• Run 'cargo run --bin simple-usage' for more examples");
    println!("• Run 'cargo run --bin agent-server' to chat over HTTP");
    println!("• Try asking about restaurants, hotels, attractions, and directions");
    println!("• Ask for travel recommendations for different cities");

    Ok(())
}

fn print_quick_start_troubleshooting() {
    println!("\n🔧 Troubleshooting steps:");
    println!("1. Check your .env file configuration:");
    println!("   - Set GOOGLE_API_KEY for the Gemini API, or");
    println!("   - Set GOOGLE_GENAI_USE_VERTEXAI=true and GOOGLE_CLOUD_PROJECT");
    println!("2. Ensure the workspace builds:");
    println!("   - Run: cargo build --workspace");
    println!("3. Verify your credentials:");
    println!("   - For Vertex AI: gcloud auth application-default login");
    println!("4. Check internet connection and API access");
}

/// Simple usage tour: the fixed example questions, in order
pub async fn simple_usage<F, Fut>(connect: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<AgentSession>>,
{
    println!("Starting Location-Aware Agent Examples...");
    println!("Note: Make sure you have set up your .env file with proper credentials.\n");

    match run_examples(connect).await {
        Ok(()) => print_tips(),
        Err(e) => {
            tracing::debug!(error = ?e, "Examples failed");
            println!("\n❌ Error running examples: {e}");
            print_simple_usage_troubleshooting();
        }
    }

    Ok(())
}

async fn run_examples<F, Fut>(connect: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<AgentSession>>,
{
    println!("🌍 Location-Aware Agent - Simple Usage Examples");
    println!("{}", "=".repeat(60));

    let session = connect().await?;

    for example in EXAMPLES {
        println!();
        heading(example.title, example.underline);

        let response = session.ask(example.question, example.location).await?;
        println!("Q: {}", example.label);
        println!("A: {response}");
    }

    Ok(())
}

fn print_tips() {
    println!("\n✅ All examples completed successfully!");
    println!("\n💡 Tips:");
    println!("- The agent uses Google Maps data for accurate, real-time information");
    println!("- Provide specific locations or coordinates for better results");
    println!("- The agent can help with restaurants, hotels, attractions, directions, and local info");
    println!("- Try asking about business hours, reviews, and current information");

    println!("\n🚀 Next Steps:");
    println!("- Run 'cargo run --bin agent-server' and POST to /api/chat");
    println!("- Try your own location-based questions");
    println!("- Experiment with different cities and types of queries");
}

fn print_simple_usage_troubleshooting() {
    println!("\nTroubleshooting:");
    println!("1. Check your .env file configuration");
    println!("2. Ensure you have proper Google Cloud/AI Studio credentials");
    println!("3. Verify your internet connection");
    println!("4. Make sure the workspace builds: cargo build --workspace");
}

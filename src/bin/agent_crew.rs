use std::sync::Arc;

use env_logger::init;
use gembridge::{
    agent::{Agent, AgentConfig},
    bridge::PromptOrMessages,
    crew::{Crew, Task},
};
use gembridge_llm::{
    CapabilityDecorator,
    gemini::{Gemini, GeminiConfigBuilder, GeminiModel},
};
use serde_json::json;

const IMAGE_URL: &str = "https://storage.googleapis.com/generativeai-downloads/images/scones.jpg";

// cargo run --bin agent_crew
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let config = GeminiConfigBuilder::from_env()
        .with_model(GeminiModel::Gemini15Pro)
        .build()?;
    let llm = Gemini::new(config);

    println!("\n--- Specialized Agents ---");
    let researcher = Agent::builder(
        llm.with_system_instruction(
            "You are a top-tier AI researcher. Provide detailed, technical explanations.",
        )?,
        AgentConfig::new(
            "AI Research Scientist",
            "Make breakthrough discoveries in AI",
            "Expert in cutting-edge AI research",
        ),
    )
    .build()?;
    let writer = Agent::builder(
        llm.with_system_instruction("Write in clear, accessible language for general audience.")?,
        AgentConfig::new(
            "Technical Writer",
            "Create engaging technical content",
            "Skilled at explaining complex topics simply",
        ),
    )
    .build()?;

    let crew = Crew::new()
        .with_task(
            Task::new(
                "research",
                "Research the latest advancements in transformer architectures",
                Arc::new(researcher),
            )
            .with_expected_output("Detailed technical report on 3 key advancements"),
        )?
        .with_task(
            Task::new(
                "write",
                "Write a blog post about transformer advancements for non-experts",
                Arc::new(writer),
            )
            .with_expected_output("Engaging 800-word blog post")
            .with_context("research"),
        )?;
    let result = crew.kickoff().await?;
    println!("Crew result: {}", result.final_output().unwrap_or_default());

    println!("\n--- Multimodal Crew ---");
    let analyst = Agent::builder(
        llm.clone(),
        AgentConfig::new(
            "Senior Researcher",
            "Analyze complex data including images and text",
            "Expert in multimodal AI analysis",
        ),
    )
    .build()?;
    let blogger = Agent::builder(
        llm.clone(),
        AgentConfig::new(
            "Content Writer",
            "Write engaging content",
            "Skilled writer who creates compelling narratives",
        ),
    )
    .build()?;
    let description = PromptOrMessages::from_blocks(&json!([
        {"type": "text", "text": "Analyze this image of a baked dish"},
        {"type": "image_url", "image_url": {"url": IMAGE_URL}}
    ]))?;
    let crew = Crew::new()
        .with_task(
            Task::new("analyze", description, Arc::new(analyst))
                .with_expected_output("Detailed analysis of what the image shows"),
        )?
        .with_task(
            Task::new(
                "write",
                "Write a blog post about the image analysis",
                Arc::new(blogger),
            )
            .with_expected_output("Engaging 500-word blog post suitable for general audience")
            .with_context("analyze"),
        )?;
    let result = crew.kickoff().await?;
    println!("Multimodal crew result: {}", result.final_output().unwrap_or_default());

    println!("\n--- Model Configuration ---");
    let analyst = Agent::builder(
        llm.with_model_config(&json!({
            "temperature": 0.3,
            "max_output_tokens": 1024,
            "top_p": 0.95
        }))?,
        AgentConfig::new(
            "Data Analyst",
            "Analyze complex datasets",
            "Expert in data analysis and visualization",
        ),
    )
    .build()?;
    let response = analyst
        .execute_task("Analyze this sales data and identify key trends")
        .await?;
    println!("Analysis result: {}", response.final_answer);
    Ok(())
}

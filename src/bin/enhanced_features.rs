use std::io::Write;

use env_logger::init;
use gembridge::bridge::Bridge;
use gembridge_llm::{
    CapabilityDecorator, LLMResult, Messages,
    gemini::{Gemini, GeminiConfigBuilder, GeminiModel, Invocation},
};
use log::debug;
use serde_json::json;
use tokio_stream::StreamExt;

fn preview(text: &str) -> String {
    let head: String = text.chars().take(200).collect();
    format!("{}...", head)
}

// cargo run --bin enhanced_features
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let config = GeminiConfigBuilder::from_env()
        .with_model(GeminiModel::Gemini15Pro)
        .build()?;
    let base = Gemini::new(config);

    let llm = base
        .with_model_config(&json!({"temperature": 0.7, "max_output_tokens": 2048}))?
        .with_system_instruction(
            "You are a helpful AI assistant that specializes in technology topics.",
        )?;

    println!("\n--- Streaming ---");
    let streaming = llm.with_streaming(true)?;
    let messages = Messages::builder()
        .add_human_message("Explain neural networks in detail")
        .build();
    match streaming.invoke_configured(&messages).await? {
        Invocation::Stream(mut stream) => {
            while let Some(chunk) = stream.next().await {
                match chunk? {
                    LLMResult::Generate(delta) => {
                        print!("{}", delta.generation());
                        std::io::stdout().flush()?;
                    }
                    LLMResult::ToolCall(tool_call) => debug!("tool call: {:?}", tool_call),
                }
            }
            println!("\n");
        }
        Invocation::Complete(result) => println!("{}", result.text()),
    }

    println!("\n--- System Instruction ---");
    let tech_llm = base.with_system_instruction(
        "You are a computer science expert. Provide detailed technical explanations.",
    )?;
    let bio_llm =
        base.with_system_instruction("You are a biology expert. Focus on biological concepts.")?;

    let tech_response = Bridge::call(&tech_llm, "Explain how transformers work").await?;
    let bio_response = Bridge::call(&bio_llm, "Explain how transformers work").await?;
    println!("Technical response: {}", preview(tech_response.content()));
    println!("Biological response: {}", preview(bio_response.content()));
    Ok(())
}

use env_logger::init;
use gembridge::bridge::{Bridge, PromptOrMessages};
use gembridge_llm::{
    CapabilityDecorator,
    gemini::{Gemini, GeminiConfigBuilder, GeminiModel},
};
use serde_json::json;

const IMAGE_URL: &str = "https://storage.googleapis.com/generativeai-downloads/images/scones.jpg";

// cargo run --bin multimodal_function_calling
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let config = GeminiConfigBuilder::from_env()
        .with_model(GeminiModel::Gemini15Pro)
        .build()?;
    let llm = Gemini::new(config);

    let input = PromptOrMessages::from_blocks(&json!([
        {"type": "text", "text": "What's in this image?"},
        {"type": "image_url", "image_url": {"url": IMAGE_URL}}
    ]))?;
    let response = Bridge::call(&llm, input).await?;
    println!("Multimodal response: {}", response.content());

    let tools = json!([{
        "name": "get_weather",
        "description": "Get current weather for a location",
        "parameters": {
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City name"}
            },
            "required": ["location"]
        }
    }]);
    let with_tools = llm.bind_functions(&tools)?;
    let response = Bridge::call(&with_tools, "What's the weather like in San Francisco?").await?;
    match response.tool_call() {
        Some(tool_call) => println!(
            "Function calling response: {}({})",
            tool_call.name, tool_call.arguments
        ),
        None => println!("Function calling response: {}", response.content()),
    }
    Ok(())
}

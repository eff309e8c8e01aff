use env_logger::init;
use gembridge_llm::{
    Capabilities, Capability, CapabilityDecorator, LLMError, Supports,
    gemini::{Gemini, GeminiConfigBuilder},
};
use log::debug;
use serde_json::json;

/// Result of asking an adapter for one decoration.
fn try_decoration(llm: &Gemini, capability: Capability) -> Result<(), LLMError> {
    match capability {
        Capability::SystemInstruction => llm
            .with_system_instruction("You are a helpful AI assistant.")
            .map(drop),
        Capability::ModelConfig => llm.with_model_config(&json!({"temperature": 0.7})).map(drop),
        Capability::FunctionCalling => llm
            .bind_functions(&json!([{
                "name": "get_weather",
                "description": "Get weather",
                "parameters": {"type": "object", "properties": {}}
            }]))
            .map(drop),
        Capability::Multimodal => llm.require(Capability::Multimodal),
        Capability::Streaming => llm.with_streaming(true).map(drop),
    }
}

/// Prints one line per capability; returns how many were missing.
fn report(label: &str, llm: &Gemini, expect_complete: bool) -> usize {
    println!("== {} adapter ({}) ==", label, llm.model());
    let mut missing = 0;
    for capability in Capability::ALL {
        match (llm.supports(capability), try_decoration(llm, capability)) {
            (true, Ok(())) => println!("{:<20} supported", capability),
            (_, Err(e)) if !expect_complete => {
                missing += 1;
                println!("{:<20} missing (expected): {}", capability, e);
            }
            (_, Err(e)) => {
                missing += 1;
                println!("{:<20} MISSING: {}", capability, e);
            }
            (false, Ok(())) => {
                missing += 1;
                println!("{:<20} MISSING: decoration accepted without support", capability);
            }
        }
    }
    missing
}

// cargo run
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init();
    // The report only queries capabilities, so no key is needed.
    let config = match GeminiConfigBuilder::from_env().build() {
        Ok(config) => config,
        Err(_) => GeminiConfigBuilder::from_env()
            .with_api_key("offline")
            .build()?,
    };
    debug!("config: {:?}", config);

    let basic = Gemini::new(
        GeminiConfigBuilder::new()
            .with_api_key(config.api_key())
            .with_api_base(config.api_base())
            .with_model(config.model().clone())
            .with_capabilities(Capabilities::basic())
            .build()?,
    );
    let enhanced = Gemini::new(config);

    report("basic", &basic, false);
    println!();
    let missing = report("enhanced", &enhanced, true);
    if missing > 0 {
        return Err(format!("enhanced adapter is missing {} capabilities", missing).into());
    }
    Ok(())
}

use anyhow::Result;
use async_trait::async_trait;
use gembridge::{
    agent::{Agent, AgentConfig},
    bridge::Bridge,
    tools::{FunTool, Parameters, ToolParameters},
};
use gembridge_llm::{
    CapabilityDecorator,
    gemini::{Gemini, GeminiConfigBuilder, GeminiModel},
};
use httpmock::prelude::*;
use serde_json::{Value, json};

const GENERATE_PATH: &str = "/models/gemini-1.5-pro-latest:generateContent";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
#[derive(gembridge_llm::ToolParameters)]
struct WeatherToolParameters {
    /// City name, e.g. "Tokyo"
    location: String,
    /// celsius or fahrenheit
    unit: Option<String>,
}

struct WeatherTool;

#[async_trait]
impl FunTool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }
    fn description(&self) -> &str {
        "Get current weather for a location"
    }
    fn parameters(&self) -> Parameters {
        WeatherToolParameters::parameters()
    }
    async fn call(&self, input: &Value) -> Result<Value> {
        Ok(json!({"location": input["location"], "forecast": "sunny, 25 degrees"}))
    }
}

fn gemini(server: &MockServer) -> Result<Gemini> {
    let config = GeminiConfigBuilder::new()
        .with_api_key("test_api_key")
        .with_api_base(&server.url(""))
        .with_model(GeminiModel::Gemini15Pro)
        .build()?;
    Ok(Gemini::new(config))
}

// RUST_LOG=debug cargo test -p gembridge --test gemini_agent -- --nocapture
#[tokio::test]
async fn test_agent_tool_round_trip() -> Result<()> {
    init_logger();
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .body_includes("\"functionDeclarations\"")
            .body_excludes("functionResponse");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"candidates":[{"content":{"role":"model","parts":[{"functionCall":{"name":"get_weather","args":{"location":"Tokyo"}}}]},"finishReason":"STOP"}]}"#);
    });
    let second = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .body_includes("\"functionResponse\"")
            .body_includes("sunny, 25 degrees");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Tokyo is sunny at 25 degrees."}]},"finishReason":"STOP"}]}"#);
    });

    let config = AgentConfig::new(
        "Travel Assistant",
        "Answer weather questions",
        "Knows every city",
    );
    let agent = Agent::builder(gemini(&server)?, config)
        .with_tool(WeatherTool)?
        .build()?;

    let response = agent.execute_task("What's the weather in Tokyo?").await?;
    first.assert();
    second.assert();
    assert_eq!(response.final_answer, "Tokyo is sunny at 25 degrees.");
    assert_eq!(response.intermediate_steps.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_bridge_call_with_decorated_adapter() -> Result<()> {
    init_logger();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .body_includes("\"temperature\":0.3")
            .body_includes("Analyze this sales data");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Three insights."}]}}]}"#);
    });

    let analyst = gemini(&server)?.with_model_config(&json!({
        "temperature": 0.3,
        "max_output_tokens": 1024,
        "top_p": 0.95
    }))?;
    let response = Bridge::call(&analyst, "Analyze this sales data").await?;
    mock.assert();
    assert_eq!(response.content(), "Three insights.");
    Ok(())
}

#[test]
fn test_derived_parameters() {
    let parameters = WeatherToolParameters::parameters();
    assert_eq!(parameters.required, Some(vec!["location".to_string()]));
    assert_eq!(parameters.properties["unit"].r#type, "string");
}

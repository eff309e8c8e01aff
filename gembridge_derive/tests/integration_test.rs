#![allow(dead_code)]

use gembridge_llm::tools::{Parameters, ToolParameters};
use serde_json::json;

#[derive(gembridge_llm::ToolParameters)]
struct WeatherParameters {
    /// City name, e.g. "San Francisco"
    location: String,
    days: i32,
}

#[derive(gembridge_llm::ToolParameters)]
struct SearchParameters {
    /// Search query.
    query: Option<String>,
    limit: Option<u32>,
}

#[derive(gembridge_llm::ToolParameters)]
struct TaggingParameters {
    /// Tags to attach.
    tags: Vec<String>,
    score: f64,
    notify: Option<bool>,
}

#[test]
fn test_generated_parameters() {
    // needs `use gembridge_llm::tools::ToolParameters;`
    let parameters: Parameters = WeatherParameters::parameters();

    assert_eq!(parameters.r#type, "object".to_string());
    assert_eq!(
        parameters.required,
        Some(vec!["location".to_string(), "days".to_string()])
    );
    assert_eq!(parameters.properties.len(), 2);

    let location = parameters.properties.get("location").unwrap();
    assert_eq!(location.r#type, "string".to_string());
    assert_eq!(
        location.description,
        Some("City name, e.g. \"San Francisco\"".to_string())
    );
    assert_eq!(location.enum_values, None);

    let days = parameters.properties.get("days").unwrap();
    assert_eq!(days.r#type, "integer".to_string());
    assert_eq!(days.description, None);
}

#[test]
fn test_option_parameter() {
    let parameters: Parameters = SearchParameters::parameters();
    assert_eq!(parameters.required, None);
    assert_eq!(parameters.properties.len(), 2);

    let query = parameters.properties.get("query").unwrap();
    assert_eq!(query.r#type, "string".to_string());
    assert_eq!(query.description, Some("Search query.".to_string()));

    let limit = parameters.properties.get("limit").unwrap();
    assert_eq!(limit.r#type, "integer".to_string());
}

#[test]
fn test_vec_and_mixed_parameters() {
    let parameters = TaggingParameters::parameters();
    assert_eq!(
        serde_json::to_value(&parameters).unwrap(),
        json!({
            "type": "object",
            "properties": {
                "tags": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Tags to attach."
                },
                "score": {"type": "number"},
                "notify": {"type": "boolean"}
            },
            "required": ["tags", "score"]
        })
    );
}

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::LLMError;

/// JSON-schema object describing a function's arguments.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Parameters {
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(default)]
    pub properties: HashMap<String, Property>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            r#type: "object".to_string(),
            properties: HashMap::new(),
            required: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Property {
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, Property>>,
}

/// Types implementing `ToolParameters` describe their fields as function
/// parameters. Usually derived with `#[derive(ToolParameters)]`.
pub trait ToolParameters {
    fn parameters() -> Parameters;
}

/// A function the model may call, as sent in `tools[].functionDeclarations`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Parameters,
}

impl FunctionDeclaration {
    pub fn new<N: Into<String>, D: Into<String>>(
        name: N,
        description: D,
        parameters: Parameters,
    ) -> Result<Self, LLMError> {
        let declaration = Self {
            name: name.into(),
            description: description.into(),
            parameters,
        };
        declaration.validate()?;
        Ok(declaration)
    }

    /// Parses a tool definition of the form
    /// `{"name": ..., "description": ..., "parameters": {"type": "object", ...}}`.
    pub fn from_value(value: &Value) -> Result<Self, LLMError> {
        let object = value.as_object().ok_or_else(|| {
            LLMError::InvalidRequestError(format!("tool definition must be an object: {}", value))
        })?;
        let name = required_str(object, "name", "<unnamed>")?;
        let description = required_str(object, "description", name)?;
        let parameters = object.get("parameters").ok_or_else(|| {
            LLMError::InvalidRequestError(format!("tool `{}` is missing `parameters`", name))
        })?;
        if !parameters.is_object() {
            return Err(LLMError::InvalidRequestError(format!(
                "tool `{}`: `parameters` must be a JSON schema object",
                name
            )));
        }
        let parameters: Parameters = serde_json::from_value(parameters.clone()).map_err(|e| {
            LLMError::InvalidRequestError(format!("tool `{}`: invalid parameters: {}", name, e))
        })?;

        Self::new(name, description, parameters)
    }

    pub fn validate(&self) -> Result<(), LLMError> {
        if self.name.trim().is_empty() {
            return Err(LLMError::InvalidRequestError(
                "tool name must not be empty".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(LLMError::InvalidRequestError(format!(
                "tool `{}` has an empty description",
                self.name
            )));
        }
        if self.parameters.r#type != "object" {
            return Err(LLMError::InvalidRequestError(format!(
                "tool `{}`: parameters type must be `object`, got `{}`",
                self.name, self.parameters.r#type
            )));
        }
        if let Some(required) = &self.parameters.required {
            if let Some(missing) = required
                .iter()
                .find(|field| !self.parameters.properties.contains_key(*field))
            {
                return Err(LLMError::InvalidRequestError(format!(
                    "tool `{}`: required parameter `{}` is not declared in properties",
                    self.name, missing
                )));
            }
        }
        Ok(())
    }
}

fn required_str<'a>(
    object: &'a serde_json::Map<String, Value>,
    key: &str,
    tool: &str,
) -> Result<&'a str, LLMError> {
    object.get(key).and_then(Value::as_str).ok_or_else(|| {
        LLMError::InvalidRequestError(format!("tool `{}` is missing `{}`", tool, key))
    })
}

/// Parses a JSON array (or a single object) of tool definitions.
pub fn declarations_from_value(definitions: &Value) -> Result<Vec<FunctionDeclaration>, LLMError> {
    let declarations = match definitions {
        Value::Array(items) => items
            .iter()
            .map(FunctionDeclaration::from_value)
            .collect::<Result<Vec<_>, _>>()?,
        Value::Object(_) => vec![FunctionDeclaration::from_value(definitions)?],
        _ => {
            return Err(LLMError::InvalidRequestError(
                "tool definitions must be an array of objects".to_string(),
            ));
        }
    };
    ensure_unique_names(&declarations)?;
    Ok(declarations)
}

pub fn ensure_unique_names(declarations: &[FunctionDeclaration]) -> Result<(), LLMError> {
    let mut seen = HashSet::new();
    for declaration in declarations {
        if !seen.insert(declaration.name.as_str()) {
            return Err(LLMError::InvalidRequestError(format!(
                "duplicate function declaration `{}`",
                declaration.name
            )));
        }
    }
    Ok(())
}

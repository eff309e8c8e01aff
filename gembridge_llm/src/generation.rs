use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::LLMError;

pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);
pub const TOP_P_RANGE: (f32, f32) = (0.0, 1.0);

/// Generation parameters; serialized as the `generationConfig` object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl ModelConfig {
    /// Reads the caller-facing option map
    /// `{"temperature": .., "max_output_tokens": .., "top_p": ..}`.
    ///
    /// Any other key, a wrong type or an out of range value is an
    /// `InvalidConfigError`.
    pub fn from_options(options: &Value) -> Result<Self, LLMError> {
        let object = options.as_object().ok_or_else(|| {
            LLMError::InvalidConfigError(format!("model config must be an object: {}", options))
        })?;

        let mut config = ModelConfig::default();
        for (key, value) in object {
            match key.as_str() {
                "temperature" => {
                    config.temperature = Some(float_in_range(key, value, TEMPERATURE_RANGE)?);
                }
                "top_p" => {
                    config.top_p = Some(float_in_range(key, value, TOP_P_RANGE)?);
                }
                "max_output_tokens" => {
                    let tokens = value
                        .as_u64()
                        .filter(|tokens| *tokens > 0 && *tokens <= u32::MAX as u64)
                        .ok_or_else(|| {
                            LLMError::InvalidConfigError(format!(
                                "`max_output_tokens` must be a positive integer, got {}",
                                value
                            ))
                        })?;
                    config.max_output_tokens = Some(tokens as u32);
                }
                other => {
                    return Err(LLMError::InvalidConfigError(format!(
                        "unrecognized option `{}`",
                        other
                    )));
                }
            }
        }
        Ok(config)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Result<Self, LLMError> {
        check_range("temperature", temperature as f64, TEMPERATURE_RANGE)?;
        self.temperature = Some(temperature);
        Ok(self)
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Result<Self, LLMError> {
        if max_output_tokens == 0 {
            return Err(LLMError::InvalidConfigError(
                "`max_output_tokens` must be a positive integer, got 0".to_string(),
            ));
        }
        self.max_output_tokens = Some(max_output_tokens);
        Ok(self)
    }

    pub fn with_top_p(mut self, top_p: f32) -> Result<Self, LLMError> {
        check_range("top_p", top_p as f64, TOP_P_RANGE)?;
        self.top_p = Some(top_p);
        Ok(self)
    }

    /// Values set in `other` win.
    pub fn merge(&self, other: &ModelConfig) -> ModelConfig {
        debug!("Merging options: {:?} and {:?}", self, other);
        ModelConfig {
            temperature: other.temperature.or(self.temperature),
            max_output_tokens: other.max_output_tokens.or(self.max_output_tokens),
            top_p: other.top_p.or(self.top_p),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.max_output_tokens.is_none() && self.top_p.is_none()
    }
}

fn float_in_range(key: &str, value: &Value, range: (f32, f32)) -> Result<f32, LLMError> {
    let number = value.as_f64().ok_or_else(|| {
        LLMError::InvalidConfigError(format!("`{}` must be a number, got {}", key, value))
    })?;
    check_range(key, number, range)?;
    Ok(number as f32)
}

fn check_range(key: &str, number: f64, (min, max): (f32, f32)) -> Result<(), LLMError> {
    if number.is_nan() || number < min as f64 || number > max as f64 {
        return Err(LLMError::InvalidConfigError(format!(
            "`{}` must be in [{}, {}], got {}",
            key, min, max, number
        )));
    }
    Ok(())
}

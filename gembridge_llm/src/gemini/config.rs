use std::{fmt, str::FromStr};

use anyhow::Result;
use log::debug;

use crate::Capabilities;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

#[derive(Clone, Debug, PartialEq)]
pub enum GeminiModel {
    Gemini15Flash,
    Gemini15Pro,
    Gemini20Flash,
    Custom(String),
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeminiModel::Gemini15Flash => "gemini-1.5-flash",
            GeminiModel::Gemini15Pro => "gemini-1.5-pro-latest",
            GeminiModel::Gemini20Flash => "gemini-2.0-flash-001",
            GeminiModel::Custom(name) => name,
        };
        f.write_str(name)
    }
}

impl FromStr for GeminiModel {
    type Err = std::convert::Infallible;

    /// Accepts bare ids and the `models/` prefixed form.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches("models/");
        Ok(match name {
            "gemini-1.5-flash" => GeminiModel::Gemini15Flash,
            "gemini-1.5-pro-latest" => GeminiModel::Gemini15Pro,
            "gemini-2.0-flash-001" => GeminiModel::Gemini20Flash,
            other => GeminiModel::Custom(other.to_string()),
        })
    }
}

impl From<GeminiModel> for String {
    fn from(model: GeminiModel) -> String {
        model.to_string()
    }
}

#[derive(Clone)]
pub struct GeminiConfig {
    api_base: String,
    api_key: String,
    model: GeminiModel,
    capabilities: Capabilities,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: "".to_string(),
            model: GeminiModel::Gemini15Flash,
            capabilities: Capabilities::all(),
        }
    }
}

impl GeminiConfig {
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
    pub fn model(&self) -> &GeminiModel {
        &self.model
    }
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

pub struct GeminiConfigBuilder {
    config: GeminiConfig,
}

impl GeminiConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GeminiConfig::default(),
        }
    }

    /// Reads `GOOGLE_API_KEY` (or `GEMINI_API_KEY`), `GEMINI_MODEL` and
    /// `GEMINI_API_BASE`, loading `.env` first.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::new();
        if let Some(api_key) = API_KEY_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.is_empty())
        {
            builder = builder.with_api_key(&api_key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            if let Ok(model) = model.parse() {
                builder = builder.with_model(model);
            }
        }
        if let Some(api_base) = lookup("GEMINI_API_BASE") {
            builder = builder.with_api_base(&api_base);
        }
        builder
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.config.api_base = api_base.trim_end_matches('/').into();
        self
    }
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.config.api_key = api_key.into();
        self
    }
    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.config.model = model;
        self
    }
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.config.capabilities = capabilities;
        self
    }
    pub fn build(self) -> Result<GeminiConfig> {
        if self.config.api_key.is_empty() {
            anyhow::bail!("API key must be set");
        }
        debug!("Gemini config: {:?}", self.config);

        Ok(self.config)
    }
}

impl Default for GeminiConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

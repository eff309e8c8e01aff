use std::fmt;

use serde::{Deserialize, Serialize};

/// A feature an adapter may or may not offer.
///
/// Callers check [`Capabilities::contains`] (or `supports` on an adapter)
/// before relying on a feature instead of trying the call and catching the
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    SystemInstruction,
    ModelConfig,
    FunctionCalling,
    Multimodal,
    Streaming,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::SystemInstruction,
        Capability::ModelConfig,
        Capability::FunctionCalling,
        Capability::Multimodal,
        Capability::Streaming,
    ];

    fn bit(self) -> u8 {
        match self {
            Capability::SystemInstruction => 1,
            Capability::ModelConfig => 1 << 1,
            Capability::FunctionCalling => 1 << 2,
            Capability::Multimodal => 1 << 3,
            Capability::Streaming => 1 << 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::SystemInstruction => "system_instruction",
            Capability::ModelConfig => "model_config",
            Capability::FunctionCalling => "function_calling",
            Capability::Multimodal => "multimodal",
            Capability::Streaming => "streaming",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    bits: u8,
}

impl Capabilities {
    pub fn none() -> Self {
        Self { bits: 0 }
    }

    /// Everything the Gemini REST API offers.
    pub fn all() -> Self {
        Capability::ALL
            .iter()
            .fold(Self::none(), |caps, cap| caps.with(*cap))
    }

    /// A plain chat client: text in, text out, generation parameters and streaming.
    pub fn basic() -> Self {
        Self::none()
            .with(Capability::ModelConfig)
            .with(Capability::Streaming)
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.bits |= capability.bit();
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.bits &= !capability.bit();
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.bits & capability.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(*capability))
    }

    pub fn missing(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .into_iter()
            .filter(move |capability| !self.contains(*capability))
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

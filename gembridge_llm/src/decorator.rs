use log::debug;
use serde_json::Value;

use crate::{
    Capability, FunctionDeclaration, LLM, LLMError, Message, Messages, ModelConfig,
    tools::{declarations_from_value, ensure_unique_names},
};

/// Everything a decoration can change about outgoing requests.
///
/// Values are never mutated in place: each `with_*` call returns a new
/// config, so an adapter handed to an agent keeps the configuration it had
/// when it was handed over.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestConfig {
    system_instruction: Option<String>,
    generation: ModelConfig,
    tools: Vec<FunctionDeclaration>,
    streaming: bool,
}

impl RequestConfig {
    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }

    pub fn generation(&self) -> &ModelConfig {
        &self.generation
    }

    pub fn tools(&self) -> &[FunctionDeclaration] {
        &self.tools
    }

    pub fn streaming(&self) -> bool {
        self.streaming
    }

    pub fn with_system_instruction(&self, instruction: &str) -> Self {
        Self {
            system_instruction: Some(instruction.to_string()),
            ..self.clone()
        }
    }

    pub fn with_model_config(&self, config: &ModelConfig) -> Self {
        Self {
            generation: self.generation.merge(config),
            ..self.clone()
        }
    }

    /// Adds declarations to the bound set. A name that is already bound is an error.
    pub fn with_tools(&self, declarations: Vec<FunctionDeclaration>) -> Result<Self, LLMError> {
        let mut tools = self.tools.clone();
        tools.extend(declarations);
        ensure_unique_names(&tools)?;
        Ok(Self {
            tools,
            ..self.clone()
        })
    }

    pub fn without_tools(&self) -> Self {
        Self {
            tools: Vec::new(),
            ..self.clone()
        }
    }

    pub fn with_streaming(&self, streaming: bool) -> Self {
        Self {
            streaming,
            ..self.clone()
        }
    }
}

/// One call's worth of input: model id, conversation and configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    model: String,
    messages: Vec<Message>,
    config: RequestConfig,
}

impl Request {
    /// Fails with `InvalidRequestError` when the message list is empty or
    /// two bound functions share a name.
    pub fn new<M: Into<String>>(
        model: M,
        messages: &Messages,
        config: &RequestConfig,
    ) -> Result<Self, LLMError> {
        if messages.is_empty() {
            return Err(LLMError::InvalidRequestError(
                "a request needs at least one message".to_string(),
            ));
        }
        if let Some(empty) = messages.messages.iter().find(|m| m.parts.is_empty()) {
            return Err(LLMError::InvalidRequestError(format!(
                "{} message has no content parts",
                empty.message_type.to_string()
            )));
        }
        ensure_unique_names(config.tools())?;
        Ok(Self {
            model: model.into(),
            messages: messages.messages.clone(),
            config: config.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub fn has_images(&self) -> bool {
        self.messages.iter().any(Message::has_images)
    }
}

/// Fluent capability decorations over an adapter.
///
/// Every call checks the adapter's capability set first and answers with
/// `UnsupportedCapability` instead of quietly ignoring the request.
///
/// ```rust,ignore
/// let llm = Gemini::new(config)
///     .with_system_instruction("You are a helpful AI assistant.")?
///     .with_model_config(&json!({"temperature": 0.7, "max_output_tokens": 2048}))?;
/// ```
pub trait CapabilityDecorator: LLM + Sized {
    fn request_config(&self) -> &RequestConfig;

    /// A copy of this adapter carrying `config`.
    fn with_request_config(&self, config: RequestConfig) -> Self;

    fn require(&self, capability: Capability) -> Result<(), LLMError> {
        if self.capabilities().contains(capability) {
            Ok(())
        } else {
            debug!("Capability {} is not supported", capability);
            Err(LLMError::UnsupportedCapability(capability))
        }
    }

    /// Last call wins.
    fn with_system_instruction(&self, instruction: &str) -> Result<Self, LLMError> {
        self.require(Capability::SystemInstruction)?;
        Ok(self.with_request_config(self.request_config().with_system_instruction(instruction)))
    }

    fn with_model_config(&self, options: &Value) -> Result<Self, LLMError> {
        self.require(Capability::ModelConfig)?;
        let config = ModelConfig::from_options(options)?;
        Ok(self.with_request_config(self.request_config().with_model_config(&config)))
    }

    fn with_generation(&self, config: &ModelConfig) -> Result<Self, LLMError> {
        self.require(Capability::ModelConfig)?;
        Ok(self.with_request_config(self.request_config().with_model_config(config)))
    }

    fn function_calling(&self, tool_specs: &Value) -> Result<Self, LLMError> {
        self.require(Capability::FunctionCalling)?;
        let declarations = declarations_from_value(tool_specs)?;
        self.with_declarations(declarations)
    }

    fn bind_functions(&self, tool_specs: &Value) -> Result<Self, LLMError> {
        self.function_calling(tool_specs)
    }

    fn with_declarations(&self, declarations: Vec<FunctionDeclaration>) -> Result<Self, LLMError> {
        self.require(Capability::FunctionCalling)?;
        for declaration in &declarations {
            declaration.validate()?;
        }
        let config = self.request_config().with_tools(declarations)?;
        Ok(self.with_request_config(config))
    }

    fn clear_functions(&self) -> Self {
        self.with_request_config(self.request_config().without_tools())
    }

    fn with_streaming(&self, streaming: bool) -> Result<Self, LLMError> {
        if streaming {
            self.require(Capability::Streaming)?;
        }
        Ok(self.with_request_config(self.request_config().with_streaming(streaming)))
    }
}

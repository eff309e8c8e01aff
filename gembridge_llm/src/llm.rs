use async_trait::async_trait;
use futures::{Stream, StreamExt};
use log::debug;
use serde_json::Value;
use std::{collections::HashMap, pin::Pin};

use serde::{Deserialize, Serialize};

use crate::{Capabilities, Capability, LLMError, Message, Messages, MessagesBuilder, Request};

/// Incremental chunks of one streamed response. Finite and consumed once.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<LLMResult, LLMError>> + Send>>;

/// The call contract every adapter offers to orchestration code.
#[async_trait]
pub trait LLM: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    /// Sends a fully built request.
    async fn generate(&self, request: &Request) -> Result<LLMResult, LLMError>;

    /// Builds a request from `messages` and the adapter's own configuration.
    async fn invoke(&self, messages: &Messages) -> Result<LLMResult, LLMError>;

    async fn invoke_stream(&self, messages: &Messages) -> Result<ChatStream, LLMError>;

    async fn invoke_stream_one_result(&self, messages: &Messages) -> Result<LLMResult, LLMError> {
        let stream = self.invoke_stream(messages).await?;
        concat_stream(stream).await
    }

    /// Single-prompt completion, the shape completion-style frameworks call.
    async fn complete(&self, prompt: &str) -> Result<LLMResult, LLMError> {
        let messages = MessagesBuilder::new().add_human_message(prompt).build();
        self.invoke(&messages).await
    }

    async fn chat(&self, messages: &Messages) -> Result<LLMResult, LLMError> {
        self.invoke(messages).await
    }
}

/// Capability query available on every adapter.
pub trait Supports {
    fn supports(&self, capability: Capability) -> bool;
}

impl<T: LLM + ?Sized> Supports for T {
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}

/// Drains a stream into one result: text chunks are concatenated, the last
/// usage report is kept, and a function call chunk ends the collection.
pub async fn concat_stream(mut stream: ChatStream) -> Result<LLMResult, LLMError> {
    let mut result = GenerateResult::default();
    while let Some(chunk) = stream.next().await {
        match chunk? {
            LLMResult::Generate(delta) => {
                debug!("stream delta: {:?}", delta.generation());
                result.push_generation(delta.generation());
                if let Some(tokens) = delta.tokens {
                    result.tokens = Some(tokens);
                }
            }
            LLMResult::ToolCall(tool_call) => return Ok(LLMResult::ToolCall(tool_call)),
        }
    }
    Ok(LLMResult::Generate(result))
}

#[derive(Debug, Clone)]
pub enum LLMResult {
    Generate(GenerateResult),
    ToolCall(ToolCallResult),
}

impl LLMResult {
    /// Generated text; empty for a function call.
    pub fn text(&self) -> &str {
        match self {
            LLMResult::Generate(result) => result.generation(),
            LLMResult::ToolCall(_) => "",
        }
    }

    pub fn tool_call(&self) -> Option<&ToolCallResult> {
        match self {
            LLMResult::ToolCall(tool_call) => Some(tool_call),
            LLMResult::Generate(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GenerateResult {
    tokens: Option<TokenUsage>,
    generation: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ToolCallResult {
    pub name: String,
    pub arguments: Value,
    /// The model turn to append to the conversation before the tool's answer.
    pub ai_message: Message,
}

impl GenerateResult {
    pub fn new(generation: String, tokens: Option<TokenUsage>) -> Self {
        Self { generation, tokens }
    }

    pub fn to_hashmap(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("generation".to_string(), self.generation.clone());

        if let Some(ref tokens) = self.tokens {
            map.insert(
                "prompt_tokens".to_string(),
                tokens.prompt_tokens.to_string(),
            );
            map.insert(
                "completion_tokens".to_string(),
                tokens.completion_tokens.to_string(),
            );
            map.insert("total_tokens".to_string(), tokens.total_tokens.to_string());
        }

        map
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn tokens(&self) -> Option<&TokenUsage> {
        self.tokens.as_ref()
    }

    pub fn set_generation(&mut self, generation: &str) {
        self.generation = generation.to_string();
    }

    pub fn push_generation(&mut self, generation: &str) {
        self.generation.push_str(generation);
    }
}

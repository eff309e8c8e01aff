use gembridge_llm::{
    LLM, LLMError, LLMResult, Message, Messages, MessagesBuilder, MultimodalRequestBuilder,
    ToolCallResult,
};
use log::debug;
use serde_json::Value;

/// What orchestration code hands to a model: a bare prompt or a full
/// conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOrMessages {
    Prompt(String),
    Messages(Messages),
}

impl PromptOrMessages {
    /// A single human turn built from `[{type: "text"}, {type: "image_url"}]`
    /// style content blocks.
    pub fn from_blocks(blocks: &Value) -> Result<Self, LLMError> {
        let message = MultimodalRequestBuilder::from_blocks(blocks)?.build_message();
        Ok(PromptOrMessages::Messages(
            MessagesBuilder::new().add_message(message).build(),
        ))
    }

    pub fn into_messages(self) -> Messages {
        match self {
            PromptOrMessages::Prompt(prompt) => {
                MessagesBuilder::new().add_human_message(&prompt).build()
            }
            PromptOrMessages::Messages(messages) => messages,
        }
    }
}

impl From<&str> for PromptOrMessages {
    fn from(prompt: &str) -> Self {
        PromptOrMessages::Prompt(prompt.to_string())
    }
}

impl From<String> for PromptOrMessages {
    fn from(prompt: String) -> Self {
        PromptOrMessages::Prompt(prompt)
    }
}

impl From<Messages> for PromptOrMessages {
    fn from(messages: Messages) -> Self {
        PromptOrMessages::Messages(messages)
    }
}

impl From<Message> for PromptOrMessages {
    fn from(message: Message) -> Self {
        PromptOrMessages::Messages(MessagesBuilder::new().add_message(message).build())
    }
}

/// The model's answer, shaped for framework call sites.
#[derive(Debug, Clone)]
pub struct BridgeResponse {
    result: LLMResult,
}

impl BridgeResponse {
    /// Generated text. Empty when the model asked for a function call.
    pub fn content(&self) -> &str {
        self.result.text()
    }

    pub fn text(&self) -> &str {
        self.content()
    }

    pub fn tool_call(&self) -> Option<&ToolCallResult> {
        self.result.tool_call()
    }

    pub fn result(&self) -> &LLMResult {
        &self.result
    }

    pub fn into_result(self) -> LLMResult {
        self.result
    }
}

impl From<LLMResult> for BridgeResponse {
    fn from(result: LLMResult) -> Self {
        Self { result }
    }
}

pub struct Bridge;

impl Bridge {
    pub async fn call<T, I>(llm: &T, input: I) -> Result<BridgeResponse, LLMError>
    where
        T: LLM + ?Sized,
        I: Into<PromptOrMessages>,
    {
        let result = match input.into() {
            PromptOrMessages::Prompt(prompt) => {
                debug!("Bridge: complete: {}", prompt);
                llm.complete(&prompt).await?
            }
            PromptOrMessages::Messages(messages) => {
                debug!("Bridge: chat: {} messages", messages.messages.len());
                llm.chat(&messages).await?
            }
        };
        Ok(BridgeResponse::from(result))
    }
}

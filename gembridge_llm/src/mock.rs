use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::debug;

use crate::{
    Capabilities, Capability, CapabilityDecorator, ChatStream, GenerateResult, LLM, LLMError,
    LLMResult, Messages, Request, RequestConfig,
};

/// An adapter that answers with pre-configured results, in order.
///
/// Every request it receives is recorded, so tests can check what an agent
/// or crew actually sent. Clones share the script and the record.
#[derive(Clone)]
pub struct MockLLM {
    responses: Arc<Mutex<Vec<LLMResult>>>,
    requests: Arc<Mutex<Vec<Request>>>,
    capabilities: Capabilities,
    request_config: RequestConfig,
}

impl MockLLM {
    pub fn new(responses: Vec<LLMResult>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
            capabilities: Capabilities::all(),
            request_config: RequestConfig::default(),
        }
    }

    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|text| {
                    LLMResult::Generate(GenerateResult::new(text.as_ref().to_string(), None))
                })
                .collect(),
        )
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_response(&self, request: &Request) -> Result<LLMResult, LLMError> {
        if request.has_images() && !self.capabilities.contains(Capability::Multimodal) {
            return Err(LLMError::UnsupportedCapability(Capability::Multimodal));
        }
        self.requests
            .lock()
            .map_err(|e| LLMError::OtherError(e.to_string()))?
            .push(request.clone());

        let mut responses = self
            .responses
            .lock()
            .map_err(|e| LLMError::OtherError(e.to_string()))?;
        if responses.is_empty() {
            debug!("MockLLM script exhausted, answering with empty text");
            Ok(LLMResult::Generate(GenerateResult::default()))
        } else {
            Ok(responses.remove(0))
        }
    }
}

#[async_trait]
impl LLM for MockLLM {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn generate(&self, request: &Request) -> Result<LLMResult, LLMError> {
        self.next_response(request)
    }

    async fn invoke(&self, messages: &Messages) -> Result<LLMResult, LLMError> {
        let request = Request::new("mock", messages, &self.request_config)?;
        self.generate(&request).await
    }

    /// Streams a scripted text answer word by word.
    async fn invoke_stream(&self, messages: &Messages) -> Result<ChatStream, LLMError> {
        if !self.capabilities.contains(Capability::Streaming) {
            return Err(LLMError::UnsupportedCapability(Capability::Streaming));
        }
        let chunks: Vec<Result<LLMResult, LLMError>> = match self.invoke(messages).await? {
            LLMResult::Generate(result) => result
                .generation()
                .split_inclusive(' ')
                .map(|word| Ok(LLMResult::Generate(GenerateResult::new(word.to_string(), None))))
                .collect(),
            tool_call => vec![Ok(tool_call)],
        };
        Ok(Box::pin(tokio_stream::iter(chunks)))
    }
}

impl CapabilityDecorator for MockLLM {
    fn request_config(&self) -> &RequestConfig {
        &self.request_config
    }

    fn with_request_config(&self, request_config: RequestConfig) -> Self {
        Self {
            request_config,
            ..self.clone()
        }
    }
}

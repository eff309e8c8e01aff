use std::{
    pin::Pin,
    task::{Context, Poll},
};

use async_trait::async_trait;
use futures::{FutureExt, Stream, future::BoxFuture};
use log::{debug, warn};

use reqwest::header::CONTENT_TYPE;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt, retry::Never};

use crate::{
    Capabilities, Capability, CapabilityDecorator, ChatStream, GenerateResult, LLM, LLMError,
    LLMResult, Message, MessageType, Messages, Request, RequestConfig, TokenUsage, ToolCallResult,
};

use super::{GeminiConfig, GeminiContent, GeminiRequest, GeminiResponse, GeminiTool};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Adapter over the Gemini REST API.
///
/// The adapter is an immutable value: decorations from
/// [`CapabilityDecorator`] return a new `Gemini` and leave the original as it
/// was.
#[derive(Clone)]
pub struct Gemini {
    config: GeminiConfig,
    request_config: RequestConfig,
    client: reqwest::Client,
}

/// What [`Gemini::invoke_configured`] produced, depending on the streaming flag.
pub enum Invocation {
    Complete(LLMResult),
    Stream(ChatStream),
}

impl Gemini {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            request_config: RequestConfig::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn model(&self) -> String {
        self.config.model().to_string()
    }

    /// Honors the `streaming` flag set through `with_streaming`.
    pub async fn invoke_configured(&self, messages: &Messages) -> Result<Invocation, LLMError> {
        if self.request_config.streaming() {
            Ok(Invocation::Stream(self.invoke_stream(messages).await?))
        } else {
            Ok(Invocation::Complete(self.invoke(messages).await?))
        }
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base(),
            self.config.model(),
            method
        )
    }

    fn build_request(&self, messages: &Messages) -> Result<Request, LLMError> {
        Request::new(self.model(), messages, &self.request_config)
    }

    /// Validates `request` against this adapter and converts it to the wire
    /// format. Runs before any network traffic.
    fn build_gemini_request(&self, request: &Request) -> Result<GeminiRequest, LLMError> {
        let capabilities = self.capabilities();
        if request.has_images() && !capabilities.contains(Capability::Multimodal) {
            return Err(LLMError::UnsupportedCapability(Capability::Multimodal));
        }
        if !request.config().tools().is_empty()
            && !capabilities.contains(Capability::FunctionCalling)
        {
            return Err(LLMError::UnsupportedCapability(Capability::FunctionCalling));
        }

        let mut system_texts: Vec<String> = request
            .config()
            .system_instruction()
            .map(|instruction| vec![instruction.to_string()])
            .unwrap_or_default();
        let mut contents = Vec::new();
        for message in request.messages() {
            match message.message_type {
                MessageType::SystemMessage => system_texts.push(message.text()),
                _ => contents.push(GeminiContent::try_from(message)?),
            }
        }
        if contents.is_empty() {
            return Err(LLMError::InvalidRequestError(
                "a request needs at least one non-system message".to_string(),
            ));
        }
        if !system_texts.is_empty() && !capabilities.contains(Capability::SystemInstruction) {
            return Err(LLMError::UnsupportedCapability(
                Capability::SystemInstruction,
            ));
        }

        let system_instruction = if system_texts.is_empty() {
            None
        } else {
            Some(GeminiContent::system(&system_texts.join("\n\n")))
        };

        let generation = request.config().generation();
        let generation_config = if generation.is_empty() {
            None
        } else {
            Some(generation.clone())
        };

        let tools = if request.config().tools().is_empty() {
            None
        } else {
            Some(vec![GeminiTool {
                function_declarations: request.config().tools().to_vec(),
            }])
        };

        let gemini_request = GeminiRequest {
            model: format!("models/{}", request.model()),
            contents,
            system_instruction,
            generation_config,
            tools,
        };
        debug!(
            "Gemini Request json: {:?}",
            serde_json::to_string(&gemini_request)?
        );
        Ok(gemini_request)
    }

    fn event_source(&self, gemini_request: &GeminiRequest) -> Result<EventSource, LLMError> {
        let url = format!("{}?alt=sse", self.url("streamGenerateContent"));
        debug!("Gemini Stream Url: {:?}", url);
        let mut event_source = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.config.api_key())
            .body(serde_json::to_string(gemini_request)?)
            .eventsource()
            .map_err(|e| LLMError::OtherError(format!("cannot open event stream: {}", e)))?;
        event_source.set_retry_policy(Box::new(Never));
        Ok(event_source)
    }
}

#[async_trait]
impl LLM for Gemini {
    fn capabilities(&self) -> Capabilities {
        self.config.capabilities()
    }

    async fn generate(&self, request: &Request) -> Result<LLMResult, LLMError> {
        let gemini_request = self.build_gemini_request(request)?;
        let url = self.url("generateContent");
        debug!("Gemini Request Url: {:?}", url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.config.api_key())
            .body(serde_json::to_string(&gemini_request)?)
            .send()
            .await?;

        debug!("Gemini Response: {:?}", response);
        let status = response.status();
        let body_json = response.text().await?;
        debug!("Gemini Response Body: {:?}", body_json);

        if status.is_success() {
            let gemini_response: GeminiResponse = serde_json::from_str(&body_json)?;
            to_llm_result(&gemini_response)
        } else {
            Err(LLMError::UpstreamError {
                status: status.as_u16(),
                body: body_json,
            })
        }
    }

    async fn invoke(&self, messages: &Messages) -> Result<LLMResult, LLMError> {
        let request = self.build_request(messages)?;
        self.generate(&request).await
    }

    async fn invoke_stream(&self, messages: &Messages) -> Result<ChatStream, LLMError> {
        if !self.capabilities().contains(Capability::Streaming) {
            return Err(LLMError::UnsupportedCapability(Capability::Streaming));
        }
        let request = self.build_request(messages)?;
        let gemini_request = self.build_gemini_request(&request)?;
        let event_source = self.event_source(&gemini_request)?;
        Ok(Box::pin(GeminiEventStream::new(event_source)))
    }
}

impl CapabilityDecorator for Gemini {
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

fn to_token_usage(response: &GeminiResponse) -> Option<TokenUsage> {
    response.usage_metadata.as_ref().map(|usage| TokenUsage {
        prompt_tokens: usage.prompt_token_count,
        completion_tokens: usage.candidates_token_count,
        total_tokens: usage.total_token_count,
    })
}

fn to_llm_result(response: &GeminiResponse) -> Result<LLMResult, LLMError> {
    if response.candidates.is_empty() {
        return Err(LLMError::ContentNotFound("candidates[0]".to_string()));
    }
    if let Some(call) = response.function_call() {
        return Ok(LLMResult::ToolCall(ToolCallResult {
            name: call.name.clone(),
            arguments: call.args.clone(),
            ai_message: Message::new_function_call_message(&call.name, call.args.clone()),
        }));
    }
    Ok(LLMResult::Generate(GenerateResult::new(
        response.text(),
        to_token_usage(response),
    )))
}

/// Server-sent events of `streamGenerateContent`, one `LLMResult` per event.
///
/// A rejected stream yields a single `UpstreamError` carrying the response
/// body, as `generate` does, and then ends.
pub struct GeminiEventStream {
    event_source: EventSource,
    rejected: Option<BoxFuture<'static, LLMError>>,
    finished: bool,
}

impl GeminiEventStream {
    pub fn new(event_source: EventSource) -> Self {
        Self {
            event_source,
            rejected: None,
            finished: false,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.event_source.close();
    }
}

impl Stream for GeminiEventStream {
    type Item = Result<LLMResult, LLMError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.finished {
                return Poll::Ready(None);
            }
            if let Some(rejected) = self.rejected.as_mut() {
                let error = match rejected.poll_unpin(cx) {
                    Poll::Ready(error) => error,
                    Poll::Pending => return Poll::Pending,
                };
                self.rejected = None;
                self.finish();
                return Poll::Ready(Some(Err(error)));
            }
            let ev = match Pin::new(&mut self.event_source).poll_next(cx) {
                Poll::Ready(Some(ev)) => ev,
                Poll::Ready(None) => {
                    debug!("EventSource completed");
                    self.finished = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            };
            debug!("Received event: {:?}", ev);
            match ev {
                Ok(Event::Open) => {
                    debug!("Received Event::Open, waiting for Event::Message");
                    continue;
                }
                Ok(Event::Message(message)) => {
                    if message.data.trim().is_empty() {
                        continue;
                    }
                    // usage-only events carry no candidates
                    let result = serde_json::from_str::<GeminiResponse>(&message.data)
                        .map_err(LLMError::from)
                        .and_then(|response| {
                            if response.candidates.is_empty() {
                                Ok(LLMResult::Generate(GenerateResult::new(
                                    String::new(),
                                    to_token_usage(&response),
                                )))
                            } else {
                                to_llm_result(&response)
                            }
                        });
                    return Poll::Ready(Some(result));
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    debug!("reqwest_eventsource::Error::StreamEnded");
                    self.finish();
                    return Poll::Ready(None);
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    warn!("Gemini stream rejected with status {}", status);
                    let reason = status.canonical_reason().unwrap_or_default().to_string();
                    self.rejected = Some(
                        async move {
                            let body = match response.text().await {
                                Ok(body) if !body.is_empty() => body,
                                _ => reason,
                            };
                            LLMError::UpstreamError {
                                status: status.as_u16(),
                                body,
                            }
                        }
                        .boxed(),
                    );
                    continue;
                }
                Err(e) => {
                    warn!("Gemini stream error: {:?}", e);
                    self.finish();
                    return Poll::Ready(Some(Err(LLMError::from(e))));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Capabilities, Capability, CapabilityDecorator, LLM, LLMError, LLMResult, Message,
        Messages, MessagesBuilder, MultimodalRequestBuilder, Supports,
        gemini::{Gemini, GeminiConfigBuilder, GeminiModel, GeminiPart, Invocation},
    };

    use anyhow::Result;
    use futures::StreamExt;
    use httpmock::prelude::*;
    use serde_json::json;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const GENERATE_PATH: &str = "/models/gemini-2.0-flash-001:generateContent";
    const STREAM_PATH: &str = "/models/gemini-2.0-flash-001:streamGenerateContent";

    fn test_response() -> &'static str {
        r#"{"candidates":[{"content":{"parts":[{"text":"Neural networks learn weights."}],"role":"model"},"finishReason":"STOP","index":0}],"usageMetadata":{"promptTokenCount":6,"candidatesTokenCount":5,"totalTokenCount":11},"modelVersion":"gemini-2.0-flash-001"}"#
    }

    fn stream_body() -> &'static str {
        r#"data: {"candidates":[{"content":{"parts":[{"text":"Neural networks"}],"role":"model"},"index":0}]}

data: {"candidates":[{"content":{"parts":[{"text":" learn weights."}],"role":"model"},"finishReason":"STOP","index":0}],"usageMetadata":{"promptTokenCount":6,"candidatesTokenCount":5,"totalTokenCount":11}}

"#
    }

    fn mock_gemini_api(status: u16, body: &str) -> MockServer {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(GENERATE_PATH);
            then.status(status)
                .header("content-type", "application/json; charset=UTF-8")
                .body(body);
        });
        server
    }

    fn mock_gemini_stream_api(server: &MockServer, status: u16, body: &str) {
        server.mock(|when, then| {
            when.method(POST)
                .path(STREAM_PATH)
                .query_param("alt", "sse");
            then.status(status)
                .header("Content-Type", "text/event-stream")
                .body(body);
        });
    }

    fn build_gemini(api_base: &str, capabilities: Capabilities) -> Gemini {
        let config = GeminiConfigBuilder::new()
            .with_api_key("test_api_key")
            .with_api_base(api_base)
            .with_model(GeminiModel::Gemini20Flash)
            .with_capabilities(capabilities)
            .build()
            .unwrap();
        Gemini::new(config)
    }

    fn hello() -> Messages {
        MessagesBuilder::new()
            .add_human_message("Explain neural networks")
            .build()
    }

    #[test]
    fn test_build_gemini_request() {
        let gemini = build_gemini("http://localhost:8080", Capabilities::all())
            .with_system_instruction("You are a helpful AI assistant.")
            .unwrap()
            .with_model_config(&json!({"temperature": 0.7, "max_output_tokens": 2048}))
            .unwrap();
        let request = gemini.build_request(&hello()).unwrap();
        let wire = serde_json::to_value(gemini.build_gemini_request(&request).unwrap()).unwrap();
        assert_eq!(
            wire,
            json!({
                "model": "models/gemini-2.0-flash-001",
                "contents": [{"role": "user", "parts": [{"text": "Explain neural networks"}]}],
                "systemInstruction": {"parts": [{"text": "You are a helpful AI assistant."}]},
                "generationConfig": {"temperature": 0.7f32, "maxOutputTokens": 2048}
            })
        );
    }

    #[test]
    fn test_system_instruction_last_write_wins() {
        let gemini = build_gemini("http://localhost:8080", Capabilities::all())
            .with_system_instruction("You are a biology expert.")
            .unwrap()
            .with_system_instruction("You are a computer science expert.")
            .unwrap();
        let request = gemini.build_request(&hello()).unwrap();
        let wire = gemini.build_gemini_request(&request).unwrap();
        assert_eq!(
            wire.system_instruction.unwrap().parts,
            vec![GeminiPart::Text {
                text: "You are a computer science expert.".to_string()
            }]
        );
    }

    #[test]
    fn test_system_messages_join_system_instruction() {
        let gemini = build_gemini("http://localhost:8080", Capabilities::all())
            .with_system_instruction("Be precise.")
            .unwrap();
        let messages = MessagesBuilder::new()
            .add_system_message("Answer in English.")
            .add_human_message("hi")
            .build();
        let request = gemini.build_request(&messages).unwrap();
        let wire = gemini.build_gemini_request(&request).unwrap();
        assert_eq!(wire.contents.len(), 1);
        assert_eq!(
            wire.system_instruction.unwrap(),
            super::GeminiContent::system("Be precise.\n\nAnswer in English.")
        );
    }

    #[test]
    fn test_multimodal_request_keeps_order() {
        let gemini = build_gemini("http://localhost:8080", Capabilities::all());
        let blocks = json!([
            {"type": "text", "text": "What's in this image?"},
            {"type": "image_url", "image_url": {"url": "https://example.com/scones.jpg"}}
        ]);
        let messages = MessagesBuilder::new()
            .add_message(MultimodalRequestBuilder::from_blocks(&blocks).unwrap().build_message())
            .build();
        let request = gemini.build_request(&messages).unwrap();
        let wire = serde_json::to_value(gemini.build_gemini_request(&request).unwrap()).unwrap();
        assert_eq!(
            wire["contents"][0]["parts"],
            json!([
                {"text": "What's in this image?"},
                {"fileData": {"mimeType": "image/jpeg", "fileUri": "https://example.com/scones.jpg"}}
            ])
        );
    }

    #[test]
    fn test_function_declarations_in_request() {
        let gemini = build_gemini("http://localhost:8080", Capabilities::all())
            .bind_functions(&json!([{
                "name": "get_weather",
                "description": "Get current weather for a location",
                "parameters": {
                    "type": "object",
                    "properties": {"location": {"type": "string", "description": "City name"}},
                    "required": ["location"]
                }
            }]))
            .unwrap();
        let request = gemini.build_request(&hello()).unwrap();
        let wire = serde_json::to_value(gemini.build_gemini_request(&request).unwrap()).unwrap();
        assert_eq!(
            wire["tools"][0]["functionDeclarations"][0]["name"],
            json!("get_weather")
        );

        let cleared = gemini.clear_functions();
        let request = cleared.build_request(&hello()).unwrap();
        assert!(cleared.build_gemini_request(&request).unwrap().tools.is_none());
    }

    #[test]
    fn test_basic_adapter_rejects_missing_capabilities() {
        let basic = build_gemini("http://localhost:8080", Capabilities::basic());
        assert!(!basic.supports(Capability::FunctionCalling));
        assert!(!basic.supports(Capability::Multimodal));
        assert!(basic.supports(Capability::Streaming));

        let err = basic
            .bind_functions(&json!([{"name": "search", "description": "Search the web", "parameters": {"type": "object"}}]))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            LLMError::UnsupportedCapability(Capability::FunctionCalling)
        ));

        let err = basic.with_system_instruction("hi").err().unwrap();
        assert!(matches!(
            err,
            LLMError::UnsupportedCapability(Capability::SystemInstruction)
        ));

        let messages = MessagesBuilder::new()
            .add_message(
                MultimodalRequestBuilder::new()
                    .add_text("Describe this image")
                    .add_image_url("https://example.com/a.png")
                    .build_message(),
            )
            .build();
        let request = basic.build_request(&messages).unwrap();
        assert!(matches!(
            basic.build_gemini_request(&request),
            Err(LLMError::UnsupportedCapability(Capability::Multimodal))
        ));
    }

    #[test]
    fn test_decorations_do_not_touch_the_original() {
        let plain = build_gemini("http://localhost:8080", Capabilities::all());
        let tech = plain
            .with_system_instruction("You are a computer science expert.")
            .unwrap();
        assert_eq!(plain.request_config().system_instruction(), None);
        assert_eq!(
            tech.request_config().system_instruction(),
            Some("You are a computer science expert.")
        );
    }

    // RUST_LOG=debug cargo test -p gembridge_llm gemini::llm::tests::test_invoke -- --nocapture --exact
    #[tokio::test]
    async fn test_invoke() -> Result<()> {
        init_logger();
        let server = mock_gemini_api(200, test_response());
        let gemini = build_gemini(&server.url(""), Capabilities::all());

        let result = gemini.invoke(&hello()).await?;

        match result {
            LLMResult::Generate(result) => {
                assert_eq!(result.generation(), "Neural networks learn weights.");
                assert_eq!(result.tokens().unwrap().total_tokens, 11);
            }
            _ => panic!("Expected Generate result"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_invoke_sends_api_key_and_system_instruction() -> Result<()> {
        init_logger();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(GENERATE_PATH)
                .header("x-goog-api-key", "test_api_key")
                .body_includes("\"systemInstruction\":{\"parts\":[{\"text\":\"second\"}]}");
            then.status(200)
                .header("content-type", "application/json")
                .body(test_response());
        });
        let gemini = build_gemini(&server.url(""), Capabilities::all())
            .with_system_instruction("first")?
            .with_system_instruction("second")?;
        gemini.invoke(&hello()).await?;
        mock.assert();
        Ok(())
    }

    // RUST_LOG=debug cargo test -p gembridge_llm gemini::llm::tests::test_invoke_error -- --nocapture --exact
    #[tokio::test]
    async fn test_invoke_error() -> Result<()> {
        init_logger();
        let error_response = r#"
    {
        "error": {
            "code": 401,
            "message": "API key not valid. Please pass a valid API key.",
            "status": "UNAUTHENTICATED"
        }
    }
    "#;
        let server = mock_gemini_api(401, error_response);
        let gemini = build_gemini(&server.url(""), Capabilities::all());
        let err = gemini.invoke(&hello()).await.unwrap_err();
        assert!(err.is_upstream());
        match err {
            LLMError::UpstreamError { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("UNAUTHENTICATED"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_call() -> Result<()> {
        init_logger();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200).body(test_response());
        });
        let gemini = build_gemini(&server.url(""), Capabilities::all());

        let err = gemini.invoke(&Messages::default()).await.unwrap_err();
        assert!(matches!(err, LLMError::InvalidRequestError(_)));

        assert!(matches!(
            gemini.with_model_config(&json!({"temperature": 0.5, "seed": 3})),
            Err(LLMError::InvalidConfigError(_))
        ));

        mock.assert_hits(0);
        Ok(())
    }

    #[tokio::test]
    async fn test_invoke_function_call() -> Result<()> {
        init_logger();
        let body = r#"{"candidates":[{"content":{"parts":[{"functionCall":{"name":"get_weather","args":{"location":"San Francisco"}}}],"role":"model"},"finishReason":"STOP","index":0}]}"#;
        let server = mock_gemini_api(200, body);
        let gemini = build_gemini(&server.url(""), Capabilities::all());
        let result = gemini.complete("What's the weather like in San Francisco?").await?;
        let tool_call = result.tool_call().expect("Expected ToolCall result");
        assert_eq!(tool_call.name, "get_weather");
        assert_eq!(tool_call.arguments, json!({"location": "San Francisco"}));
        assert_eq!(
            tool_call.ai_message,
            Message::new_function_call_message("get_weather", json!({"location": "San Francisco"}))
        );
        Ok(())
    }

    // RUST_LOG=debug cargo test -p gembridge_llm gemini::llm::tests::test_invoke_stream -- --exact
    #[tokio::test]
    async fn test_invoke_stream() -> Result<()> {
        init_logger();
        let server = MockServer::start();
        mock_gemini_stream_api(&server, 200, stream_body());
        let gemini = build_gemini(&server.url(""), Capabilities::all());
        let mut stream = gemini.invoke_stream(&hello()).await?;

        let mut expected_values = vec!["Neural networks", " learn weights."];
        while let Some(result) = stream.next().await {
            let delta = result?;
            match delta {
                LLMResult::Generate(delta) => {
                    assert_eq!(delta.generation(), expected_values.remove(0));
                }
                _ => panic!("Expected Generate result"),
            }
        }
        assert!(expected_values.is_empty());
        assert!(stream.next().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_stream_matches_invoke() -> Result<()> {
        init_logger();
        let server = mock_gemini_api(200, test_response());
        mock_gemini_stream_api(&server, 200, stream_body());
        let gemini = build_gemini(&server.url(""), Capabilities::all());

        let complete = gemini.invoke(&hello()).await?;
        let streamed = gemini.invoke_stream_one_result(&hello()).await?;
        assert_eq!(streamed.text(), complete.text());
        Ok(())
    }

    #[tokio::test]
    async fn test_invoke_configured_follows_streaming_flag() -> Result<()> {
        init_logger();
        let server = mock_gemini_api(200, test_response());
        mock_gemini_stream_api(&server, 200, stream_body());
        let gemini = build_gemini(&server.url(""), Capabilities::all());

        match gemini.invoke_configured(&hello()).await? {
            Invocation::Complete(result) => {
                assert_eq!(result.text(), "Neural networks learn weights.")
            }
            Invocation::Stream(_) => panic!("streaming is off by default"),
        }

        let streaming = gemini.with_streaming(true)?;
        match streaming.invoke_configured(&hello()).await? {
            Invocation::Stream(stream) => {
                let chunks: Vec<_> = stream.collect().await;
                assert_eq!(chunks.len(), 2);
            }
            Invocation::Complete(_) => panic!("expected a stream"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_invoke_stream_error_status() -> Result<()> {
        init_logger();
        let server = MockServer::start();
        mock_gemini_stream_api(&server, 429, r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#);
        let gemini = build_gemini(&server.url(""), Capabilities::all());
        let mut stream = gemini.invoke_stream(&hello()).await?;
        match stream.next().await {
            Some(Err(LLMError::UpstreamError { status, body })) => {
                assert_eq!(status, 429);
                assert!(body.contains("RESOURCE_EXHAUSTED"));
            }
            other => panic!("unexpected item {:?}", other.map(|r| r.map(|v| v.text().to_string()))),
        }
        assert!(stream.next().await.is_none());
        Ok(())
    }
}

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ContentPart, LLMError, Message, MessageType};

/// Struct `ImageUrl` is the `image_url` payload of an image block.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl<S: AsRef<str>> From<S> for ImageUrl {
    fn from(url: S) -> Self {
        ImageUrl {
            url: url.as_ref().into(),
            detail: None,
        }
    }
}

/// A caller-facing content block, in the shape chat frameworks pass around:
/// `{"type": "text", "text": ...}` or `{"type": "image_url", "image_url": {"url": ...}}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentBlock {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn image_url<S: AsRef<str>>(url: S) -> Self {
        ContentBlock::ImageUrl {
            image_url: url.into(),
        }
    }

    /// Parses one block out of loosely typed JSON.
    ///
    /// Unknown `type` values are rejected with `UnsupportedContentTypeError`,
    /// structurally broken blocks with `InvalidRequestError`.
    pub fn from_value(value: &Value) -> Result<Self, LLMError> {
        let object = value.as_object().ok_or_else(|| {
            LLMError::InvalidRequestError(format!("content block must be an object: {}", value))
        })?;
        let block_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                LLMError::InvalidRequestError("content block is missing `type`".to_string())
            })?;

        match block_type {
            "text" => {
                let text = object.get("text").and_then(Value::as_str).ok_or_else(|| {
                    LLMError::InvalidRequestError("text block is missing `text`".to_string())
                })?;
                Ok(ContentBlock::text(text))
            }
            "image_url" => {
                let image_url = match object.get("image_url") {
                    Some(Value::String(url)) => ImageUrl::from(url),
                    Some(Value::Object(inner)) => {
                        let url = inner.get("url").and_then(Value::as_str).ok_or_else(|| {
                            LLMError::InvalidRequestError(
                                "image_url block is missing `image_url.url`".to_string(),
                            )
                        })?;
                        ImageUrl {
                            url: url.to_string(),
                            detail: inner
                                .get("detail")
                                .and_then(Value::as_str)
                                .map(str::to_string),
                        }
                    }
                    _ => {
                        return Err(LLMError::InvalidRequestError(
                            "image_url block is missing `image_url`".to_string(),
                        ));
                    }
                };
                Ok(ContentBlock::ImageUrl { image_url })
            }
            other => Err(LLMError::UnsupportedContentTypeError(other.to_string())),
        }
    }
}

impl From<ContentBlock> for ContentPart {
    fn from(block: ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => ContentPart::Text { text },
            ContentBlock::ImageUrl { image_url } => ContentPart::ImageUrl { url: image_url.url },
        }
    }
}

/// Normalizes heterogeneous text/image blocks into message content parts.
///
/// ```rust,ignore
/// let parts = MultimodalRequestBuilder::new()
///     .add_text("What's in this image?")
///     .add_image_url("https://storage.googleapis.com/generativeai-downloads/images/scones.jpg")
///     .build();
/// ```
#[derive(Debug, Default, Clone)]
pub struct MultimodalRequestBuilder {
    parts: Vec<ContentPart>,
}

impl MultimodalRequestBuilder {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Builds from a JSON array of blocks.
    pub fn from_blocks(blocks: &Value) -> Result<Self, LLMError> {
        let blocks = blocks.as_array().ok_or_else(|| {
            LLMError::InvalidRequestError("content blocks must be a JSON array".to_string())
        })?;
        blocks
            .iter()
            .try_fold(Self::new(), |builder, block| builder.add_value(block))
    }

    pub fn add_block(mut self, block: ContentBlock) -> Self {
        self.parts.push(block.into());
        self
    }

    pub fn add_value(self, value: &Value) -> Result<Self, LLMError> {
        let block = ContentBlock::from_value(value)?;
        Ok(self.add_block(block))
    }

    pub fn add_text(mut self, text: &str) -> Self {
        self.parts.push(ContentPart::text(text));
        self
    }

    pub fn add_image_url(mut self, url: &str) -> Self {
        self.parts.push(ContentPart::image_url(url));
        self
    }

    pub fn add_image_bytes(mut self, mime_type: &str, data: Vec<u8>) -> Self {
        self.parts.push(ContentPart::ImageBytes {
            mime_type: mime_type.to_string(),
            data,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn build(self) -> Vec<ContentPart> {
        debug!("Multimodal content parts: {}", self.parts.len());
        self.parts
    }

    pub fn build_message(self) -> Message {
        Message::new(MessageType::HumanMessage, self.build())
    }
}

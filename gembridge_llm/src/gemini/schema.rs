use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ContentPart, FunctionDeclaration, LLMError, Message, MessageType, ModelConfig};

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiBlob {
    pub mime_type: String,
    /// base64 encoded
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiFileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeminiFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeminiFunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiBlob,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: GeminiFileData,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GeminiFunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: GeminiFunctionResponse,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub model: String,
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<ModelConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    pub finish_reason: Option<String>,
    pub index: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Body of `generateContent`, and of each `streamGenerateContent` SSE event.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub model_version: Option<String>,
}

impl GeminiResponse {
    pub fn first_parts(&self) -> &[GeminiPart] {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or(&[])
    }

    pub fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|part| match part {
                GeminiPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn function_call(&self) -> Option<&GeminiFunctionCall> {
        self.first_parts().iter().find_map(|part| match part {
            GeminiPart::FunctionCall { function_call } => Some(function_call),
            _ => None,
        })
    }
}

impl TryFrom<&ContentPart> for GeminiPart {
    type Error = LLMError;

    fn try_from(part: &ContentPart) -> Result<Self, Self::Error> {
        Ok(match part {
            ContentPart::Text { text } => GeminiPart::Text { text: text.clone() },
            ContentPart::ImageUrl { url } => image_url_part(url)?,
            ContentPart::ImageBytes { mime_type, data } => GeminiPart::InlineData {
                inline_data: GeminiBlob {
                    mime_type: mime_type.clone(),
                    data: STANDARD.encode(data),
                },
            },
            ContentPart::FunctionCall { name, args } => GeminiPart::FunctionCall {
                function_call: GeminiFunctionCall {
                    name: name.clone(),
                    args: args.clone(),
                },
            },
            ContentPart::FunctionResponse { name, response } => GeminiPart::FunctionResponse {
                function_response: GeminiFunctionResponse {
                    name: name.clone(),
                    response: response.clone(),
                },
            },
        })
    }
}

/// `data:` URLs are sent inline, anything else by reference.
fn image_url_part(url: &str) -> Result<GeminiPart, LLMError> {
    if let Some(rest) = url.strip_prefix("data:") {
        let (header, data) = rest.split_once(',').ok_or_else(|| {
            LLMError::InvalidRequestError("malformed data URL: missing `,`".to_string())
        })?;
        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            LLMError::InvalidRequestError("only base64 data URLs are supported".to_string())
        })?;
        let mime_type = if mime_type.is_empty() {
            DEFAULT_IMAGE_MIME
        } else {
            mime_type
        };
        return Ok(GeminiPart::InlineData {
            inline_data: GeminiBlob {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            },
        });
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let mime_type = mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
    Ok(GeminiPart::FileData {
        file_data: GeminiFileData {
            mime_type,
            file_uri: url.to_string(),
        },
    })
}

fn role(message_type: &MessageType) -> &'static str {
    match message_type {
        MessageType::AIMessage => "model",
        // function responses travel in user turns
        MessageType::HumanMessage | MessageType::ToolMessage => "user",
        MessageType::SystemMessage => "system",
    }
}

impl TryFrom<&Message> for GeminiContent {
    type Error = LLMError;

    fn try_from(message: &Message) -> Result<Self, Self::Error> {
        let parts = message
            .parts
            .iter()
            .map(GeminiPart::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GeminiContent {
            role: Some(role(&message.message_type).to_string()),
            parts,
        })
    }
}

impl GeminiContent {
    pub fn system(text: &str) -> Self {
        GeminiContent {
            role: None,
            parts: vec![GeminiPart::Text {
                text: text.to_string(),
            }],
        }
    }
}

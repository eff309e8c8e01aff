use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Enum `MessageType` represents the type of a message.
///
/// # Usage
/// ```rust,ignore
/// let system_message_type = MessageType::SystemMessage;
/// let ai_message_type = MessageType::AIMessage;
/// let human_message_type = MessageType::HumanMessage;
/// ```
#[derive(PartialEq, Eq, Serialize, Deserialize, Debug, Clone)]
pub enum MessageType {
    #[serde(rename = "system")]
    SystemMessage,
    #[serde(rename = "ai")]
    AIMessage,
    #[serde(rename = "human")]
    HumanMessage,
    #[serde(rename = "tool")]
    ToolMessage,
}

impl Default for MessageType {
    fn default() -> Self {
        Self::HumanMessage
    }
}

impl MessageType {
    pub fn to_string(&self) -> String {
        match self {
            MessageType::SystemMessage => "system".to_owned(),
            MessageType::AIMessage => "ai".to_owned(),
            MessageType::HumanMessage => "human".to_owned(),
            MessageType::ToolMessage => "tool".to_owned(),
        }
    }
}

/// One unit of message content. Parts keep the order the caller gave them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ImageUrl {
        url: String,
    },
    ImageBytes {
        mime_type: String,
        data: Vec<u8>,
    },
    FunctionCall {
        name: String,
        args: Value,
    },
    FunctionResponse {
        name: String,
        response: Value,
    },
}

impl ContentPart {
    pub fn text<T: std::fmt::Display>(text: T) -> Self {
        ContentPart::Text {
            text: text.to_string(),
        }
    }

    pub fn image_url<S: Into<String>>(url: S) -> Self {
        ContentPart::ImageUrl { url: url.into() }
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self,
            ContentPart::ImageUrl { .. } | ContentPart::ImageBytes { .. }
        )
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Struct `Message` represents a message with its content parts and type.
///
/// # Usage
/// ```rust,ignore
/// let human_message = Message::new_human_message("Hello");
/// let system_message = Message::new_system_message("System Alert");
/// let ai_message = Message::new_ai_message("AI Response");
/// ```
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Message {
    #[serde(rename = "role")]
    pub message_type: MessageType,
    pub parts: Vec<ContentPart>,
}

impl Message {
    pub fn new<P: Into<Vec<ContentPart>>>(message_type: MessageType, parts: P) -> Self {
        Message {
            message_type,
            parts: parts.into(),
        }
    }

    pub fn new_human_message<T: std::fmt::Display>(content: T) -> Self {
        Self::new(MessageType::HumanMessage, vec![ContentPart::text(content)])
    }

    pub fn new_human_message_with_parts(parts: Vec<ContentPart>) -> Self {
        Self::new(MessageType::HumanMessage, parts)
    }

    pub fn new_system_message<T: std::fmt::Display>(content: T) -> Self {
        Self::new(MessageType::SystemMessage, vec![ContentPart::text(content)])
    }

    pub fn new_ai_message<T: std::fmt::Display>(content: T) -> Self {
        Self::new(MessageType::AIMessage, vec![ContentPart::text(content)])
    }

    pub fn new_function_call_message<S: Into<String>>(name: S, args: Value) -> Self {
        Self::new(
            MessageType::AIMessage,
            vec![ContentPart::FunctionCall {
                name: name.into(),
                args,
            }],
        )
    }

    pub fn new_tool_message<S: Into<String>>(name: S, response: Value) -> Self {
        Self::new(
            MessageType::ToolMessage,
            vec![ContentPart::FunctionResponse {
                name: name.into(),
                response,
            }],
        )
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn has_images(&self) -> bool {
        self.parts.iter().any(ContentPart::is_image)
    }

    pub fn messages_from_value(value: &Value) -> Result<Vec<Message>, serde_json::error::Error> {
        serde_json::from_value(value.clone())
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Messages {
    pub messages: Vec<Message>,
}

impl Messages {
    pub fn builder() -> MessagesBuilder {
        MessagesBuilder::new()
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_images(&self) -> bool {
        self.messages.iter().any(Message::has_images)
    }
}

impl AsRef<[Message]> for Messages {
    fn as_ref(&self) -> &[Message] {
        &self.messages
    }
}

impl From<Vec<Message>> for Messages {
    fn from(messages: Vec<Message>) -> Self {
        Messages { messages }
    }
}

pub struct MessagesBuilder {
    messages: Vec<Message>,
}

impl MessagesBuilder {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn add_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn add_human_message(mut self, content: &str) -> Self {
        self.messages.push(Message::new_human_message(content));
        self
    }

    pub fn add_human_parts(mut self, parts: Vec<ContentPart>) -> Self {
        self.messages
            .push(Message::new_human_message_with_parts(parts));
        self
    }

    pub fn add_system_message(mut self, content: &str) -> Self {
        self.messages.push(Message::new_system_message(content));
        self
    }

    pub fn add_ai_message(mut self, content: &str) -> Self {
        self.messages.push(Message::new_ai_message(content));
        self
    }

    pub fn build(self) -> Messages {
        Messages {
            messages: self.messages,
        }
    }
}

impl Default for MessagesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_builder_keeps_order() {
        let messages = MessagesBuilder::new()
            .add_system_message("be brief")
            .add_human_message("hello")
            .add_ai_message("hi")
            .build();
        let types: Vec<MessageType> = messages
            .messages
            .iter()
            .map(|m| m.message_type.clone())
            .collect();
        assert_eq!(
            types,
            vec![
                MessageType::SystemMessage,
                MessageType::HumanMessage,
                MessageType::AIMessage
            ]
        );
        assert_eq!(messages.messages[1].text(), "hello");
        assert!(!messages.has_images());
    }

    #[test]
    fn test_message_text_skips_non_text_parts() {
        let message = Message::new_human_message_with_parts(vec![
            ContentPart::text("What's in "),
            ContentPart::image_url("https://example.com/a.png"),
            ContentPart::text("this image?"),
        ]);
        assert_eq!(message.text(), "What's in this image?");
        assert!(message.has_images());
    }

    #[test]
    fn test_messages_from_value() {
        let value = json!([
            {"role": "human", "parts": [{"type": "text", "text": "hello"}]},
            {"role": "ai", "parts": [{"type": "function_call", "name": "f", "args": {"a": 1}}]}
        ]);
        let messages = Message::messages_from_value(&value).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::new_human_message("hello"));
        assert_eq!(
            messages[1],
            Message::new_function_call_message("f", json!({"a": 1}))
        );
    }
}

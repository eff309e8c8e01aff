use reqwest::Error as ReqwestError;
use reqwest_eventsource::Error as EventSourceError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::Capability;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("Network request failed: {0}")]
    RequestError(#[from] ReqwestError),

    #[error("Gemini API error: {status} - {body}")]
    UpstreamError { status: u16, body: String },

    #[error("EventSourceError: {0}")]
    EventSourceError(#[from] EventSourceError),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeError(#[from] SerdeJsonError),

    #[error("Invalid request: {0}")]
    InvalidRequestError(String),

    #[error("Invalid model config: {0}")]
    InvalidConfigError(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentTypeError(String),

    #[error("Capability not supported by this adapter: {0}")]
    UnsupportedCapability(Capability),

    #[error("Content not found in response: Expected at {0}")]
    ContentNotFound(String),

    #[error("Error: {0}")]
    OtherError(String),

    #[error("Any error: {0}")]
    AnyhowError(#[from] anyhow::Error),
}

impl LLMError {
    /// Network, auth, rate-limit and stream failures reported by the remote side.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            LLMError::RequestError(_) | LLMError::UpstreamError { .. } | LLMError::EventSourceError(_)
        )
    }

    /// Errors raised while validating caller input, before any request is sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LLMError::InvalidRequestError(_)
                | LLMError::InvalidConfigError(_)
                | LLMError::UnsupportedContentTypeError(_)
                | LLMError::UnsupportedCapability(_)
        )
    }
}

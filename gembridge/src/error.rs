use gembridge_llm::LLMError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    LLMError(#[from] LLMError),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool `{name}` failed: {message}")]
    ToolError { name: String, message: String },

    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    #[error("Model asked for `{0}` again after the tool round trip")]
    UnresolvedToolCall(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Duplicate task: {0}")]
    DuplicateTask(String),

    #[error("Task dependencies form a cycle at `{0}`")]
    DependencyCycle(String),
}

impl AgentError {
    /// True for failures reported by the model API itself.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AgentError::LLMError(e) if e.is_upstream())
    }
}

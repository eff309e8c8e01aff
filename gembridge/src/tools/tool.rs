use anyhow::Result;
use async_trait::async_trait;
use gembridge_llm::{FunctionDeclaration, LLMError, tools::Parameters};
use serde_json::Value;

/// A local function the model may ask an agent to run.
#[async_trait]
pub trait FunTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> Parameters;

    /// Runs the tool with the arguments the model produced. The returned
    /// value is sent back as the function response.
    async fn call(&self, input: &Value) -> Result<Value>;

    fn to_declaration(&self) -> Result<FunctionDeclaration, LLMError> {
        FunctionDeclaration::new(self.name(), self.description(), self.parameters())
    }
}

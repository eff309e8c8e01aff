use gembridge_llm::FunctionDeclaration;
use log::debug;
use serde_json::Value;

use crate::{AgentError, tools::FunTool};

/// Tools registered with an agent, in registration order.
#[derive(Default)]
pub struct ToolSet {
    tools: Vec<Box<dyn FunTool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool<A: FunTool + 'static>(mut self, tool: A) -> Result<Self, AgentError> {
        self.add(Box::new(tool))?;
        Ok(self)
    }

    pub fn add(&mut self, tool: Box<dyn FunTool>) -> Result<(), AgentError> {
        if self.get(tool.name()).is_some() {
            return Err(AgentError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn FunTool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn declarations(&self) -> Result<Vec<FunctionDeclaration>, AgentError> {
        self.tools
            .iter()
            .map(|tool| tool.to_declaration().map_err(AgentError::from))
            .collect()
    }

    pub async fn call(&self, name: &str, arguments: &Value) -> Result<Value, AgentError> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        debug!("Calling tool {} with {}", name, arguments);
        tool.call(arguments)
            .await
            .map_err(|e| AgentError::ToolError {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

use async_trait::async_trait;
use gembridge_llm::{CapabilityDecorator, LLM, LLMResult, Message, Messages};
use log::{debug, info};

use crate::{
    AgentError,
    bridge::PromptOrMessages,
    tools::{FunTool, ToolSet},
};

/// Who an agent is. Rendered into the adapter's system instruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentConfig {
    pub fn new(role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}.\nYour goal: {}\nBackstory: {}",
            self.role, self.goal, self.backstory
        )
    }
}

/// One request to the model and what it answered.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub request: Messages,
    pub response: LLMResult,
}

#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub final_answer: String,
    pub intermediate_steps: Vec<Conversation>,
}

/// Anything a crew can hand a task to. The task arrives as the human turn,
/// text and image parts included.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    fn role(&self) -> &str;
    async fn execute_task(&self, task: Messages) -> Result<AgentResponse, AgentError>;
}

pub struct Agent<T>
where
    T: CapabilityDecorator,
{
    llm: T,
    config: AgentConfig,
    tools: ToolSet,
}

impl<T> Agent<T>
where
    T: CapabilityDecorator,
{
    pub fn builder(llm: T, config: AgentConfig) -> AgentBuilder<T> {
        AgentBuilder::new(llm, config)
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn llm(&self) -> &T {
        &self.llm
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Runs one task, given as a prompt or as messages (e.g. built from
    /// content blocks). A function call from the model is answered once by
    /// the matching tool; the model's follow-up is the final answer.
    pub async fn execute_task<I>(&self, task: I) -> Result<AgentResponse, AgentError>
    where
        I: Into<PromptOrMessages>,
    {
        let mut messages = task.into().into_messages();
        info!("Agent `{}` executing task", self.config.role);
        debug!("Agent task: {:?}", messages);
        let result = self.llm.invoke(&messages).await?;
        let mut conversations = vec![Conversation {
            request: messages.clone(),
            response: result.clone(),
        }];

        let tool_call = match result {
            LLMResult::Generate(result) => {
                return Ok(AgentResponse {
                    final_answer: result.generation().to_string(),
                    intermediate_steps: conversations,
                });
            }
            LLMResult::ToolCall(tool_call) => tool_call,
        };

        debug!("Agent tool call: {:?}", tool_call);
        let output = self.tools.call(&tool_call.name, &tool_call.arguments).await?;
        messages.add_message(tool_call.ai_message.clone());
        messages.add_message(Message::new_tool_message(&tool_call.name, output));

        let result = self.llm.invoke(&messages).await?;
        conversations.push(Conversation {
            request: messages,
            response: result.clone(),
        });
        match result {
            LLMResult::Generate(result) => Ok(AgentResponse {
                final_answer: result.generation().to_string(),
                intermediate_steps: conversations,
            }),
            LLMResult::ToolCall(again) => Err(AgentError::UnresolvedToolCall(again.name)),
        }
    }
}

#[async_trait]
impl<T> TaskRunner for Agent<T>
where
    T: CapabilityDecorator,
{
    fn role(&self) -> &str {
        &self.config.role
    }

    async fn execute_task(&self, task: Messages) -> Result<AgentResponse, AgentError> {
        Agent::execute_task(self, task).await
    }
}

pub struct AgentBuilder<T>
where
    T: CapabilityDecorator,
{
    llm: T,
    config: AgentConfig,
    tools: ToolSet,
}

impl<T> AgentBuilder<T>
where
    T: CapabilityDecorator,
{
    pub fn new(llm: T, config: AgentConfig) -> Self {
        AgentBuilder {
            llm,
            config,
            tools: ToolSet::new(),
        }
    }

    pub fn with_tool<A: FunTool + 'static>(mut self, tool: A) -> Result<Self, AgentError> {
        self.tools.add(Box::new(tool))?;
        Ok(self)
    }

    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    /// Puts the persona in front of any system instruction the adapter
    /// already carries, and binds the tools.
    ///
    /// The persona always travels as a system instruction, so an adapter
    /// without `SystemInstruction` (e.g. one built with
    /// `Capabilities::basic()`) cannot back an agent, even a text-only one:
    /// `build` fails with `UnsupportedCapability(SystemInstruction)`. Tools
    /// likewise need `FunctionCalling`.
    pub fn build(self) -> Result<Agent<T>, AgentError> {
        let persona = self.config.system_prompt();
        let instruction = match self.llm.request_config().system_instruction() {
            Some(existing) => format!("{}\n\n{}", persona, existing),
            None => persona,
        };
        let mut llm = self.llm.with_system_instruction(&instruction)?;
        if !self.tools.is_empty() {
            llm = llm.with_declarations(self.tools.declarations()?)?;
        }
        Ok(Agent {
            llm,
            config: self.config,
            tools: self.tools,
        })
    }
}

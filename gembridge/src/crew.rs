use std::{collections::HashMap, sync::Arc};

use gembridge_llm::{ContentPart, Message, MessageType, Messages};
use log::{debug, info};
use petgraph::{Graph, algo::toposort, graph::NodeIndex};

use crate::{
    AgentError,
    agent::{AgentResponse, TaskRunner},
    bridge::PromptOrMessages,
};

/// A unit of work for one agent. The description is a prompt or a list of
/// content blocks; `context` names tasks whose outputs are appended to it.
#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub description: Messages,
    pub expected_output: Option<String>,
    pub agent: Arc<dyn TaskRunner>,
    pub context: Vec<String>,
}

impl Task {
    pub fn new<I>(name: &str, description: I, agent: Arc<dyn TaskRunner>) -> Self
    where
        I: Into<PromptOrMessages>,
    {
        Self {
            name: name.to_string(),
            description: description.into().into_messages(),
            expected_output: None,
            agent,
            context: Vec::new(),
        }
    }

    pub fn with_expected_output(mut self, expected_output: &str) -> Self {
        self.expected_output = Some(expected_output.to_string());
        self
    }

    pub fn with_context(mut self, task_name: &str) -> Self {
        self.context.push(task_name.to_string());
        self
    }

    /// The description with the expected output and context outputs added
    /// as trailing text parts of the last human turn.
    fn prompt(&self, context: &[(&str, &str)]) -> Messages {
        let mut extra = Vec::new();
        if let Some(expected_output) = &self.expected_output {
            extra.push(ContentPart::text(format!(
                "\n\nExpected output: {}",
                expected_output
            )));
        }
        for (name, output) in context {
            extra.push(ContentPart::text(format!(
                "\n\nContext from {}:\n{}",
                name, output
            )));
        }

        let mut prompt = self.description.clone();
        if extra.is_empty() {
            return prompt;
        }
        match prompt
            .messages
            .iter_mut()
            .rev()
            .find(|message| message.message_type == MessageType::HumanMessage)
        {
            Some(message) => message.parts.extend(extra),
            None => prompt.add_message(Message::new_human_message_with_parts(extra)),
        }
        prompt
    }
}

#[derive(Debug, Clone)]
pub struct TaskOutput {
    pub name: String,
    pub role: String,
    pub response: AgentResponse,
}

impl TaskOutput {
    pub fn output(&self) -> &str {
        &self.response.final_answer
    }
}

/// Outputs in the order the tasks ran.
#[derive(Debug, Clone, Default)]
pub struct CrewOutput {
    pub tasks: Vec<TaskOutput>,
}

impl CrewOutput {
    /// Output of the last task run.
    pub fn final_output(&self) -> Option<&str> {
        self.tasks.last().map(TaskOutput::output)
    }

    pub fn get(&self, name: &str) -> Option<&TaskOutput> {
        self.tasks.iter().find(|task| task.name == name)
    }
}

/// Tasks wired into a dependency graph: an edge runs from each context task
/// to the task that reads it.
#[derive(Default)]
pub struct Crew {
    tasks: Vec<Task>,
}

impl Crew {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: Task) -> Result<Self, AgentError> {
        self.add_task(task)?;
        Ok(self)
    }

    pub fn add_task(&mut self, task: Task) -> Result<(), AgentError> {
        if self.tasks.iter().any(|t| t.name == task.name) {
            return Err(AgentError::DuplicateTask(task.name));
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn build_graph(&self) -> Result<Graph<usize, ()>, AgentError> {
        let mut graph = Graph::new();
        let indices: HashMap<&str, NodeIndex> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| (task.name.as_str(), graph.add_node(i)))
            .collect();
        for task in &self.tasks {
            let to = indices[task.name.as_str()];
            for dependency in &task.context {
                let from = indices
                    .get(dependency.as_str())
                    .ok_or_else(|| AgentError::UnknownTask(dependency.clone()))?;
                graph.add_edge(*from, to, ());
            }
        }
        Ok(graph)
    }

    /// Task indices in dependency order.
    pub fn execution_order(&self) -> Result<Vec<usize>, AgentError> {
        let graph = self.build_graph()?;
        let order = toposort(&graph, None).map_err(|cycle| {
            AgentError::DependencyCycle(self.tasks[graph[cycle.node_id()]].name.clone())
        })?;
        Ok(order.into_iter().map(|node| graph[node]).collect())
    }

    /// Runs every task once, dependencies first.
    pub async fn kickoff(&self) -> Result<CrewOutput, AgentError> {
        let order = self.execution_order()?;
        let mut outputs: HashMap<&str, String> = HashMap::new();
        let mut crew_output = CrewOutput::default();

        for index in order {
            let task = &self.tasks[index];
            let context = task
                .context
                .iter()
                .map(|name| {
                    outputs
                        .get(name.as_str())
                        .map(|output| (name.as_str(), output.as_str()))
                        .ok_or_else(|| AgentError::UnknownTask(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let prompt = task.prompt(&context);

            info!("Crew: running `{}` with {}", task.name, task.agent.role());
            debug!("Crew prompt: {:?}", prompt);
            let response = task.agent.execute_task(prompt).await?;
            outputs.insert(task.name.as_str(), response.final_answer.clone());
            crew_output.tasks.push(TaskOutput {
                name: task.name.clone(),
                role: task.agent.role().to_string(),
                response,
            });
        }
        Ok(crew_output)
    }
}

//! Agent tools and the capability-scoped registry

use async_trait::async_trait;
use thiserror::Error;

use zkredeem_llm::ToolSpec;
use zkredeem_types::EventKind;

/// Errors raised by tool execution
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {0}")]
    Execution(String),
}

/// A capability the agent can invoke.
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Specification advertised to the model
    fn spec(&self) -> ToolSpec;

    /// How this tool's output is surfaced to clients
    fn event_kind(&self) -> EventKind {
        EventKind::Tools
    }

    /// Execute with model-proposed arguments. Arguments are untrusted;
    /// implementations validate before acting.
    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError>;
}

/// The toolset attached to one run.
///
/// Built per run so capabilities cannot leak between concerns: only the
/// disbursement orchestrator ever registers the transfer tool.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<std::sync::Arc<dyn AgentTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(mut self, tool: std::sync::Arc<dyn AgentTool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&std::sync::Arc<dyn AgentTool>> {
        self.tools.iter().find(|t| t.spec().name == name)
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

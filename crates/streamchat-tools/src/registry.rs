use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::{Tool, ToolParameters, ToolResult};

/// Registry mapping tool names to implementations
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// OpenAI-compatible definitions for every registered tool
    pub fn definitions(&self) -> Vec<Value> {
        self.tools.values().map(|t| t.to_openai_definition()).collect()
    }

    /// Execute a tool by name with the raw JSON arguments string supplied
    /// by the model. Unknown names and malformed arguments come back as
    /// error results rather than panics.
    pub async fn execute(&self, name: &str, arguments: &str) -> ToolResult {
        let tool = match self.get(name) {
            Some(tool) => tool,
            None => return ToolResult::error(format!("Unknown tool: {}", name)),
        };

        let params = match ToolParameters::from_json(arguments) {
            Ok(params) => params,
            Err(e) => return ToolResult::error(format!("Invalid tool arguments: {}", e)),
        };

        tool.execute(params).await
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use streamchat_tools::{
    DateTimeTool, ParameterDefinition, Tool, ToolParameters, ToolRegistry, ToolResult,
};

// Mock tool implementation for testing
struct TestTool {
    name: String,
    should_fail: bool,
}

impl TestTool {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            should_fail: false,
        }
    }

    fn failing(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait::async_trait]
impl Tool for TestTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "A tool used only in tests"
    }

    fn parameters(&self) -> HashMap<String, ParameterDefinition> {
        HashMap::new()
    }

    async fn execute(&self, params: ToolParameters) -> ToolResult {
        if self.should_fail {
            ToolResult::error("Test tool failed intentionally".to_string())
        } else {
            ToolResult::success(format!(
                "Executed {} with {} parameters",
                self.name,
                params.data.len()
            ))
        }
    }
}

#[tokio::test]
async fn executes_registered_tool() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(TestTool::new("echo")));

    let result = registry.execute("echo", r#"{"a": 1}"#).await;
    assert!(result.success);
    assert_eq!(result.content, "Executed echo with 1 parameters");
}

#[tokio::test]
async fn unknown_tool_returns_error_result() {
    let registry = ToolRegistry::new();
    let result = registry.execute("nope", "{}").await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("Unknown tool"));
}

#[tokio::test]
async fn malformed_arguments_return_error_result() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(TestTool::new("echo")));

    let result = registry.execute("echo", "not json").await;
    assert!(!result.success);
    assert!(result.error.unwrap().contains("Invalid tool arguments"));
}

#[tokio::test]
async fn failing_tool_propagates_error() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(TestTool::new("broken").failing()));

    let result = registry.execute("broken", "{}").await;
    assert!(!result.success);
}

#[test]
fn definitions_cover_all_registered_tools() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(DateTimeTool));
    registry.register(Arc::new(TestTool::new("echo")));

    let defs = registry.definitions();
    assert_eq!(defs.len(), 2);
    let names: Vec<&str> = defs
        .iter()
        .map(|d| d["function"]["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"get_date_and_time"));
    assert!(names.contains(&"echo"));
}

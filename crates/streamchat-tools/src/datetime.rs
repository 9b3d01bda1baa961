use async_trait::async_trait;
use chrono::Local;
use std::collections::HashMap;

use crate::{ParameterDefinition, Tool, ToolParameters, ToolResult};

/// Tool that reports the current local date and time
pub struct DateTimeTool;

#[async_trait]
impl Tool for DateTimeTool {
    fn name(&self) -> &str {
        "get_date_and_time"
    }

    fn description(&self) -> &str {
        "Retrieve the current date and time. Returns the current date in \
         YYYY-MM-DD format and the current time in HH:MM:SS format."
    }

    fn parameters(&self) -> HashMap<String, ParameterDefinition> {
        HashMap::new()
    }

    async fn execute(&self, _params: ToolParameters) -> ToolResult {
        let now = Local::now();
        let payload = serde_json::json!({
            "date": now.format("%Y-%m-%d").to_string(),
            "time": now.format("%H:%M:%S").to_string(),
        });
        ToolResult::success(payload.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_date_and_time_fields() {
        let result = DateTimeTool.execute(ToolParameters::default()).await;
        assert!(result.success);

        let value: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        let date = value["date"].as_str().unwrap();
        let time = value["time"].as_str().unwrap();
        assert_eq!(date.len(), 10, "date should be YYYY-MM-DD: {}", date);
        assert_eq!(time.len(), 8, "time should be HH:MM:SS: {}", time);
        assert_eq!(date.matches('-').count(), 2);
        assert_eq!(time.matches(':').count(), 2);
    }

    #[test]
    fn definition_declares_no_parameters() {
        let def = DateTimeTool.to_openai_definition();
        assert_eq!(def["function"]["name"], "get_date_and_time");
        assert!(def["function"]["parameters"]["properties"]
            .as_object()
            .unwrap()
            .is_empty());
    }
}

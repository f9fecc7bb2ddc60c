// MCP tool trait and registry

use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult>;
}

/// Tool registry for managing available tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        self.tools.insert(schema.name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas, ordered by name
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "integer",
        "description": description
    })
}

/// Deserialize tool arguments, treating a missing object as `{}`.
pub fn parse_arguments<T: serde::de::DeserializeOwned>(arguments: serde_json::Value) -> serde_json::Result<T> {
    let arguments = if arguments.is_null() {
        serde_json::json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments)
}

//! MCP tool implementations.
//!
//! Each tool parses and validates its input, runs the aggregator, and renders
//! the result as Markdown or JSON.

mod search;

pub use search::*;

use std::sync::Arc;

use crate::aggregate::Aggregator;
use crate::error::ToolResult;

/// Tool execution context.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Search pipeline.
    pub aggregator: Arc<Aggregator>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self { aggregator }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "search_papers").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![Box::new(search::SearchPapersTool), Box::new(search::GetPapersTool)]
}

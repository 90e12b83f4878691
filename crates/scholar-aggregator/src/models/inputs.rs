//! MCP tool input types.

use serde::{Deserialize, Serialize};

use super::SearchRequest;
use crate::config::api;
use crate::error::{ToolError, ToolResult};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown.
    #[default]
    Markdown,
    /// Machine-readable JSON.
    Json,
}

/// Input for `search_papers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPapersInput {
    /// The search itself.
    #[serde(flatten)]
    pub request: SearchRequest,

    /// Response format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for `get_papers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPapersInput {
    /// arXiv identifiers, with or without version suffix.
    pub ids: Vec<String>,

    /// Response format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl GetPapersInput {
    /// Check the id list.
    pub fn validate(&self) -> ToolResult<()> {
        if self.ids.iter().all(|id| id.trim().is_empty()) {
            return Err(ToolError::validation("ids", "at least one arXiv id is required"));
        }
        if self.ids.len() > api::MAX_RESULTS_PER_PAGE {
            return Err(ToolError::validation(
                "ids",
                format!("at most {} ids per call", api::MAX_RESULTS_PER_PAGE),
            ));
        }
        Ok(())
    }
}

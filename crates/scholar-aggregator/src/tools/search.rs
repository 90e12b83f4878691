//! Search tools: search_papers, get_papers.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::config::api;
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{GetPapersInput, ResponseFormat, SearchPapersInput};

/// Aggregated arXiv + OpenAlex search.
pub struct SearchPapersTool;

#[async_trait::async_trait]
impl McpTool for SearchPapersTool {
    fn name(&self) -> &'static str {
        "search_papers"
    }

    fn description(&self) -> &'static str {
        "Search arXiv and OpenAlex together. Results are deduplicated across sources, \
         preferring arXiv records, enriched with Semantic Scholar citation counts, and \
         ranked by relevance, citations or date with stable pagination."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Free-text query, or an author name when field is 'author'"
                },
                "maxResults": {
                    "type": "integer",
                    "default": 10,
                    "minimum": 1,
                    "maximum": api::MAX_RESULTS_PER_PAGE
                },
                "start": {
                    "type": "integer",
                    "default": 0,
                    "minimum": 0,
                    "maximum": api::MAX_START,
                    "description": "Offset of the first result"
                },
                "field": {
                    "type": "string",
                    "enum": ["smart", "title", "author", "abstract", "all"],
                    "default": "smart"
                },
                "sortBy": {
                    "type": "string",
                    "enum": ["relevance", "submittedDate", "lastUpdatedDate", "citations"],
                    "default": "relevance"
                },
                "sortOrder": {
                    "type": "string",
                    "enum": ["ascending", "descending"],
                    "default": "descending"
                },
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchPapersInput = serde_json::from_value(input)?;
        params.request.validate()?;

        let response = ctx.aggregator.search(&params.request).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_search_markdown(&response)),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_response(&response))?)
            }
        }
    }
}

/// arXiv lookup by id with citation metrics.
pub struct GetPapersTool;

#[async_trait::async_trait]
impl McpTool for GetPapersTool {
    fn name(&self) -> &'static str {
        "get_papers"
    }

    fn description(&self) -> &'static str {
        "Fetch arXiv papers by identifier (e.g. 2006.11239 or 2006.11239v2) \
         with Semantic Scholar citation counts."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 1,
                    "maxItems": api::MAX_RESULTS_PER_PAGE,
                    "description": "arXiv identifiers"
                },
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            },
            "required": ["ids"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: GetPapersInput = serde_json::from_value(input)?;
        params.validate()?;

        let papers = ctx.aggregator.lookup(&params.ids).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_papers_markdown(&papers)),
            ResponseFormat::Json => {
                let compact = papers.iter().map(formatters::compact_paper).collect::<Vec<_>>();
                Ok(serde_json::to_string_pretty(&compact)?)
            }
        }
    }
}

//! Search request/response shapes and the enums that parameterise them.

use serde::{Deserialize, Serialize};

use super::PaperRecord;
use crate::config::api;
use crate::error::{ToolError, ToolResult};

/// Which part of a paper the query should match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// Title or abstract.
    #[default]
    Smart,
    /// Title only.
    Title,
    /// Author names.
    Author,
    /// Abstract only.
    Abstract,
    /// Every indexed field.
    All,
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Interleaved source order, lightly boosted by citations.
    #[default]
    Relevance,
    /// Publication (first submission) date.
    SubmittedDate,
    /// Last update date.
    LastUpdatedDate,
    /// Citation count.
    Citations,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    #[default]
    Descending,
}

impl SortOrder {
    /// Wire value shared by arXiv and OpenAlex.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// A caller's search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free-text query.
    pub query: String,

    /// Page size.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Offset of the first result.
    #[serde(default)]
    pub start: usize,

    /// Field selector.
    #[serde(default)]
    pub field: SearchField,

    /// Sort key.
    #[serde(default)]
    pub sort_by: SortKey,

    /// Sort direction.
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_max_results() -> usize {
    10
}

impl SearchRequest {
    /// Build a request with default paging and ordering.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: default_max_results(),
            start: 0,
            field: SearchField::default(),
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
        }
    }

    /// Check paging bounds.
    pub fn validate(&self) -> ToolResult<()> {
        if self.max_results == 0 || self.max_results > api::MAX_RESULTS_PER_PAGE {
            return Err(ToolError::validation(
                "maxResults",
                format!("must be between 1 and {}", api::MAX_RESULTS_PER_PAGE),
            ));
        }
        if self.start > api::MAX_START {
            return Err(ToolError::validation(
                "start",
                format!("must be at most {}", api::MAX_START),
            ));
        }
        Ok(())
    }

    /// Offset one past the last requested result.
    #[must_use]
    pub const fn page_end(&self) -> usize {
        self.start.saturating_add(self.max_results)
    }

    /// Size of the globally ranked candidate pool for non-relevance sorts.
    #[must_use]
    pub fn candidate_pool_size(&self) -> usize {
        self.page_end()
            .saturating_mul(api::CANDIDATE_POOL_FACTOR)
            .clamp(api::MIN_CANDIDATE_POOL, api::MAX_CANDIDATE_POOL)
    }
}

/// What a source adapter is asked to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    /// Free-text query.
    pub query: String,
    /// Field selector.
    pub field: SearchField,
    /// Offset into the source's own ordering.
    pub offset: usize,
    /// Rows wanted.
    pub limit: usize,
    /// Sort key.
    pub sort_by: SortKey,
    /// Sort direction.
    pub sort_order: SortOrder,
}

/// Aggregated, ranked page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Echoed query.
    pub query: String,
    /// Offset of the first paper.
    pub offset: usize,
    /// Requested page size.
    pub limit: usize,
    /// Deduplicated candidates ranked before slicing.
    pub total_candidates: usize,
    /// Ranked page.
    pub papers: Vec<PaperRecord>,
}

impl SearchResponse {
    /// Response for a request that never reached an upstream.
    #[must_use]
    pub fn empty(request: &SearchRequest) -> Self {
        Self {
            query: request.query.clone(),
            offset: request.start,
            limit: request.max_results,
            total_candidates: 0,
            papers: Vec::new(),
        }
    }
}

//! The paper record exchanged between every pipeline stage.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which upstream produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    /// The arXiv Atom feed (primary source).
    #[serde(rename = "arxiv")]
    NativeFeed,
    /// The OpenAlex works index.
    #[serde(rename = "openalex")]
    WorksIndex,
}

/// A paper as returned to callers.
///
/// Records are never mutated once a source adapter emits them. Enrichment
/// builds a new record through [`PaperRecord::with_citations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    /// Source-qualified id: an arXiv id, or `openalex:<id>` for works-index items.
    pub id: String,

    /// Paper title.
    pub title: String,

    /// Authors as one comma-separated string.
    #[serde(rename = "authors")]
    pub authors_display: String,

    /// Abstract text (may be empty).
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Publication date, RFC 3339 or `YYYY[-MM[-DD]]` (may be empty).
    pub published_date: String,

    /// Landing page URL.
    pub landing_url: String,

    /// PDF URL (may be empty).
    pub pdf_url: String,

    /// DOI without resolver prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    /// Producing upstream.
    #[serde(rename = "source")]
    pub source_tag: SourceTag,

    /// Citation count, set only by the citation enricher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<u64>,

    /// Influential citation count, set only by the citation enricher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influential_citation_count: Option<u64>,
}

/// Citation metrics attached by the enricher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CitationMetrics {
    /// Total citations.
    pub citation_count: u64,
    /// Influential citations.
    pub influential_citation_count: u64,
}

impl PaperRecord {
    /// True for records produced by the arXiv feed.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.source_tag == SourceTag::NativeFeed
    }

    /// Return a copy of this record carrying citation metrics.
    #[must_use]
    pub fn with_citations(&self, metrics: CitationMetrics) -> Self {
        Self {
            citation_count: Some(metrics.citation_count),
            influential_citation_count: Some(metrics.influential_citation_count),
            ..self.clone()
        }
    }

    /// Publication date as a Unix timestamp, if it parses.
    #[must_use]
    pub fn published_timestamp(&self) -> Option<i64> {
        parse_published(&self.published_date)
    }

    /// Deterministic tie-break key: DOI, then id, then URL, then title.
    #[must_use]
    pub fn tie_break_key(&self) -> String {
        self.doi
            .as_deref()
            .filter(|d| !d.is_empty())
            .or_else(|| Some(self.id.as_str()).filter(|s| !s.is_empty()))
            .or_else(|| Some(self.landing_url.as_str()).filter(|s| !s.is_empty()))
            .unwrap_or(&self.title)
            .to_lowercase()
    }
}

/// Parse the date shapes the upstreams emit into a Unix timestamp.
///
/// Accepts RFC 3339 (`2021-03-04T17:59:59Z`), `YYYY-MM-DD`, `YYYY-MM` and `YYYY`.
#[must_use]
pub fn parse_published(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01-01"), "%Y-%m-%d"))
        .ok()?;

    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

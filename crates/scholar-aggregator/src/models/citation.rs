//! Semantic Scholar batch payload shapes.

use serde::{Deserialize, Serialize};

use super::CitationMetrics;

/// One entry of a `/paper/batch` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitedPaper {
    /// Semantic Scholar paper id.
    #[serde(default)]
    pub paper_id: Option<String>,

    /// External identifiers used to verify the entry.
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,

    /// Number of citations this paper has received.
    #[serde(default)]
    pub citation_count: Option<u64>,

    /// Influential citation count.
    #[serde(default)]
    pub influential_citation_count: Option<u64>,
}

impl CitedPaper {
    /// DOI if available.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.external_ids.as_ref()?.doi.as_deref()
    }

    /// ArXiv id if available.
    #[must_use]
    pub fn arxiv_id(&self) -> Option<&str> {
        self.external_ids.as_ref()?.arxiv.as_deref()
    }

    /// Metrics, if the service reported a citation count.
    ///
    /// A missing influential count next to a present citation count reads as zero.
    #[must_use]
    pub fn metrics(&self) -> Option<CitationMetrics> {
        Some(CitationMetrics {
            citation_count: self.citation_count?,
            influential_citation_count: self.influential_citation_count.unwrap_or(0),
        })
    }
}

/// External identifiers for a paper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalIds {
    /// Digital Object Identifier.
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,

    /// ArXiv preprint ID.
    #[serde(rename = "ArXiv", default)]
    pub arxiv: Option<String>,

    /// Semantic Scholar Corpus ID.
    #[serde(rename = "CorpusId", default)]
    pub corpus_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cited_paper_deserialize() {
        let json = r#"{
            "paperId": "abc",
            "externalIds": {"DOI": "10.1/x", "ArXiv": "2101.00001", "CorpusId": 7},
            "citationCount": 12,
            "influentialCitationCount": 3
        }"#;
        let paper: CitedPaper = serde_json::from_str(json).unwrap();
        assert_eq!(paper.doi(), Some("10.1/x"));
        assert_eq!(paper.arxiv_id(), Some("2101.00001"));
        assert_eq!(
            paper.metrics(),
            Some(CitationMetrics { citation_count: 12, influential_citation_count: 3 })
        );
    }

    #[test]
    fn test_missing_count_means_no_metrics() {
        let paper: CitedPaper = serde_json::from_str(r#"{"paperId": "abc"}"#).unwrap();
        assert_eq!(paper.metrics(), None);
    }
}

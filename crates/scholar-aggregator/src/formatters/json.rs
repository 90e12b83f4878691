//! Compact JSON rendering.

use serde_json::{Value, json};

use crate::models::{PaperRecord, SearchResponse};

/// Compact paper representation for JSON output.
///
/// Empty strings and absent citation metrics are omitted rather than emitted
/// as blanks or zeros.
#[must_use]
pub fn compact_paper(paper: &PaperRecord) -> Value {
    let mut obj = json!({
        "id": paper.id,
        "title": paper.title,
        "source": paper.source_tag,
        "url": paper.landing_url,
    });

    if !paper.authors_display.is_empty() {
        obj["authors"] = json!(paper.authors_display);
    }

    if !paper.published_date.is_empty() {
        obj["published"] = json!(paper.published_date);
    }

    if let Some(doi) = &paper.doi {
        obj["doi"] = json!(doi);
    }

    if !paper.pdf_url.is_empty() {
        obj["pdf"] = json!(paper.pdf_url);
    }

    if let Some(citations) = paper.citation_count {
        obj["citations"] = json!(citations);
    }

    if let Some(influential) = paper.influential_citation_count {
        obj["influentialCitations"] = json!(influential);
    }

    if !paper.abstract_text.is_empty() {
        obj["abstract"] = json!(paper.abstract_text);
    }

    obj
}

/// Compact search envelope.
#[must_use]
pub fn compact_response(response: &SearchResponse) -> Value {
    json!({
        "query": response.query,
        "offset": response.offset,
        "limit": response.limit,
        "totalCandidates": response.total_candidates,
        "papers": response.papers.iter().map(compact_paper).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CitationMetrics, SourceTag};

    fn paper() -> PaperRecord {
        PaperRecord {
            id: "openalex:W1".to_string(),
            title: "Test Paper".to_string(),
            authors_display: "John Doe".to_string(),
            abstract_text: String::new(),
            published_date: "2024-01-02".to_string(),
            landing_url: "https://doi.org/10.1/x".to_string(),
            pdf_url: String::new(),
            doi: Some("10.1/x".to_string()),
            source_tag: SourceTag::WorksIndex,
            citation_count: None,
            influential_citation_count: None,
        }
    }

    #[test]
    fn test_compact_paper() {
        let compact = compact_paper(&paper());

        assert_eq!(compact["id"], "openalex:W1");
        assert_eq!(compact["source"], "openalex");
        assert_eq!(compact["authors"], "John Doe");
        assert_eq!(compact["doi"], "10.1/x");
        assert!(compact.get("pdf").is_none());
        assert!(compact.get("citations").is_none());
    }

    #[test]
    fn test_compact_paper_keeps_zero_citations() {
        let enriched = paper().with_citations(CitationMetrics::default());
        assert_eq!(compact_paper(&enriched)["citations"], 0);
    }
}

//! Source adapter tests against mocked upstream APIs.
#![allow(clippy::needless_pass_by_value)]

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use scholar_aggregator::citations::{CitationService, SemanticScholarCitations};
use scholar_aggregator::models::{SearchField, SortKey, SortOrder, SourceQuery};
use scholar_aggregator::sources::{ArxivSource, NativeFeed, OpenAlexSource, WorksIndex};
use scholar_aggregator::{ClientError, Config};

fn source_query(query: &str, field: SearchField, offset: usize, limit: usize) -> SourceQuery {
    SourceQuery {
        query: query.to_string(),
        field,
        offset,
        limit,
        sort_by: SortKey::Relevance,
        sort_order: SortOrder::Descending,
    }
}

fn numbered_works(from: usize, count: usize) -> Vec<serde_json::Value> {
    (from..from + count)
        .map(|i| {
            json!({
                "id": format!("https://openalex.org/W{i}"),
                "title": format!("Work number {i}"),
                "publication_date": "2020-01-01",
                "primary_location": {"landing_page_url": format!("https://journal.example/{i}")}
            })
        })
        .collect()
}

// =============================================================================
// arXiv Tests
// =============================================================================

const ONE_ENTRY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <summary>The dominant sequence transduction models.</summary>
    <author><name>Ashish Vaswani</name></author>
  </entry>
</feed>"#;

#[tokio::test]
async fn test_arxiv_search_sends_field_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .and(query_param("search_query", "(ti:\"attention is\" OR (ti:attention AND ti:is))"))
        .and(query_param("start", "20"))
        .and(query_param("max_results", "10"))
        .and(query_param("sortBy", "relevance"))
        .and(query_param("sortOrder", "descending"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_ENTRY_FEED))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = ArxivSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let records =
        source.search(&source_query("attention is", SearchField::Title, 20, 10)).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "1706.03762v7");
    assert_eq!(records[0].pdf_url, "https://arxiv.org/pdf/1706.03762v7");
}

#[tokio::test]
async fn test_arxiv_lookup_uses_id_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .and(query_param("id_list", "1706.03762,2006.11239"))
        .and(query_param("max_results", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_ENTRY_FEED))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = ArxivSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let records = source
        .lookup_by_ids(&["1706.03762".to_string(), "2006.11239".to_string()])
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_arxiv_lookup_empty_makes_no_request() {
    let mock_server = MockServer::start().await;
    let source = ArxivSource::new(&Config::for_testing(&mock_server.uri())).unwrap();

    assert!(source.lookup_by_ids(&[]).await.unwrap().is_empty());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_arxiv_query_without_terms_makes_no_request() {
    let mock_server = MockServer::start().await;
    let source = ArxivSource::new(&Config::for_testing(&mock_server.uri())).unwrap();

    let records = source.search(&source_query("( ) \"\"", SearchField::All, 0, 10)).await.unwrap();

    assert!(records.is_empty());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_arxiv_error_entry_is_bad_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry>
                <id>http://arxiv.org/api/errors#incorrect_id_format_for_abc</id>
                <title>Error</title><summary>incorrect id format for abc</summary>
            </entry></feed>"#,
        ))
        .mount(&mock_server)
        .await;

    let source = ArxivSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let err = source.lookup_by_ids(&["abc".to_string()]).await.unwrap_err();

    assert!(matches!(err, ClientError::BadRequest { .. }));
}

#[tokio::test]
async fn test_arxiv_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/arxiv/api/query"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&mock_server)
        .await;

    let source = ArxivSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let err = source.search(&source_query("q", SearchField::All, 0, 10)).await.unwrap_err();

    assert!(matches!(err, ClientError::RateLimited { .. }));
}

// =============================================================================
// OpenAlex Tests
// =============================================================================

#[tokio::test]
async fn test_openalex_paginates_until_short_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/openalex/works"))
        .and(query_param("search", "transformers"))
        .and(query_param("page", "1"))
        .and(query_param("per-page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"count": 70},
            "results": numbered_works(0, 50)
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/openalex/works"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"count": 70},
            "results": numbered_works(50, 20)
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/openalex/works"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let source = OpenAlexSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let records =
        source.search(&source_query("transformers", SearchField::All, 0, 100)).await.unwrap();

    assert_eq!(records.len(), 70);
    assert_eq!(records[69].id, "openalex:W69");
}

/// Always return a full page, numbered by the requested page.
fn full_page(req: &Request) -> ResponseTemplate {
    let page = req
        .url
        .query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(1);
    ResponseTemplate::new(200).set_body_json(json!({
        "meta": {"count": 100_000},
        "results": numbered_works((page - 1) * 50, 50)
    }))
}

#[tokio::test]
async fn test_openalex_stops_at_page_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/openalex/works"))
        .respond_with(full_page)
        .expect(20)
        .mount(&mock_server)
        .await;

    let source = OpenAlexSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let records =
        source.search(&source_query("everything", SearchField::All, 0, 1200)).await.unwrap();

    assert_eq!(records.len(), 1000);
    assert_eq!(records[999].id, "openalex:W999");
}

#[tokio::test]
async fn test_openalex_applies_offset_after_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/openalex/works"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": numbered_works(0, 50)
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = OpenAlexSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let records =
        source.search(&source_query("anything", SearchField::Smart, 10, 5)).await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["openalex:W10", "openalex:W11", "openalex:W12", "openalex:W13", "openalex:W14"]);
}

#[tokio::test]
async fn test_openalex_sends_mailto() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/openalex/works"))
        .and(query_param("mailto", "me@example.org"))
        .and(query_param("filter", "abstract.search:protein folding"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri())
        .with_credentials(None, Some("me@example.org".to_string()));
    let source = OpenAlexSource::new(&config).unwrap();
    let records =
        source.search(&source_query("protein folding", SearchField::Abstract, 0, 10)).await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_openalex_author_resolution() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/openalex/authors"))
        .and(query_param("search", "Yoshua Bengio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "https://openalex.org/A5086198262", "display_name": "Yoshua Bengio"},
                {"id": "https://openalex.org/A2", "display_name": "Y. Bengio"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/openalex/works"))
        .and(query_param("filter", "authorships.author.id:A5086198262|A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": numbered_works(0, 2)
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = OpenAlexSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let records =
        source.search(&source_query("Yoshua Bengio", SearchField::Author, 0, 10)).await.unwrap();

    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_openalex_author_lookup_failure_yields_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/openalex/authors"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let source = OpenAlexSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let records =
        source.search(&source_query("Nobody", SearchField::Author, 0, 10)).await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_openalex_drops_works_without_landing_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/openalex/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "https://openalex.org/W1", "title": "Has page",
                 "primary_location": {"landing_page_url": "https://journal.example/1"}},
                {"id": "https://openalex.org/W2", "title": "No page", "primary_location": null},
                {"id": "https://openalex.org/W3", "title": "DOI only", "doi": "https://doi.org/10.9/x"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let source = OpenAlexSource::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let records = source.search(&source_query("page", SearchField::All, 0, 10)).await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["openalex:W1", "openalex:W3"]);
    assert_eq!(records[1].landing_url, "https://doi.org/10.9/x");
}

// =============================================================================
// Semantic Scholar Tests
// =============================================================================

/// Answer every batch with one null per requested id.
fn echo_nulls(req: &Request) -> ResponseTemplate {
    let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap_or_default();
    let n = body["ids"].as_array().map_or(0, Vec::len);
    ResponseTemplate::new(200).set_body_json(vec![serde_json::Value::Null; n])
}

#[tokio::test]
async fn test_citation_batches_are_chunked() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graph/v1/paper/batch"))
        .and(query_param("fields", "externalIds,citationCount,influentialCitationCount"))
        .respond_with(echo_nulls)
        .expect(2)
        .mount(&mock_server)
        .await;

    let service = SemanticScholarCitations::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let ids: Vec<String> = (0..501).map(|i| format!("ARXIV:2101.{i:05}")).collect();
    let entries = service.lookup(&ids).await.unwrap();

    assert_eq!(entries.len(), 501);
    assert!(entries.iter().all(Option::is_none));
}

#[tokio::test]
async fn test_citation_api_key_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graph/v1/paper/batch"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"paperId": "p", "citationCount": 3, "influentialCitationCount": 1}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri())
        .with_credentials(Some("secret".to_string()), None);
    let service = SemanticScholarCitations::new(&config).unwrap();
    let entries = service.lookup(&["DOI:10.1/x".to_string()]).await.unwrap();

    assert_eq!(entries[0].as_ref().and_then(|e| e.citation_count), Some(3));
}

#[tokio::test]
async fn test_citation_length_mismatch_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graph/v1/paper/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([null])))
        .mount(&mock_server)
        .await;

    let service = SemanticScholarCitations::new(&Config::for_testing(&mock_server.uri())).unwrap();
    let result = service.lookup(&["DOI:10.1/a".to_string(), "DOI:10.1/b".to_string()]).await;

    assert!(result.is_err());
}

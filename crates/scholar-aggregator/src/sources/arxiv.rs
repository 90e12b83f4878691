//! arXiv Atom feed adapter (the native feed).

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use reqwest::header::HeaderMap;

use super::NativeFeed;
use crate::client::HttpClient;
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::identity;
use crate::models::{PaperRecord, SearchField, SortKey, SortOrder, SourceQuery, SourceTag};

/// arXiv search and id-list lookup.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    http: HttpClient,
    api_url: String,
}

impl ArxivSource {
    /// Create the adapter.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = HttpClient::new("arxiv", config, config.arxiv_min_interval, HeaderMap::new())?;
        Ok(Self { http, api_url: config.arxiv_api_url.clone() })
    }

    fn search_params(query: &SourceQuery) -> Vec<(String, String)> {
        let (sort_by, sort_order) = match query.sort_by {
            SortKey::SubmittedDate => ("submittedDate", query.sort_order),
            SortKey::LastUpdatedDate => ("lastUpdatedDate", query.sort_order),
            // arXiv cannot sort by citations; its relevance order seeds the candidate pool.
            SortKey::Relevance | SortKey::Citations => ("relevance", SortOrder::Descending),
        };

        vec![
            ("search_query".to_string(), build_search_query(query.field, &query.query)),
            ("start".to_string(), query.offset.to_string()),
            ("max_results".to_string(), query.limit.to_string()),
            ("sortBy".to_string(), sort_by.to_string()),
            ("sortOrder".to_string(), sort_order.as_str().to_string()),
        ]
    }
}

#[async_trait]
impl NativeFeed for ArxivSource {
    async fn search(&self, query: &SourceQuery) -> ClientResult<Vec<PaperRecord>> {
        if query_terms(&query.query).is_empty() {
            tracing::debug!(query = %query.query, "no searchable terms, skipping arXiv");
            return Ok(Vec::new());
        }

        let params = Self::search_params(query);
        let body = self.http.get_text(&self.api_url, &params).await?;
        let records = parse_atom(&body)?;

        tracing::debug!(count = records.len(), "arXiv search returned");
        Ok(records)
    }

    async fn lookup_by_ids(&self, ids: &[String]) -> ClientResult<Vec<PaperRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = vec![
            ("id_list".to_string(), ids.join(",")),
            ("start".to_string(), "0".to_string()),
            ("max_results".to_string(), ids.len().to_string()),
        ];
        let body = self.http.get_text(&self.api_url, &params).await?;
        let records = parse_atom(&body)?;

        tracing::debug!(requested = ids.len(), found = records.len(), "arXiv id lookup returned");
        Ok(records)
    }
}

/// Split a free-text query into search terms safe to embed in an arXiv expression.
fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.replace(['"', '(', ')'], ""))
        .filter(|t| !t.is_empty())
        .collect()
}

/// `prefix:t1 AND prefix:t2 ...`
fn all_terms(prefix: &str, terms: &[String]) -> String {
    let clauses: Vec<String> = terms.iter().map(|t| format!("{prefix}:{t}")).collect();
    match clauses.len() {
        1 => clauses.join(""),
        _ => format!("({})", clauses.join(" AND ")),
    }
}

/// Exact phrase, or every term present.
fn phrase_or_all_terms(prefix: &str, terms: &[String]) -> String {
    if terms.len() < 2 {
        return all_terms(prefix, terms);
    }
    format!("({prefix}:\"{}\" OR {})", terms.join(" "), all_terms(prefix, terms))
}

/// Build the field-scoped arXiv `search_query` expression.
#[must_use]
pub fn build_search_query(field: SearchField, query: &str) -> String {
    let terms = query_terms(query);
    match field {
        SearchField::Title => phrase_or_all_terms("ti", &terms),
        SearchField::Author => phrase_or_all_terms("au", &terms),
        SearchField::Abstract => all_terms("abs", &terms),
        SearchField::All => all_terms("all", &terms),
        SearchField::Smart => {
            format!("{} OR {}", all_terms("ti", &terms), all_terms("abs", &terms))
        }
    }
}

#[derive(Default)]
struct EntryBuilder {
    id_url: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    pdf_url: Option<String>,
    doi: Option<String>,
}

impl EntryBuilder {
    fn read_link(&mut self, e: &BytesStart<'_>) -> ClientResult<()> {
        let mut title = None;
        let mut ty = None;
        let mut href = None;
        for attr in e.attributes().flatten() {
            let value = attr.unescape_value()?.into_owned();
            match attr.key.as_ref() {
                b"title" => title = Some(value),
                b"type" => ty = Some(value),
                b"href" => href = Some(value),
                _ => {}
            }
        }
        if title.as_deref() == Some("pdf") || ty.as_deref() == Some("application/pdf") {
            if self.pdf_url.is_none() {
                self.pdf_url = href;
            }
        }
        Ok(())
    }

    fn finish(self) -> ClientResult<Option<PaperRecord>> {
        if self.id_url.contains("/api/errors") {
            return Err(ClientError::bad_request(self.summary));
        }

        let id = match identity::extract_native_id_from_url(&self.id_url) {
            id if !id.is_empty() => id,
            _ => match self.id_url.rsplit_once("/abs/") {
                Some((_, tail)) if !tail.is_empty() => tail.to_string(),
                _ => return Ok(None),
            },
        };

        let pdf_url = self.pdf_url.unwrap_or_else(|| format!("https://arxiv.org/pdf/{id}"));

        Ok(Some(PaperRecord {
            id,
            title: self.title,
            authors_display: self.authors.join(", "),
            abstract_text: self.summary,
            published_date: self.published,
            landing_url: self.id_url,
            pdf_url,
            doi: self.doi.and_then(|d| identity::clean_doi(&d)),
            source_tag: SourceTag::NativeFeed,
            citation_count: None,
            influential_citation_count: None,
        }))
    }
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse an arXiv Atom response into native-feed records.
///
/// Entries without a recognizable id are skipped. An arXiv error entry turns
/// into [`ClientError::BadRequest`].
pub fn parse_atom(xml: &str) -> ClientResult<Vec<PaperRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut entry: Option<EntryBuilder> = None;
    let mut in_author = false;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                text.clear();
                match e.local_name().as_ref() {
                    b"entry" => entry = Some(EntryBuilder::default()),
                    b"author" => in_author = true,
                    b"link" => {
                        if let Some(cur) = entry.as_mut() {
                            cur.read_link(&e)?;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"link" {
                    if let Some(cur) = entry.as_mut() {
                        cur.read_link(&e)?;
                    }
                }
            }
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(e) => {
                let local = e.local_name();
                let name = local.as_ref();
                if name == b"entry" {
                    if let Some(done) = entry.take() {
                        if let Some(record) = done.finish()? {
                            records.push(record);
                        }
                    }
                } else if let Some(cur) = entry.as_mut() {
                    let value = normalize_ws(&text);
                    match name {
                        b"id" => cur.id_url = value,
                        b"title" => cur.title = value,
                        b"summary" => cur.summary = value,
                        b"published" => cur.published = value,
                        b"doi" => cur.doi = Some(value).filter(|d| !d.is_empty()),
                        b"name" if in_author && !value.is_empty() => cur.authors.push(value),
                        b"author" => in_author = false,
                        _ => {}
                    }
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

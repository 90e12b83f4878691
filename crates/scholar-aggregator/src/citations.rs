//! Citation enrichment through the Semantic Scholar batch endpoint.
//!
//! Each candidate is mapped to at most one lookup key, keys are deduplicated and
//! sent in batches, and the returned counts are attached by position. Every
//! returned entry is checked against the key it answers before it is trusted.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::client::HttpClient;
use crate::config::{Config, api, fields};
use crate::error::{ClientError, ClientResult};
use crate::identity;
use crate::models::{CitationMetrics, CitedPaper, PaperRecord};

/// A lookup key understood by the citation service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CitationKey {
    /// `DOI:<doi>`
    Doi(String),
    /// `ARXIV:<id>` with the version marker removed.
    Arxiv(String),
    /// `URL:<url>`
    Url(String),
}

impl CitationKey {
    /// Whether a returned entry is consistent with this key.
    ///
    /// Entries that carry no comparable identifier are accepted on position alone.
    #[must_use]
    pub fn matches(&self, entry: &CitedPaper) -> bool {
        match self {
            Self::Doi(doi) => entry.doi().is_none_or(|got| got.eq_ignore_ascii_case(doi)),
            Self::Arxiv(id) => entry
                .arxiv_id()
                .is_none_or(|got| identity::strip_version_suffix(got).eq_ignore_ascii_case(id)),
            Self::Url(_) => true,
        }
    }
}

impl fmt::Display for CitationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doi(doi) => write!(f, "DOI:{doi}"),
            Self::Arxiv(id) => write!(f, "ARXIV:{id}"),
            Self::Url(url) => write!(f, "URL:{url}"),
        }
    }
}

type KeyExtractor = fn(&PaperRecord) -> Option<CitationKey>;

/// Key extractors in priority order.
const KEY_CHAIN: &[KeyExtractor] = &[try_doi, try_native_id, try_doi_from_urls, try_url];

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// Known DOI.
#[must_use]
pub fn try_doi(record: &PaperRecord) -> Option<CitationKey> {
    record.doi.as_deref().and_then(non_empty).map(|d| CitationKey::Doi(d.to_string()))
}

/// arXiv id, for records from the native feed only.
#[must_use]
pub fn try_native_id(record: &PaperRecord) -> Option<CitationKey> {
    if !record.is_native() {
        return None;
    }
    non_empty(&record.id).map(|id| CitationKey::Arxiv(identity::strip_version_suffix(id)))
}

/// DOI embedded in a resolver URL.
#[must_use]
pub fn try_doi_from_urls(record: &PaperRecord) -> Option<CitationKey> {
    [&record.landing_url, &record.pdf_url]
        .into_iter()
        .map(|url| identity::extract_doi_from_url(url))
        .find(|doi| !doi.is_empty())
        .map(CitationKey::Doi)
}

/// Landing URL, else PDF URL.
#[must_use]
pub fn try_url(record: &PaperRecord) -> Option<CitationKey> {
    non_empty(&record.landing_url)
        .or_else(|| non_empty(&record.pdf_url))
        .map(|url| CitationKey::Url(url.to_string()))
}

/// Derive the citation key for a record, if it has one.
#[must_use]
pub fn citation_key(record: &PaperRecord) -> Option<CitationKey> {
    KEY_CHAIN.iter().find_map(|extract| extract(record))
}

/// A batch citation lookup.
#[async_trait]
pub trait CitationService: Send + Sync {
    /// Look up ids, returning one slot per requested id (`None` for unknown ids).
    async fn lookup(&self, ids: &[String]) -> ClientResult<Vec<Option<CitedPaper>>>;
}

/// Semantic Scholar Graph API `POST /paper/batch`.
#[derive(Debug, Clone)]
pub struct SemanticScholarCitations {
    http: HttpClient,
    graph_api_url: String,
}

impl SemanticScholarCitations {
    /// Create the client, sending the API key when one is configured.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or HTTP client
    /// initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.semantic_scholar_api_key {
            headers.insert("x-api-key", HeaderValue::from_str(key)?);
        }

        let http =
            HttpClient::new("semantic-scholar", config, config.citation_min_interval, headers)?;
        Ok(Self { http, graph_api_url: config.graph_api_url.clone() })
    }
}

#[async_trait]
impl CitationService for SemanticScholarCitations {
    async fn lookup(&self, ids: &[String]) -> ClientResult<Vec<Option<CitedPaper>>> {
        let url = format!("{}/paper/batch", self.graph_api_url);
        let params = vec![("fields".to_string(), fields::CITATIONS.join(","))];

        let mut results = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(api::CITATION_BATCH_SIZE) {
            let body = serde_json::json!({ "ids": chunk });
            let batch: Vec<Option<CitedPaper>> = self.http.post_json(&url, &params, &body).await?;

            if batch.len() != chunk.len() {
                return Err(ClientError::malformed(
                    self.http.upstream(),
                    format!("requested {} ids, received {} entries", chunk.len(), batch.len()),
                ));
            }
            results.extend(batch);
        }

        Ok(results)
    }
}

/// Attach citation metrics to a candidate pool.
///
/// Any failure leaves the pool as it was: citation fields stay absent rather
/// than reading as zero.
pub async fn enrich(pool: Vec<PaperRecord>, service: &dyn CitationService) -> Vec<PaperRecord> {
    let keys: Vec<Option<CitationKey>> = pool.iter().map(citation_key).collect();

    let mut requested: Vec<CitationKey> = Vec::new();
    let mut slot_of: HashMap<CitationKey, usize> = HashMap::new();
    for key in keys.iter().flatten() {
        if !slot_of.contains_key(key) {
            slot_of.insert(key.clone(), requested.len());
            requested.push(key.clone());
        }
    }

    if requested.is_empty() {
        return pool;
    }

    let ids: Vec<String> = requested.iter().map(ToString::to_string).collect();
    let entries = match service.lookup(&ids).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, keys = ids.len(), "citation lookup failed");
            return pool;
        }
    };

    if entries.len() != requested.len() {
        tracing::warn!(
            requested = requested.len(),
            received = entries.len(),
            "citation response misaligned, skipping enrichment"
        );
        return pool;
    }

    let metrics: Vec<Option<CitationMetrics>> = requested
        .iter()
        .zip(&entries)
        .map(|(key, entry)| {
            let entry = entry.as_ref()?;
            if !key.matches(entry) {
                tracing::debug!(key = %key, "citation entry does not match its key");
                return None;
            }
            entry.metrics()
        })
        .collect();

    let enriched = metrics.iter().flatten().count();
    tracing::debug!(keys = requested.len(), enriched, "citation enrichment done");

    pool.into_iter()
        .zip(keys)
        .map(|(record, key)| {
            match key.and_then(|k| slot_of.get(&k).copied()).and_then(|slot| metrics[slot]) {
                Some(m) => record.with_citations(m),
                None => record,
            }
        })
        .collect()
}

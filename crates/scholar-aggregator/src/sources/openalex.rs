//! OpenAlex works-index adapter.

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use super::WorksIndex;
use crate::client::HttpClient;
use crate::config::{Config, api};
use crate::error::ClientResult;
use crate::identity;
use crate::models::{
    AuthorsPage, OPENALEX_ID_PREFIX, PaperRecord, SearchField, SortKey, SortOrder, SourceQuery,
    SourceTag, Work, WorksPage,
};

/// Fields requested from `/works`.
const WORK_SELECT: &str = "id,doi,title,display_name,publication_date,publication_year,\
authorships,abstract_inverted_index,primary_location,best_oa_location,open_access";

/// How a search field is expressed against `/works`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkFilter {
    /// Free-text `search=` parameter.
    Search(String),
    /// A `filter=` expression.
    Filter(String),
    /// Author names that must first be resolved to author ids.
    Author(String),
}

/// Map a field selector onto the works-index query shape.
#[must_use]
pub fn work_filter(field: SearchField, query: &str) -> WorkFilter {
    // Commas separate filters and pipes mean OR in filter values.
    let value = query.replace([',', '|'], " ").split_whitespace().collect::<Vec<_>>().join(" ");
    match field {
        SearchField::Smart => WorkFilter::Filter(format!("title_and_abstract.search:{value}")),
        SearchField::Title => WorkFilter::Filter(format!("title.search:{value}")),
        SearchField::Abstract => WorkFilter::Filter(format!("abstract.search:{value}")),
        SearchField::All => WorkFilter::Search(query.trim().to_string()),
        SearchField::Author => WorkFilter::Author(value),
    }
}

/// Convert a work into a works-index record.
///
/// Works without a landing URL, or without both an id and a title, are dropped.
#[must_use]
pub fn work_to_record(work: &Work) -> Option<PaperRecord> {
    let doi = work.doi.as_deref().and_then(identity::clean_doi);

    let landing_url = work
        .landing_page_url()
        .map(str::to_string)
        .or_else(|| doi.as_ref().map(|d| format!("https://doi.org/{d}")))?;

    let title = work.title_text().to_string();
    let id = match work.short_id() {
        Some(short) => format!("openalex:{short}"),
        None if !title.is_empty() => format!("openalex:{title}"),
        None => return None,
    };

    Some(PaperRecord {
        id,
        title,
        authors_display: work.author_names(),
        abstract_text: work.abstract_text(),
        published_date: work.published(),
        landing_url,
        pdf_url: work.pdf_url().unwrap_or_default().to_string(),
        doi,
        source_tag: SourceTag::WorksIndex,
        citation_count: None,
        influential_citation_count: None,
    })
}

/// OpenAlex `/works` search with internal pagination.
#[derive(Debug, Clone)]
pub struct OpenAlexSource {
    http: HttpClient,
    api_url: String,
    mailto: Option<String>,
}

impl OpenAlexSource {
    /// Create the adapter.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http =
            HttpClient::new("openalex", config, config.openalex_min_interval, HeaderMap::new())?;
        Ok(Self {
            http,
            api_url: config.openalex_api_url.clone(),
            mailto: config.openalex_mailto.clone(),
        })
    }

    fn with_mailto(&self, mut params: Vec<(String, String)>) -> Vec<(String, String)> {
        if let Some(mailto) = &self.mailto {
            params.push(("mailto".to_string(), mailto.clone()));
        }
        params
    }

    /// Resolve a free-text author name to OpenAlex author ids.
    async fn resolve_author_ids(&self, name: &str) -> ClientResult<Vec<String>> {
        let url = format!("{}/authors", self.api_url);
        let params = self.with_mailto(vec![
            ("search".to_string(), name.to_string()),
            ("per-page".to_string(), api::OPENALEX_AUTHOR_CANDIDATES.to_string()),
            ("select".to_string(), "id,display_name".to_string()),
        ]);

        let page: AuthorsPage = self.http.get_json(&url, &params).await?;
        let ids = page
            .results
            .into_iter()
            .filter_map(|a| a.id)
            .map(|id| id.strip_prefix(OPENALEX_ID_PREFIX).unwrap_or(&id).to_string())
            .filter(|id| !id.is_empty())
            .collect();

        Ok(ids)
    }

    fn sort_param(query: &SourceQuery) -> Option<String> {
        let dir = match query.sort_order {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        };
        match query.sort_by {
            SortKey::Relevance => None,
            SortKey::Citations => Some(format!("cited_by_count:{dir}")),
            SortKey::SubmittedDate | SortKey::LastUpdatedDate => {
                Some(format!("publication_date:{dir}"))
            }
        }
    }

    /// Fetch consecutive pages until `wanted` rows are collected, a short page
    /// arrives, or the page cap is hit.
    async fn fetch_works(
        &self,
        base: Vec<(String, String)>,
        wanted: usize,
    ) -> ClientResult<Vec<Work>> {
        let url = format!("{}/works", self.api_url);
        let mut works: Vec<Work> = Vec::new();

        for page in 1..=api::OPENALEX_MAX_PAGES {
            let mut params = base.clone();
            params.push(("page".to_string(), page.to_string()));
            params.push(("per-page".to_string(), api::OPENALEX_PAGE_SIZE.to_string()));

            let result: WorksPage = self.http.get_json(&url, &params).await?;
            let received = result.results.len();
            works.extend(result.results);

            tracing::debug!(
                page,
                received,
                total = ?result.meta.and_then(|m| m.count),
                "OpenAlex page fetched"
            );

            if received < api::OPENALEX_PAGE_SIZE || works.len() >= wanted {
                break;
            }
        }

        Ok(works)
    }
}

#[async_trait]
impl WorksIndex for OpenAlexSource {
    async fn search(&self, query: &SourceQuery) -> ClientResult<Vec<PaperRecord>> {
        let mut params = vec![("select".to_string(), WORK_SELECT.to_string())];

        match work_filter(query.field, &query.query) {
            WorkFilter::Search(text) => params.push(("search".to_string(), text)),
            WorkFilter::Filter(expr) => params.push(("filter".to_string(), expr)),
            WorkFilter::Author(name) => {
                let ids = match self.resolve_author_ids(&name).await {
                    Ok(ids) => ids,
                    Err(e) => {
                        tracing::warn!(error = %e, author = %name, "OpenAlex author lookup failed");
                        Vec::new()
                    }
                };
                if ids.is_empty() {
                    tracing::debug!(author = %name, "no OpenAlex authors matched");
                    return Ok(Vec::new());
                }
                let expr = format!("authorships.author.id:{}", ids.join("|"));
                params.push(("filter".to_string(), expr));
            }
        }

        if let Some(sort) = Self::sort_param(query) {
            params.push(("sort".to_string(), sort));
        }

        let wanted = query.offset.saturating_add(query.limit);
        let works = self.fetch_works(self.with_mailto(params), wanted).await?;
        let fetched = works.len();

        let records: Vec<PaperRecord> = works
            .iter()
            .filter_map(work_to_record)
            .skip(query.offset)
            .take(query.limit)
            .collect();

        tracing::debug!(fetched, kept = records.len(), "OpenAlex search returned");
        Ok(records)
    }
}

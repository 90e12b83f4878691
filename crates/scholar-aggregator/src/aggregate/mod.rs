//! The search pipeline.
//!
//! query → both sources concurrently → link → author filter → dedup → citation
//! enrichment → rank → page.
//!
//! Every stage after the source fan-out runs sequentially over the full output
//! of the previous one. No state survives a call.

pub mod author_filter;
pub mod dedup;
pub mod linker;
pub mod rank;

use std::sync::Arc;

use crate::citations::{self, CitationService, SemanticScholarCitations};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{PaperRecord, SearchField, SearchRequest, SearchResponse, SortKey, SourceQuery};
use crate::sources::{ArxivSource, NativeFeed, OpenAlexSource, WorksIndex};

/// Aggregates arXiv and OpenAlex results with Semantic Scholar citation metrics.
#[derive(Clone)]
pub struct Aggregator {
    native: Arc<dyn NativeFeed>,
    works: Arc<dyn WorksIndex>,
    citations: Arc<dyn CitationService>,
}

impl Aggregator {
    /// Build the aggregator against the configured upstreams.
    ///
    /// # Errors
    ///
    /// Returns error if any HTTP client fails to initialize.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::with_sources(
            Arc::new(ArxivSource::new(config)?),
            Arc::new(OpenAlexSource::new(config)?),
            Arc::new(SemanticScholarCitations::new(config)?),
        ))
    }

    /// Build the aggregator from explicit source implementations.
    #[must_use]
    pub fn with_sources(
        native: Arc<dyn NativeFeed>,
        works: Arc<dyn WorksIndex>,
        citations: Arc<dyn CitationService>,
    ) -> Self {
        Self { native, works, citations }
    }

    /// Run one aggregated search.
    ///
    /// A blank query returns an empty page without contacting any upstream.
    ///
    /// # Errors
    ///
    /// Returns error when the arXiv search or the arXiv id lookup fails.
    /// OpenAlex and Semantic Scholar failures only reduce the result.
    pub async fn search(&self, request: &SearchRequest) -> ClientResult<SearchResponse> {
        let query = request.query.trim();
        if query.is_empty() {
            tracing::debug!("blank query, skipping upstreams");
            return Ok(SearchResponse::empty(request));
        }

        tracing::info!(
            query,
            field = ?request.field,
            sort_by = ?request.sort_by,
            sort_order = ?request.sort_order,
            start = request.start,
            max_results = request.max_results,
            "aggregated search"
        );

        let relevance = request.sort_by == SortKey::Relevance;
        // Relevance pages are slices of one interleaved list, so each source is
        // read from the top through the end of the requested page.
        let limit = if relevance { request.page_end() } else { request.candidate_pool_size() };

        let source_query = SourceQuery {
            query: query.to_string(),
            field: request.field,
            offset: 0,
            limit,
            sort_by: request.sort_by,
            sort_order: request.sort_order,
        };

        let (native, works) =
            tokio::join!(self.native.search(&source_query), self.works.search(&source_query));

        let native = native?;
        let works = works.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "OpenAlex search failed, continuing without it");
            Vec::new()
        });
        tracing::debug!(native = native.len(), works = works.len(), "sources returned");

        let works = linker::link(works, self.native.as_ref()).await?;

        let (native, works) = if request.field == SearchField::Author {
            (
                author_filter::filter_by_author(native, query),
                author_filter::filter_by_author(works, query),
            )
        } else {
            (native, works)
        };

        let (native, works) = dedup::prefilter(native, works);
        let combined = if relevance {
            interleave(native, works)
        } else {
            native.into_iter().chain(works).collect()
        };
        let pool = dedup::final_pass(combined);

        let pool = citations::enrich(pool, self.citations.as_ref()).await;
        let ranked = rank::rank(pool, request.sort_by, request.sort_order);
        let total_candidates = ranked.len();

        let papers = rank::paginate(ranked, request.start, request.max_results);

        tracing::debug!(total_candidates, returned = papers.len(), "search complete");

        Ok(SearchResponse {
            query: request.query.clone(),
            offset: request.start,
            limit: request.max_results,
            total_candidates,
            papers,
        })
    }

    /// Fetch arXiv records by id and attach citation metrics.
    ///
    /// # Errors
    ///
    /// Returns error when the arXiv lookup fails.
    pub async fn lookup(&self, ids: &[String]) -> ClientResult<Vec<PaperRecord>> {
        let ids: Vec<String> =
            ids.iter().map(|id| id.trim().to_string()).filter(|id| !id.is_empty()).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.native.lookup_by_ids(&ids).await?;
        Ok(citations::enrich(records, self.citations.as_ref()).await)
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator").finish_non_exhaustive()
    }
}

/// Alternate items from two lists, starting with `first`, then append the rest
/// of whichever is longer.
#[must_use]
pub fn interleave<T>(first: Vec<T>, second: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(first.len() + second.len());
    let mut a = first.into_iter();
    let mut b = second.into_iter();
    loop {
        match (a.next(), b.next()) {
            (None, None) => break,
            (x, y) => out.extend(x.into_iter().chain(y)),
        }
    }
    out
}

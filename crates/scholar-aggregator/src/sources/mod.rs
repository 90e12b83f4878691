//! Source adapters.
//!
//! Each adapter turns a [`SourceQuery`] into [`PaperRecord`]s tagged with its
//! [`SourceTag`](crate::models::SourceTag). The traits below are the seams the
//! aggregator is written against, so the pipeline can be driven by any
//! implementation.

mod arxiv;
mod openalex;

pub use arxiv::{ArxivSource, build_search_query, parse_atom};
pub use openalex::{OpenAlexSource, WorkFilter, work_filter, work_to_record};

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{PaperRecord, SourceQuery};

/// The primary bibliographic feed.
///
/// Failures from this source are fatal to a search.
#[async_trait]
pub trait NativeFeed: Send + Sync {
    /// Run a field-scoped search over one paging window.
    async fn search(&self, query: &SourceQuery) -> ClientResult<Vec<PaperRecord>>;

    /// Fetch canonical records for a list of native identifiers in one call.
    async fn lookup_by_ids(&self, ids: &[String]) -> ClientResult<Vec<PaperRecord>>;
}

/// The secondary works index.
///
/// Callers treat failures from this source as "no candidates".
#[async_trait]
pub trait WorksIndex: Send + Sync {
    /// Run a field-scoped search, paginating internally to cover `offset + limit`.
    async fn search(&self, query: &SourceQuery) -> ClientResult<Vec<PaperRecord>>;
}

//! Data models shared by the sources and the aggregation pipeline.
//!
//! Upstream payloads use `#[serde(default)]` for optional fields so that
//! partially populated records still decode.

mod citation;
mod inputs;
mod openalex;
mod paper;
mod request;

pub use citation::{CitedPaper, ExternalIds};
pub use inputs::{GetPapersInput, ResponseFormat, SearchPapersInput};
pub use openalex::{
    AuthorRef, Authorship, AuthorsPage, Location, OPENALEX_ID_PREFIX, OpenAccess, PageMeta, Work,
    WorksPage, reconstruct_abstract,
};
pub use paper::{CitationMetrics, PaperRecord, SourceTag, parse_published};
pub use request::{
    SearchField, SearchRequest, SearchResponse, SortKey, SortOrder, SourceQuery,
};

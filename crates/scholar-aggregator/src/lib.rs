//! Scholar Aggregator
//!
//! Literature search across arXiv and OpenAlex, reconciled into one
//! deduplicated list, enriched with Semantic Scholar citation counts and
//! ranked with stable pagination. Exposed as an MCP server (stdio or HTTP)
//! and as a plain `GET /search` endpoint.
//!
//! # Example
//!
//! ```no_run
//! use scholar_aggregator::{Aggregator, Config, SearchRequest};
//! use scholar_aggregator::models::{SearchField, SortKey};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let aggregator = Aggregator::new(&config)?;
//!
//!     let mut request = SearchRequest::new("diffusion models");
//!     request.field = SearchField::Title;
//!     request.sort_by = SortKey::Citations;
//!
//!     let response = aggregator.search(&request).await?;
//!     for paper in response.papers {
//!         println!("{} ({:?} citations)", paper.title, paper.citation_count);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod citations;
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod identity;
pub mod models;
pub mod server;
pub mod sources;
pub mod tools;

pub use aggregate::Aggregator;
pub use config::Config;
pub use error::{ClientError, ToolError};
pub use models::{PaperRecord, SearchRequest, SearchResponse};

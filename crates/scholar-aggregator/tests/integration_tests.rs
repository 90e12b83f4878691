//! Integration tests for the aggregator.
//!
//! These tests hit the real arXiv, OpenAlex and Semantic Scholar APIs.
//! Run with: `cargo test --features integration -- --nocapture`

#![cfg(feature = "integration")]
#![allow(dead_code)]

use std::collections::HashSet;

use scholar_aggregator::models::{SearchField, SortKey};
use scholar_aggregator::{Aggregator, Config, SearchRequest};

/// Well-known arXiv ids for testing.
mod arxiv_ids {
    /// "Attention Is All You Need" - Vaswani et al. 2017
    pub const ATTENTION: &str = "1706.03762";
    /// "Denoising Diffusion Probabilistic Models" - Ho et al. 2020
    pub const DDPM: &str = "2006.11239";
}

fn create_aggregator() -> Aggregator {
    let config = Config::from_env().expect("Failed to read config");
    Aggregator::new(&config).expect("Failed to create aggregator")
}

// =============================================================================
// Search Tests
// =============================================================================

#[tokio::test]
async fn test_title_search_by_citations() {
    let aggregator = create_aggregator();
    let mut request = SearchRequest::new("diffusion models");
    request.field = SearchField::Title;
    request.sort_by = SortKey::Citations;

    let response = aggregator.search(&request).await.expect("search failed");
    assert!(!response.papers.is_empty());

    let ids: HashSet<&str> = response.papers.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), response.papers.len());

    let counts: Vec<u64> = response.papers.iter().filter_map(|p| p.citation_count).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));

    for paper in &response.papers {
        println!("{:>8?}  {}  {}", paper.citation_count, paper.id, paper.title);
    }
}

#[tokio::test]
async fn test_author_search() {
    let aggregator = create_aggregator();
    let mut request = SearchRequest::new("Geoffrey Hinton");
    request.field = SearchField::Author;

    let response = aggregator.search(&request).await.expect("search failed");
    for paper in &response.papers {
        assert!(paper.authors_display.to_lowercase().contains("hinton"), "{}", paper.authors_display);
    }
}

#[tokio::test]
async fn test_pages_are_consistent() {
    let aggregator = create_aggregator();
    let page = |start: usize, max: usize| {
        let mut request = SearchRequest::new("graph neural networks");
        request.sort_by = SortKey::Citations;
        request.start = start;
        request.max_results = max;
        request
    };

    let first = aggregator.search(&page(0, 5)).await.expect("first page");
    let second = aggregator.search(&page(5, 5)).await.expect("second page");

    let first_ids: HashSet<&str> = first.papers.iter().map(|p| p.id.as_str()).collect();
    assert!(second.papers.iter().all(|p| !first_ids.contains(p.id.as_str())));
}

// =============================================================================
// Lookup Tests
// =============================================================================

#[tokio::test]
async fn test_lookup_known_papers() {
    let aggregator = create_aggregator();
    let papers = aggregator
        .lookup(&[arxiv_ids::ATTENTION.to_string(), arxiv_ids::DDPM.to_string()])
        .await
        .expect("lookup failed");

    assert_eq!(papers.len(), 2);
    assert!(papers.iter().any(|p| p.title.contains("Attention")));
}

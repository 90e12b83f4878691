//! Final ordering and page slicing.

use std::cmp::Ordering;

use crate::config::api;
use crate::models::{PaperRecord, SortKey, SortOrder};

/// Order the candidate pool for the requested sort.
#[must_use]
pub fn rank(mut records: Vec<PaperRecord>, sort_by: SortKey, order: SortOrder) -> Vec<PaperRecord> {
    match sort_by {
        SortKey::Citations => {
            records.sort_by(|a, b| by_citations(a, b, order));
            records
        }
        SortKey::SubmittedDate | SortKey::LastUpdatedDate => {
            records.sort_by(|a, b| by_date(a, b, order));
            records
        }
        SortKey::Relevance => by_relevance(records),
    }
}

/// Slice one page out of a ranked list.
#[must_use]
pub fn paginate(records: Vec<PaperRecord>, offset: usize, limit: usize) -> Vec<PaperRecord> {
    records.into_iter().skip(offset).take(limit).collect()
}

/// Apply `order` to a primary comparison where missing values always sort last.
fn directed<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Ascending => a.cmp(&b),
            SortOrder::Descending => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending comparison where missing values count as lowest.
fn desc<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    b.cmp(&a)
}

fn by_citations(a: &PaperRecord, b: &PaperRecord, order: SortOrder) -> Ordering {
    directed(a.citation_count, b.citation_count, order)
        .then_with(|| desc(a.influential_citation_count, b.influential_citation_count))
        .then_with(|| desc(a.published_timestamp(), b.published_timestamp()))
        .then_with(|| a.tie_break_key().cmp(&b.tie_break_key()))
}

fn by_date(a: &PaperRecord, b: &PaperRecord, order: SortOrder) -> Ordering {
    directed(a.published_timestamp(), b.published_timestamp(), order)
        .then_with(|| desc(a.citation_count, b.citation_count))
        .then_with(|| desc(a.influential_citation_count, b.influential_citation_count))
        .then_with(|| a.tie_break_key().cmp(&b.tie_break_key()))
}

/// Relevance scores for an interleaved list: position as the base score plus a
/// small citation boost.
#[must_use]
pub fn relevance_scores(records: &[PaperRecord]) -> Vec<f64> {
    let n = records.len() as f64;
    let max = records.iter().filter_map(|r| r.citation_count).max().unwrap_or(0);
    let denom = (max as f64).ln_1p();

    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let base = (n - i as f64) / n;
            let boost = if max > 0 {
                let c = r.citation_count.unwrap_or(0) as f64;
                api::RELEVANCE_CITATION_WEIGHT * c.ln_1p() / denom
            } else {
                0.0
            };
            base + boost
        })
        .collect()
}

fn by_relevance(records: Vec<PaperRecord>) -> Vec<PaperRecord> {
    let scores = relevance_scores(&records);
    let mut scored: Vec<(f64, PaperRecord)> = scores.into_iter().zip(records).collect();
    // Stable, so equal scores keep their interleaved order.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, r)| r).collect()
}

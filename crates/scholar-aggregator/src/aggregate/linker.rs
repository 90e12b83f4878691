//! Cross-source linking: works-index records that point at an arXiv paper are
//! swapped for the canonical arXiv record.

use std::collections::{HashMap, HashSet};

use crate::error::ClientResult;
use crate::identity;
use crate::models::PaperRecord;
use crate::sources::NativeFeed;

/// arXiv id embedded in a record's landing or PDF URL.
#[must_use]
pub fn linked_native_id(record: &PaperRecord) -> Option<String> {
    [&record.landing_url, &record.pdf_url]
        .into_iter()
        .map(|url| identity::extract_native_id_from_url(url))
        .find(|id| !id.is_empty())
}

fn base_key(id: &str) -> String {
    identity::strip_version_suffix(id).to_lowercase()
}

/// Replace linkable works-index records with the arXiv records they point at.
///
/// All linked ids are resolved in one lookup. A linkable record whose id the
/// lookup does not return is dropped. Records without a link pass through.
/// A failed lookup fails the search, since it is a call to the primary source.
pub async fn link(
    works: Vec<PaperRecord>,
    native: &dyn NativeFeed,
) -> ClientResult<Vec<PaperRecord>> {
    let links: Vec<Option<String>> = works.iter().map(linked_native_id).collect();

    let mut seen = HashSet::new();
    let ids: Vec<String> =
        links.iter().flatten().filter(|id| seen.insert(id.to_lowercase())).cloned().collect();

    if ids.is_empty() {
        return Ok(works);
    }

    let found = native.lookup_by_ids(&ids).await?;
    let mut canonical: HashMap<String, PaperRecord> = HashMap::new();
    for record in found {
        canonical.entry(base_key(&record.id)).or_insert(record);
    }

    let before = works.len();
    let linked: Vec<PaperRecord> = works
        .into_iter()
        .zip(links)
        .filter_map(|(record, link)| match link {
            None => Some(record),
            Some(id) => canonical.get(&base_key(&id)).cloned(),
        })
        .collect();

    tracing::debug!(
        requested = ids.len(),
        resolved = canonical.len(),
        works_in = before,
        works_out = linked.len(),
        "cross-source linking"
    );

    Ok(linked)
}

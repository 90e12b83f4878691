//! Cross-source deduplication.
//!
//! Two stages: a pre-filter that drops works-index records already covered by
//! the native feed, then a final collision pass over the combined list. The
//! final pass exists because linking can put native records into the works
//! list; those always reach it so they can displace works-index duplicates.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::identity;
use crate::models::PaperRecord;

/// Comparable identity keys for one record.
///
/// Keys are namespaced (`id:`, `url:`, `title:`) so the three kinds never
/// collide with each other. Id keys come first, then URL keys, then the title.
#[must_use]
pub fn identity_keys(record: &PaperRecord) -> Vec<String> {
    let mut keys = Vec::new();
    let mut push = |key: String| {
        if !keys.contains(&key) {
            keys.push(key);
        }
    };

    let mut native_ids: Vec<String> = Vec::new();
    if record.is_native() && !record.id.trim().is_empty() {
        native_ids.push(record.id.trim().to_lowercase());
    }
    for url in [&record.landing_url, &record.pdf_url] {
        let id = identity::extract_native_id_from_url(url);
        if !id.is_empty() {
            native_ids.push(id.to_lowercase());
        }
    }
    for id in native_ids {
        push(format!("id:{}", identity::strip_version_suffix(&id)));
        push(format!("id:{id}"));
    }
    if !record.is_native() && !record.id.trim().is_empty() {
        push(format!("id:{}", record.id.trim().to_lowercase()));
    }

    for url in [&record.landing_url, &record.pdf_url] {
        let url = identity::normalize_url(url);
        if !url.is_empty() {
            push(format!("url:{url}"));
        }
    }

    let title = identity::normalize_title(&record.title);
    if !title.is_empty() {
        push(format!("title:{title}"));
    }

    keys
}

/// Drop works-index records that collide with a native record or with an
/// earlier kept works-index record.
///
/// Native records found in the works list are never dropped here; the final
/// pass settles their collisions.
#[must_use]
pub fn prefilter(
    native: Vec<PaperRecord>,
    works: Vec<PaperRecord>,
) -> (Vec<PaperRecord>, Vec<PaperRecord>) {
    let mut seen: HashSet<String> = native.iter().flat_map(identity_keys).collect();

    let before = works.len();
    let works: Vec<PaperRecord> = works
        .into_iter()
        .filter(|record| {
            let keys = identity_keys(record);
            if !record.is_native() && keys.iter().any(|k| seen.contains(k)) {
                return false;
            }
            seen.extend(keys);
            true
        })
        .collect();

    tracing::debug!(native = native.len(), works_in = before, works_out = works.len(), "prefilter");
    (native, works)
}

/// Resolve any remaining duplicates in a combined list.
///
/// The first record claiming a key keeps its slot. A native record replaces a
/// kept works-index record it collides with; a works-index record never
/// replaces a native one. A native record that collides with an earlier
/// native is dropped without claiming its other keys, so a later distinct
/// native paper sharing only those keys is still kept. The output has no two
/// records sharing a key, so running the pass again changes nothing.
#[must_use]
pub fn final_pass(records: Vec<PaperRecord>) -> Vec<PaperRecord> {
    let mut slots: Vec<Option<PaperRecord>> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    // Keys of dropped native duplicates that no kept record claims.
    let mut absorbed: HashSet<String> = HashSet::new();

    for record in records {
        let keys = identity_keys(&record);
        let colliding: BTreeSet<usize> = keys
            .iter()
            .filter_map(|k| index.get(k).copied())
            .filter(|&slot| slots[slot].is_some())
            .collect();

        if !record.is_native() {
            if colliding.is_empty() && !keys.iter().any(|k| absorbed.contains(k)) {
                let slot = slots.len();
                slots.push(Some(record));
                claim(&mut index, &slots, keys, slot);
            }
            continue;
        }

        if colliding.is_empty() {
            let slot = slots.len();
            slots.push(Some(record));
            claim(&mut index, &slots, keys, slot);
            continue;
        }

        let is_native = |slot: usize| slots[slot].as_ref().is_some_and(PaperRecord::is_native);
        let kept_native = colliding.iter().copied().find(|&slot| is_native(slot));

        match kept_native {
            Some(_) => {
                let stale: Vec<usize> =
                    colliding.iter().copied().filter(|&slot| !is_native(slot)).collect();
                for slot in stale {
                    slots[slot] = None;
                }
                for key in keys {
                    let live = index.get(&key).is_some_and(|&s| slots[s].is_some());
                    if !live {
                        absorbed.insert(key);
                    }
                }
            }
            None => {
                let mut iter = colliding.iter().copied();
                if let Some(target) = iter.next() {
                    for slot in iter {
                        slots[slot] = None;
                    }
                    slots[target] = Some(record);
                    for key in keys {
                        index.insert(key, target);
                    }
                }
            }
        }
    }

    slots.into_iter().flatten().collect()
}

/// Point unclaimed (or stale) keys at `slot`.
fn claim(
    index: &mut HashMap<String, usize>,
    slots: &[Option<PaperRecord>],
    keys: Vec<String>,
    slot: usize,
) {
    for key in keys {
        let stale = index.get(&key).is_none_or(|&s| slots[s].is_none());
        if stale {
            index.insert(key, slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTag;

    fn native(id: &str, title: &str) -> PaperRecord {
        PaperRecord {
            id: id.to_string(),
            title: title.to_string(),
            authors_display: String::new(),
            abstract_text: String::new(),
            published_date: String::new(),
            landing_url: format!("http://arxiv.org/abs/{id}"),
            pdf_url: format!("http://arxiv.org/pdf/{id}"),
            doi: None,
            source_tag: SourceTag::NativeFeed,
            citation_count: None,
            influential_citation_count: None,
        }
    }

    fn work(id: &str, title: &str, url: &str) -> PaperRecord {
        PaperRecord {
            id: format!("openalex:{id}"),
            title: title.to_string(),
            authors_display: String::new(),
            abstract_text: String::new(),
            published_date: String::new(),
            landing_url: url.to_string(),
            pdf_url: String::new(),
            doi: None,
            source_tag: SourceTag::WorksIndex,
            citation_count: None,
            influential_citation_count: None,
        }
    }

    #[test]
    fn test_identity_keys_include_both_id_forms() {
        let keys = identity_keys(&native("2101.00001v2", "A Title"));
        assert!(keys.contains(&"id:2101.00001".to_string()));
        assert!(keys.contains(&"id:2101.00001v2".to_string()));
        assert!(keys.contains(&"url:https://arxiv.org/abs/2101.00001v2".to_string()));
        assert!(keys.contains(&"title:atitle".to_string()));
    }

    #[test]
    fn test_prefilter_drops_title_collision() {
        let (n, w) = prefilter(
            vec![native("2101.00001v1", "Graph Neural Networks")],
            vec![
                work("W1", "graph neural  networks!", "https://journal.example/1"),
                work("W2", "Something Else", "https://journal.example/2"),
                work("W3", "Something else", "https://journal.example/3"),
            ],
        );
        assert_eq!(n.len(), 1);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].id, "openalex:W2");
    }

    #[test]
    fn test_final_pass_native_replaces_work_in_place() {
        let out = final_pass(vec![
            work("W1", "Shared Title", "https://journal.example/1"),
            native("2101.00002v1", "Other"),
            native("2101.00001v1", "Shared Title"),
        ]);
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2101.00001v1", "2101.00002v1"]);
    }

    #[test]
    fn test_final_pass_work_never_replaces_native() {
        let out = final_pass(vec![
            native("2101.00001v1", "Shared Title"),
            work("W1", "Shared Title", "https://journal.example/1"),
        ]);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_native());
    }

    #[test]
    fn test_final_pass_versions_collapse() {
        let out = final_pass(vec![native("2101.00001v1", "First"), native("2101.00001v2", "Second")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2101.00001v1");
    }

    #[test]
    fn test_final_pass_native_bridging_two_works() {
        let out = final_pass(vec![
            work("W1", "Alpha", "https://journal.example/1"),
            work("W2", "Beta", "https://arxiv.org/abs/2101.00009"),
            native("2101.00009v1", "Alpha"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2101.00009v1");
    }

    #[test]
    fn test_linked_native_in_works_list_wins() {
        let (n, w) = prefilter(
            vec![],
            vec![
                work("W1", "Alpha Paper", "https://journal.example/1"),
                native("2101.00009v1", "Alpha Paper"),
            ],
        );
        assert_eq!(w.len(), 2);

        let out = final_pass(n.into_iter().chain(w).collect());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2101.00009v1");
        assert!(out[0].is_native());
    }

    #[test]
    fn test_prefilter_keeps_linked_native_colliding_with_feed() {
        let (_, w) = prefilter(
            vec![native("2101.00001v1", "Shared Title")],
            vec![native("2101.00001v1", "Shared Title")],
        );
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_final_pass_dropped_version_does_not_shadow_other_paper() {
        let out = final_pass(vec![
            native("2101.00001v1", "First"),
            native("2101.00001v2", "Second"),
            native("2202.00002v1", "Second"),
            work("W1", "Second", "https://journal.example/1"),
        ]);
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2101.00001v1", "2202.00002v1"]);
    }

    #[test]
    fn test_final_pass_work_matching_dropped_version_is_dropped() {
        let out = final_pass(vec![
            native("2101.00001v1", "First"),
            native("2101.00001v2", "Second"),
            work("W1", "Second", "https://journal.example/1"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2101.00001v1");
    }

    #[test]
    fn test_final_pass_idempotent() {
        let once = final_pass(vec![
            work("W1", "Alpha", "https://journal.example/1"),
            native("2101.00001v1", "Alpha"),
            native("2101.00002v1", "Beta"),
            work("W2", "Gamma", "https://journal.example/2"),
        ]);
        assert_eq!(final_pass(once.clone()), once);
    }
}

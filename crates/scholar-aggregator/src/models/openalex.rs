//! OpenAlex payload shapes (only the fields the works-index adapter reads).

use std::collections::HashMap;

use serde::Deserialize;

/// Prefix OpenAlex puts on entity ids.
pub const OPENALEX_ID_PREFIX: &str = "https://openalex.org/";

/// One page of `/works` results.
#[derive(Debug, Clone, Deserialize)]
pub struct WorksPage {
    /// Paging metadata.
    #[serde(default)]
    pub meta: Option<PageMeta>,

    /// Works on this page.
    pub results: Vec<Work>,
}

/// Paging metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    /// Total matching rows.
    #[serde(default)]
    pub count: Option<u64>,
}

/// A work from the OpenAlex index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Work {
    /// `https://openalex.org/W...` id.
    #[serde(default)]
    pub id: Option<String>,

    /// DOI as a resolver URL.
    #[serde(default)]
    pub doi: Option<String>,

    /// Title.
    #[serde(default)]
    pub title: Option<String>,

    /// Display title (same as `title` for most works).
    #[serde(default)]
    pub display_name: Option<String>,

    /// `YYYY-MM-DD` publication date.
    #[serde(default)]
    pub publication_date: Option<String>,

    /// Publication year.
    #[serde(default)]
    pub publication_year: Option<i32>,

    /// Authorships in byline order.
    #[serde(default)]
    pub authorships: Vec<Authorship>,

    /// Abstract as word -> positions.
    #[serde(default)]
    pub abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,

    /// Primary hosting location.
    #[serde(default)]
    pub primary_location: Option<Location>,

    /// Best open-access location.
    #[serde(default)]
    pub best_oa_location: Option<Location>,

    /// Open access summary.
    #[serde(default)]
    pub open_access: Option<OpenAccess>,
}

impl Work {
    /// Bare OpenAlex id (`W123`), if present.
    #[must_use]
    pub fn short_id(&self) -> Option<&str> {
        let id = self.id.as_deref()?.trim();
        let short = id.strip_prefix(OPENALEX_ID_PREFIX).unwrap_or(id);
        (!short.is_empty()).then_some(short)
    }

    /// Title, preferring `title` over `display_name`.
    #[must_use]
    pub fn title_text(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.display_name.as_deref())
            .unwrap_or("")
            .trim()
    }

    /// Author display names joined by ", ".
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authorships
            .iter()
            .filter_map(|a| a.author.as_ref()?.display_name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Abstract text rebuilt from the inverted index.
    #[must_use]
    pub fn abstract_text(&self) -> String {
        self.abstract_inverted_index.as_ref().map(reconstruct_abstract).unwrap_or_default()
    }

    /// Publication date, falling back to the bare year.
    #[must_use]
    pub fn published(&self) -> String {
        self.publication_date
            .clone()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| self.publication_year.map(|y| y.to_string()))
            .unwrap_or_default()
    }

    fn locations(&self) -> impl Iterator<Item = &Location> {
        self.primary_location.iter().chain(self.best_oa_location.iter())
    }

    /// First landing page URL across the known locations.
    #[must_use]
    pub fn landing_page_url(&self) -> Option<&str> {
        self.locations().find_map(|l| l.landing_page_url.as_deref().filter(|u| !u.is_empty()))
    }

    /// First PDF URL across the known locations, then the open-access URL.
    #[must_use]
    pub fn pdf_url(&self) -> Option<&str> {
        self.locations()
            .find_map(|l| l.pdf_url.as_deref().filter(|u| !u.is_empty()))
            .or_else(|| self.open_access.as_ref()?.oa_url.as_deref().filter(|u| !u.is_empty()))
    }
}

/// An authorship entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authorship {
    /// The author.
    #[serde(default)]
    pub author: Option<AuthorRef>,
}

/// Minimal author reference inside a work.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorRef {
    /// `https://openalex.org/A...` id.
    #[serde(default)]
    pub id: Option<String>,

    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Hosting location of a work.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    /// Landing page.
    #[serde(default)]
    pub landing_page_url: Option<String>,

    /// Direct PDF link.
    #[serde(default)]
    pub pdf_url: Option<String>,
}

/// Open access summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAccess {
    /// Best open-access URL.
    #[serde(default)]
    pub oa_url: Option<String>,
}

/// One page of `/authors` results.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorsPage {
    /// Matching authors.
    pub results: Vec<AuthorRef>,
}

/// Rebuild an abstract from OpenAlex's word -> positions index.
///
/// Every `(position, word)` pair is collected, sorted by position and joined
/// with single spaces.
#[must_use]
pub fn reconstruct_abstract(index: &HashMap<String, Vec<usize>>) -> String {
    let mut words: Vec<(usize, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |&p| (p, word.as_str())))
        .collect();

    words.sort_unstable();
    words.into_iter().map(|(_, w)| w).collect::<Vec<_>>().join(" ")
}

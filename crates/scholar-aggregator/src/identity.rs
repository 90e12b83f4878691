//! Identity normalization.
//!
//! Pure functions that turn URLs, titles and source-native identifiers into
//! comparable keys. The keys are only ever used for matching; callers always
//! see the original values.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*\d)v\d+$").expect("valid version regex"));

static ARXIV_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|export\.)?arxiv\.org/(?:abs|pdf)/(.+?)(?:\.pdf)?/?(?:[?#].*)?$")
        .expect("valid arXiv url regex")
});

static ARXIV_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d{4}\.\d{4,5}|[a-z][a-z.\-]*/\d{7})(?:v\d+)?$")
        .expect("valid arXiv id regex")
});

static DOI_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:dx\.)?doi\.org/(10\.\d{4,9}/\S+?)/?$").expect("valid doi regex")
});

/// Normalize a URL into a comparison key.
///
/// Lowercases, forces the https scheme, drops query and fragment and any
/// trailing slash. Returns an empty string for blank input.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let lower = url.trim().to_lowercase();
    if lower.is_empty() {
        return String::new();
    }

    let parsed = Url::parse(&lower)
        .ok()
        .filter(|u| u.has_host())
        .or_else(|| Url::parse(&format!("https://{lower}")).ok().filter(|u| u.has_host()));

    match parsed {
        Some(u) => {
            let host = u.host_str().unwrap_or_default();
            let port = u.port().map(|p| format!(":{p}")).unwrap_or_default();
            format!("https://{host}{port}{}", u.path()).trim_end_matches('/').to_string()
        }
        None => {
            let end = lower.find(['?', '#']).unwrap_or(lower.len());
            lower[..end].trim_end_matches('/').to_string()
        }
    }
}

/// Normalize a title into a comparison key.
///
/// Lowercases and keeps only alphanumeric characters, so whitespace runs and
/// punctuation differences never separate two spellings of one title.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .flat_map(str::chars)
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Remove a trailing `vN` version marker from an arXiv identifier.
#[must_use]
pub fn strip_version_suffix(native_id: &str) -> String {
    let id = native_id.trim();
    VERSION_SUFFIX
        .captures(id)
        .and_then(|c| c.get(1))
        .map_or_else(|| id.to_string(), |m| m.as_str().to_string())
}

/// Extract the arXiv identifier embedded in an abstract or PDF URL.
///
/// Returns an empty string when the URL is not an arXiv abs/pdf link.
#[must_use]
pub fn extract_native_id_from_url(url: &str) -> String {
    ARXIV_URL
        .captures(url.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|id| ARXIV_ID.is_match(id))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Extract a DOI from a doi.org resolver URL.
///
/// Returns an empty string when the URL is not a resolver link.
#[must_use]
pub fn extract_doi_from_url(url: &str) -> String {
    DOI_URL
        .captures(url.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Clean a DOI field that may be a bare DOI or a resolver URL.
#[must_use]
pub fn clean_doi(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let doi = if raw.to_lowercase().starts_with("10.") {
        raw.to_string()
    } else {
        extract_doi_from_url(raw)
    };
    (!doi.is_empty()).then_some(doi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("HTTP://arXiv.org/abs/2101.00001/?context=cs#top"),
            "https://arxiv.org/abs/2101.00001"
        );
        assert_eq!(normalize_url("arxiv.org/pdf/2101.00001"), "https://arxiv.org/pdf/2101.00001");
        assert_eq!(normalize_url("   "), "");
    }

    #[test]
    fn test_normalize_url_idempotent() {
        let once = normalize_url("http://Example.org/Paper/?x=1");
        assert_eq!(normalize_url(&once), once);
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Attention   Is All\tYou Need! "), "attentionisallyouneed");
        assert_eq!(normalize_title("Graph-Neural Nets"), normalize_title("graph neural nets"));
        assert_eq!(normalize_title("???"), "");
    }

    #[test]
    fn test_strip_version_suffix() {
        assert_eq!(strip_version_suffix("2101.00001v2"), "2101.00001");
        assert_eq!(strip_version_suffix("hep-th/9901001v1"), "hep-th/9901001");
        assert_eq!(strip_version_suffix("2101.00001"), "2101.00001");
        assert_eq!(strip_version_suffix("openalex:W1v2x"), "openalex:W1v2x");
    }

    #[test]
    fn test_extract_native_id_from_url() {
        assert_eq!(extract_native_id_from_url("https://arxiv.org/abs/2101.00001v3"), "2101.00001v3");
        assert_eq!(extract_native_id_from_url("http://arxiv.org/pdf/2101.00001.pdf"), "2101.00001");
        assert_eq!(extract_native_id_from_url("https://export.arxiv.org/abs/cs/9901001"), "cs/9901001");
        assert_eq!(extract_native_id_from_url("https://www.arxiv.org/pdf/2101.00001v1"), "2101.00001v1");
        assert_eq!(extract_native_id_from_url("https://arxiv.org/list/cs.LG/recent"), "");
        assert_eq!(extract_native_id_from_url("https://example.org/abs/2101.00001"), "");
    }

    #[test]
    fn test_extract_doi_from_url() {
        assert_eq!(extract_doi_from_url("https://doi.org/10.1145/3292500.3330701"), "10.1145/3292500.3330701");
        assert_eq!(extract_doi_from_url("http://dx.doi.org/10.48550/arXiv.2101.00001"), "10.48550/arXiv.2101.00001");
        assert_eq!(extract_doi_from_url("https://example.org/10.1/x"), "");
    }

    #[test]
    fn test_clean_doi() {
        assert_eq!(clean_doi("https://doi.org/10.1/x").as_deref(), Some("10.1/x"));
        assert_eq!(clean_doi("10.1/x").as_deref(), Some("10.1/x"));
        assert_eq!(clean_doi(""), None);
    }
}

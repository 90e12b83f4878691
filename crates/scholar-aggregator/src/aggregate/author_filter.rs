//! Author-name filter applied when the search field is `author`.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::PaperRecord;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}-]+").expect("valid author token regex"));

/// A parsed author query: the last token is the surname, the rest are given
/// names or initials.
#[derive(Debug, Clone)]
pub struct AuthorQuery {
    surname: Regex,
    given: Vec<Regex>,
}

impl AuthorQuery {
    /// Parse a free-text author query. Returns `None` when it has no tokens.
    #[must_use]
    pub fn parse(query: &str) -> Option<Self> {
        let lower = query.to_lowercase();
        let mut tokens: Vec<&str> = TOKEN.find_iter(&lower).map(|m| m.as_str()).collect();
        let surname = tokens.pop()?;

        let surname = whole_word(surname)?;
        let given = tokens
            .into_iter()
            .map(|token| {
                if token.chars().count() == 1 {
                    Regex::new(&format!(r"\b{}\.?", regex::escape(token))).ok()
                } else {
                    whole_word(token)
                }
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self { surname, given })
    }

    /// Whether one author string satisfies the query.
    #[must_use]
    pub fn matches_author(&self, author: &str) -> bool {
        let author = author.trim().to_lowercase();
        self.surname.is_match(&author) && self.given.iter().all(|re| re.is_match(&author))
    }

    /// Whether any author of the record satisfies the query.
    #[must_use]
    pub fn matches(&self, record: &PaperRecord) -> bool {
        record.authors_display.split(',').any(|author| self.matches_author(author))
    }
}

fn whole_word(token: &str) -> Option<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(token))).ok()
}

/// Keep records with at least one author matching `query`.
///
/// A query without any name tokens leaves the records unfiltered.
#[must_use]
pub fn filter_by_author(records: Vec<PaperRecord>, query: &str) -> Vec<PaperRecord> {
    let Some(author) = AuthorQuery::parse(query) else {
        return records;
    };
    records.into_iter().filter(|r| author.matches(r)).collect()
}

//! Markdown output formatting.

use std::borrow::Cow;

use crate::models::{PaperRecord, SearchResponse, SourceTag};

const ABSTRACT_PREVIEW_CHARS: usize = 300;

/// Format a list of papers as Markdown.
#[must_use]
pub fn format_papers_markdown(papers: &[PaperRecord]) -> String {
    if papers.is_empty() {
        return "No papers found.".to_string();
    }

    let mut output = format!("# Papers ({} results)\n\n", papers.len());
    push_papers(&mut output, papers, 1);
    output
}

/// Format one page of search results as Markdown.
#[must_use]
pub fn format_search_markdown(response: &SearchResponse) -> String {
    if response.papers.is_empty() {
        return format!("No papers found for \"{}\".", response.query);
    }

    let first = response.offset + 1;
    let last = response.offset + response.papers.len();
    let mut output = format!(
        "# Results {first}-{last} of {} for \"{}\"\n\n",
        response.total_candidates, response.query
    );
    push_papers(&mut output, &response.papers, first);
    output
}

fn push_papers(output: &mut String, papers: &[PaperRecord], first_index: usize) {
    for (i, paper) in papers.iter().enumerate() {
        output.push_str(&format_paper_markdown(paper, first_index + i));
        output.push_str("\n---\n\n");
    }
}

/// Format a single paper as Markdown.
#[must_use]
pub fn format_paper_markdown(paper: &PaperRecord, index: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("## {}. {}\n\n", index, paper.title));

    if !paper.authors_display.is_empty() {
        output.push_str(&format!("**Authors**: {}\n\n", paper.authors_display));
    }

    let mut meta = Vec::new();
    if !paper.published_date.is_empty() {
        meta.push(format!("**Published**: {}", paper.published_date));
    }
    if let Some(citations) = paper.citation_count {
        meta.push(format!("**Citations**: {citations}"));
    }
    if let Some(influential) = paper.influential_citation_count {
        meta.push(format!("**Influential**: {influential}"));
    }
    meta.push(format!(
        "**Source**: {}",
        match paper.source_tag {
            SourceTag::NativeFeed => "arXiv",
            SourceTag::WorksIndex => "OpenAlex",
        }
    ));
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    let mut links = vec![format!("[Landing]({})", paper.landing_url)];
    if !paper.pdf_url.is_empty() {
        links.push(format!("[PDF]({})", paper.pdf_url));
    }
    if let Some(doi) = &paper.doi {
        links.push(format!("[DOI](https://doi.org/{doi})"));
    }
    output.push_str(&format!("**Links**: {}\n\n", links.join(" | ")));

    if !paper.abstract_text.is_empty() {
        let text = paper.abstract_text.as_str();
        let preview: Cow<'_, str> = match text.char_indices().nth(ABSTRACT_PREVIEW_CHARS) {
            Some((cut, _)) => Cow::Owned(format!("{}...", &text[..cut])),
            None => Cow::Borrowed(text),
        };
        output.push_str(&format!("**Abstract**: {preview}\n"));
    }

    output
}

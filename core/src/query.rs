//! Conjunctive substring search over the index, with highlighted snippets.

use regex::{Regex, RegexBuilder};

use crate::config::Config;
use crate::index::{SearchIndex, SearchRecord};

pub const ELLIPSIS: &str = "...";
pub const NO_RESULTS: &str = "No results found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetPiece {
    pub text: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippet {
    pub pieces: Vec<SnippetPiece>,
}

impl Snippet {
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Snippet text without highlight markers.
    pub fn plain(&self) -> String {
        self.pieces.iter().map(|p| p.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub record: SearchRecord,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Query too short: the caller keeps whichever view was active.
    Inactive,
    /// Matches in index order; may be empty.
    Results(Vec<SearchHit>),
}

impl SearchOutcome {
    pub fn is_active(&self) -> bool {
        matches!(self, SearchOutcome::Results(_))
    }
}

#[derive(Debug, Clone)]
pub struct QueryEngine {
    min_chars: usize,
    before: usize,
    after: usize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl QueryEngine {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_chars: config.min_query_chars,
            before: config.snippet_before,
            after: config.snippet_after,
        }
    }

    /// Lowercased whitespace-separated terms, or `None` when the query is
    /// below the activation threshold.
    pub fn terms(&self, query: &str) -> Option<Vec<String>> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.min_chars {
            return None;
        }
        Some(trimmed.to_lowercase().split_whitespace().map(str::to_string).collect())
    }

    pub fn search(&self, index: &SearchIndex, query: &str) -> SearchOutcome {
        let Some(terms) = self.terms(query) else {
            return SearchOutcome::Inactive;
        };
        let highlighter = highlighter(&terms);
        let hits = index
            .records()
            .iter()
            .filter(|r| terms.iter().all(|t| r.text.contains(t.as_str())))
            .map(|r| SearchHit {
                snippet: self.snippet(&r.text, &terms, highlighter.as_ref()),
                record: r.clone(),
            })
            .collect();
        SearchOutcome::Results(hits)
    }

    /// Window around the first occurrence of the first term.
    fn snippet(&self, text: &str, terms: &[String], highlighter: Option<&Regex>) -> Snippet {
        let Some(first) = terms.first() else {
            return Snippet::default();
        };
        let Some(byte_pos) = text.find(first.as_str()) else {
            return Snippet::default();
        };

        let total = text.chars().count();
        let match_char = text[..byte_pos].chars().count();
        let start = match_char.saturating_sub(self.before);
        let end = (match_char + self.after).min(total);

        let window: String = text.chars().skip(start).take(end - start).collect();
        let mut pieces = Vec::new();
        if start > 0 {
            pieces.push(plain(ELLIPSIS));
        }
        pieces.extend(highlight(&window, highlighter));
        if end < total {
            pieces.push(plain(ELLIPSIS));
        }
        Snippet { pieces }
    }
}

fn plain(s: &str) -> SnippetPiece {
    SnippetPiece {
        text: s.to_string(),
        highlighted: false,
    }
}

/// Case-insensitive alternation of the escaped terms, longest first.
fn highlighter(terms: &[String]) -> Option<Regex> {
    let mut sorted: Vec<&str> = terms.iter().map(String::as_str).collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
    sorted.dedup();
    let alternation: Vec<String> = sorted.iter().map(|t| regex::escape(t)).collect();
    RegexBuilder::new(&alternation.join("|"))
        .case_insensitive(true)
        .build()
        .ok()
}

fn highlight(window: &str, highlighter: Option<&Regex>) -> Vec<SnippetPiece> {
    let Some(regex) = highlighter else {
        return vec![plain(window)];
    };
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in regex.find_iter(window) {
        if m.start() > last {
            pieces.push(plain(&window[last..m.start()]));
        }
        pieces.push(SnippetPiece {
            text: m.as_str().to_string(),
            highlighted: true,
        });
        last = m.end();
    }
    if last < window.len() {
        pieces.push(plain(&window[last..]));
    }
    pieces
}

//! Search result types.

use crate::{Conversation, Message};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Which part of a conversation matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// The conversation title matched; the result is keyed on its first message.
    Title,
    /// The message content matched.
    Content,
}

/// A matching message with a preview excerpt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub conversation: Conversation,
    pub message: Message,
    /// Bounded preview around the match.
    pub excerpt: String,
    /// Byte range of the match inside `excerpt`, if the query occurs in it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Range<usize>>,
    pub matched_field: SearchField,
}

impl SearchResult {
    /// The highlighted slice of the excerpt, if any.
    pub fn matched_text(&self) -> Option<&str> {
        self.highlight.clone().and_then(|r| self.excerpt.get(r))
    }
}

/// Outcome of a search, distinguishing "nothing typed" from "nothing found".
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    /// No query entered; nothing is displayed.
    #[default]
    Idle,
    /// A query ran and matched nothing.
    NoMatches { query: String },
    Matches(Vec<SearchResult>),
}

impl SearchState {
    pub fn from_query(query: &str, results: Vec<SearchResult>) -> Self {
        let query = query.trim();
        if query.is_empty() {
            SearchState::Idle
        } else if results.is_empty() {
            SearchState::NoMatches {
                query: query.to_string(),
            }
        } else {
            SearchState::Matches(results)
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        match self {
            SearchState::Matches(results) => results,
            _ => &[],
        }
    }

    /// Copy for the empty-state placeholder, if one should be shown.
    pub fn empty_message(&self) -> Option<String> {
        match self {
            SearchState::Idle => Some("Search your conversations".to_string()),
            SearchState::NoMatches { query } => Some(format!("No results for \"{}\"", query)),
            SearchState::Matches(_) => None,
        }
    }
}

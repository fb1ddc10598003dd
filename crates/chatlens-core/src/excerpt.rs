//! Preview excerpts around a search match.

use crate::predicate::find_ignore_case;
use std::ops::Range;

/// Characters of context kept on each side of a match.
pub const DEFAULT_CONTEXT_CHARS: usize = 50;
/// Leading characters kept, with no marker, when the query does not occur in
/// the content.
pub const DEFAULT_FALLBACK_CHARS: usize = 100;

const ELLIPSIS: &str = "…";

/// Sizing for excerpts. Lengths count chars, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcerptOptions {
    pub context_chars: usize,
    pub fallback_chars: usize,
}

impl Default for ExcerptOptions {
    fn default() -> Self {
        Self {
            context_chars: DEFAULT_CONTEXT_CHARS,
            fallback_chars: DEFAULT_FALLBACK_CHARS,
        }
    }
}

/// A bounded slice of content plus the byte range of the match within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    pub text: String,
    pub highlight: Option<Range<usize>>,
}

/// Build an excerpt around the first case-insensitive occurrence of `query`.
///
/// Falls back to the leading `fallback_chars` of `content` when the query is
/// empty or absent.
pub fn build_excerpt(content: &str, query: &str, opts: ExcerptOptions) -> Excerpt {
    let found = if query.is_empty() {
        None
    } else {
        find_ignore_case(content, query)
    };

    let Some(hit) = found else {
        return leading_excerpt(content, opts.fallback_chars);
    };

    let start = back_chars(content, hit.start, opts.context_chars);
    let end = forward_chars(content, hit.end, opts.context_chars);

    let mut text = String::with_capacity(end - start + 2 * ELLIPSIS.len());
    if start > 0 {
        text.push_str(ELLIPSIS);
    }
    let offset = text.len();
    text.push_str(&content[start..end]);
    if end < content.len() {
        text.push_str(ELLIPSIS);
    }

    Excerpt {
        text,
        highlight: Some(hit.start - start + offset..hit.end - start + offset),
    }
}

fn leading_excerpt(content: &str, max_chars: usize) -> Excerpt {
    let end = forward_chars(content, 0, max_chars);
    Excerpt {
        text: content[..end].to_string(),
        highlight: None,
    }
}

/// Byte index `n` chars before `pos`, clamped to 0.
fn back_chars(s: &str, pos: usize, n: usize) -> usize {
    if n == 0 {
        return pos;
    }
    s[..pos]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(pos)
}

/// Byte index `n` chars after `pos`, clamped to `s.len()`.
fn forward_chars(s: &str, pos: usize, n: usize) -> usize {
    s[pos..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| pos + i)
        .unwrap_or(s.len())
}

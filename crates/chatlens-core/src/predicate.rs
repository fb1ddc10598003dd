//! Filter predicates over conversations and messages.
//!
//! Everything here is pure: no allocation beyond lowercasing, no state, no
//! failure modes.

use chatlens_types::{DateFilter, Message, MessageRole, ProviderFilter, RoleFilter};
use chrono::{DateTime, Duration, Utc};
use std::ops::Range;

/// Whether `timestamp` falls in `bucket`, with age measured as `now - timestamp`.
///
/// Bounds are strict: an age of exactly 24h is not `Today`, exactly 7d is not
/// `ThisWeek`, and exactly 30d is `Older` rather than `ThisMonth`.
pub fn matches_date_range(timestamp: DateTime<Utc>, bucket: DateFilter, now: DateTime<Utc>) -> bool {
    let age = now - timestamp;
    match bucket {
        DateFilter::All => true,
        DateFilter::Today => age < Duration::hours(24),
        DateFilter::ThisWeek => age < Duration::days(7),
        DateFilter::ThisMonth => age < Duration::days(30),
        DateFilter::Older => age >= Duration::days(30),
    }
}

/// Whether a free-form provider string belongs to `bucket`.
pub fn matches_provider(provider: &str, bucket: ProviderFilter) -> bool {
    match bucket {
        ProviderFilter::All => true,
        ProviderFilter::Other => classify_provider(provider) == ProviderFilter::Other,
        named => contains_any_keyword(&provider.to_lowercase(), named),
    }
}

/// The first named bucket whose keywords occur in `provider`, else `Other`.
pub fn classify_provider(provider: &str) -> ProviderFilter {
    let lower = provider.to_lowercase();
    ProviderFilter::NAMED
        .into_iter()
        .find(|bucket| contains_any_keyword(&lower, *bucket))
        .unwrap_or(ProviderFilter::Other)
}

fn contains_any_keyword(lower: &str, bucket: ProviderFilter) -> bool {
    bucket.keywords().iter().any(|kw| lower.contains(kw))
}

pub fn matches_role(message: &Message, filter: RoleFilter) -> bool {
    match filter {
        RoleFilter::All => true,
        RoleFilter::User => message.role == MessageRole::User,
        RoleFilter::Assistant => message.role == MessageRole::Assistant,
        RoleFilter::System => message.role == MessageRole::System,
    }
}

/// Case-insensitive substring match. An empty query matches everything.
pub fn matches_free_text(haystack: &str, query: &str) -> bool {
    find_ignore_case(haystack, query).is_some()
}

/// Byte range of the first case-insensitive occurrence of `needle` in `haystack`.
///
/// Characters are compared one-to-one by their lowercase expansion, so the
/// returned range always lies on char boundaries of `haystack`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return Some(0..0);
    }

    let needle: Vec<char> = needle.chars().collect();
    for (start, _) in haystack.char_indices() {
        let mut end = start;
        let mut rest = haystack[start..].chars();
        let mut matched = true;
        for n in &needle {
            match rest.next() {
                Some(h) if chars_eq_ignore_case(h, *n) => end += h.len_utf8(),
                _ => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            return Some(start..end);
        }
    }
    None
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

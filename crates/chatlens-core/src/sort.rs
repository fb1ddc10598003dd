//! Conversation ordering.

use chatlens_types::{Conversation, SortOrder};
use std::cmp::Ordering;

/// Compare two conversations under `order`.
///
/// Equal keys compare `Equal`; callers rely on a stable sort to keep ties in
/// input order.
pub fn compare(a: &Conversation, b: &Conversation, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Newest => b.updated_at.cmp(&a.updated_at),
        SortOrder::Oldest => a.created_at.cmp(&b.created_at),
        SortOrder::MostActive => b.message_count.cmp(&a.message_count),
        SortOrder::Alphabetical => a
            .title
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.title.chars().flat_map(char::to_lowercase)),
    }
}

/// Stable in-place sort.
pub fn sort_conversations(conversations: &mut [Conversation], order: SortOrder) {
    conversations.sort_by(|a, b| compare(a, b, order));
}

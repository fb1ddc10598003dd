//! Query engine: filtered, sorted conversation lists and message search.
//!
//! Results are re-derived from scratch on every call. There is no index; the
//! inputs are one user's own history held in memory.

use crate::excerpt::{build_excerpt, ExcerptOptions};
use crate::predicate::{classify_provider, matches_date_range, matches_free_text, matches_provider, matches_role};
use crate::sort::sort_conversations;
use chatlens_types::{
    Conversation, ConversationFilter, DateFilter, ListView, Message, ProviderFilter, RoleFilter,
    SearchField, SearchResult,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Messages grouped by owning conversation, each group in `created_at` order.
pub type MessagesByConversation = HashMap<Uuid, Vec<Message>>;

/// Conversations for the main list: not archived, filtered, sorted.
pub fn query_conversations(
    all: &[Conversation],
    filter: &ConversationFilter,
    now: DateTime<Utc>,
) -> Vec<Conversation> {
    query_view(all, ListView::Main, filter, now)
}

/// Conversations for the archive list: archived only, filtered, sorted.
pub fn query_archived(
    all: &[Conversation],
    filter: &ConversationFilter,
    now: DateTime<Utc>,
) -> Vec<Conversation> {
    query_view(all, ListView::Archive, filter, now)
}

/// Shared pipeline behind both list views.
pub fn query_view(
    all: &[Conversation],
    view: ListView,
    filter: &ConversationFilter,
    now: DateTime<Utc>,
) -> Vec<Conversation> {
    let search = filter.search.trim();
    let mut results: Vec<Conversation> = all
        .iter()
        .filter(|c| match view {
            ListView::Main => !c.is_archived,
            ListView::Archive => c.is_archived,
        })
        .filter(|c| search.is_empty() || conversation_text_matches(c, search))
        .filter(|c| matches_date_range(c.updated_at, filter.date, now))
        .filter(|c| matches_provider(&c.provider, filter.provider))
        .cloned()
        .collect();

    sort_conversations(&mut results, filter.sort);

    debug!(
        target: "chatlens::query",
        "{:?} view: {} of {} conversations match {:?}",
        view,
        results.len(),
        all.len(),
        filter
    );
    results
}

fn conversation_text_matches(conversation: &Conversation, query: &str) -> bool {
    matches_free_text(&conversation.title, query)
        || conversation
            .system_prompt
            .as_deref()
            .is_some_and(|p| matches_free_text(p, query))
}

/// Parameters for a message search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSearch {
    pub query: String,
    pub role: RoleFilter,
    pub date: DateFilter,
}

impl MessageSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: RoleFilter) -> Self {
        self.role = role;
        self
    }

    pub fn with_date(mut self, date: DateFilter) -> Self {
        self.date = date;
        self
    }
}

/// Search message content and conversation titles.
///
/// For each non-archived conversation, in input order: a title match yields
/// one result keyed on the first message, then every message whose content
/// matches yields its own result. The same conversation can therefore appear
/// more than once; results are neither de-duplicated nor re-sorted. The role
/// and date filters apply to content matches only; a title match is reported
/// whatever its first message is. An empty query returns nothing.
pub fn search_messages(
    conversations: &[Conversation],
    messages: &MessagesByConversation,
    search: &MessageSearch,
    now: DateTime<Utc>,
    opts: ExcerptOptions,
) -> Vec<SearchResult> {
    let query = search.query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let passes = |m: &Message| matches_role(m, search.role) && matches_date_range(m.created_at, search.date, now);
    let mut results = Vec::new();

    for conversation in conversations.iter().filter(|c| !c.is_archived) {
        let Some(thread) = messages.get(&conversation.id) else {
            continue;
        };

        if matches_free_text(&conversation.title, query) {
            if let Some(first) = thread.first() {
                results.push(make_result(conversation, first, query, SearchField::Title, opts));
            }
        }

        for message in thread.iter().filter(|m| passes(*m)) {
            if matches_free_text(&message.content, query) {
                results.push(make_result(conversation, message, query, SearchField::Content, opts));
            }
        }
    }

    debug!(
        target: "chatlens::query",
        "Search {:?} matched {} results across {} conversations",
        query,
        results.len(),
        conversations.len()
    );
    results
}

fn make_result(
    conversation: &Conversation,
    message: &Message,
    query: &str,
    matched_field: SearchField,
    opts: ExcerptOptions,
) -> SearchResult {
    let excerpt = build_excerpt(&message.content, query, opts);
    SearchResult {
        conversation: conversation.clone(),
        message: message.clone(),
        excerpt: excerpt.text,
        highlight: excerpt.highlight,
        matched_field,
    }
}

/// Look up a conversation by id.
pub fn find_conversation(all: &[Conversation], id: Uuid) -> Option<&Conversation> {
    all.iter().find(|c| c.id == id)
}

/// A window into a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    pub fn next(self) -> Self {
        Self {
            offset: self.offset + self.limit,
            limit: self.limit,
        }
    }
}

/// The slice of `items` covered by `page`, empty past the end.
pub fn paginate<T>(items: &[T], page: Page) -> &[T] {
    let start = page.offset.min(items.len());
    let end = page.offset.saturating_add(page.limit).min(items.len());
    &items[start..end]
}

/// Per-bucket counts of non-archived conversations, for filter chips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetCounts {
    pub total: usize,
    pub by_provider: HashMap<ProviderFilter, usize>,
    pub by_date: HashMap<DateFilter, usize>,
}

impl FacetCounts {
    pub fn provider(&self, bucket: ProviderFilter) -> usize {
        match bucket {
            ProviderFilter::All => self.total,
            other => self.by_provider.get(&other).copied().unwrap_or(0),
        }
    }

    pub fn date(&self, bucket: DateFilter) -> usize {
        match bucket {
            DateFilter::All => self.total,
            other => self.by_date.get(&other).copied().unwrap_or(0),
        }
    }
}

/// Count non-archived conversations per provider and date bucket.
///
/// Date buckets overlap (something from today is also this week), so the
/// date counts do not sum to `total`.
pub fn facet_counts(all: &[Conversation], now: DateTime<Utc>) -> FacetCounts {
    let mut counts = FacetCounts::default();
    for conversation in all.iter().filter(|c| !c.is_archived) {
        counts.total += 1;
        *counts
            .by_provider
            .entry(classify_provider(&conversation.provider))
            .or_default() += 1;
        for bucket in DateFilter::ALL.into_iter().filter(|b| *b != DateFilter::All) {
            if matches_date_range(conversation.updated_at, bucket, now) {
                *counts.by_date.entry(bucket).or_default() += 1;
            }
        }
    }
    counts
}

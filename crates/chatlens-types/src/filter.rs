//! Filter and sort selections.
//!
//! Each enum carries its display data (labels, keyword tables) here, apart
//! from the predicate and comparator logic in `chatlens-core`.

use serde::{Deserialize, Serialize};

/// Age bucket for a timestamp, relative to "now".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    #[default]
    All,
    /// Younger than 24 hours.
    Today,
    /// Younger than 7 days.
    ThisWeek,
    /// Younger than 30 days.
    ThisMonth,
    /// 30 days or older.
    Older,
}

impl DateFilter {
    pub const ALL: [DateFilter; 5] = [
        DateFilter::All,
        DateFilter::Today,
        DateFilter::ThisWeek,
        DateFilter::ThisMonth,
        DateFilter::Older,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DateFilter::All => "All time",
            DateFilter::Today => "Today",
            DateFilter::ThisWeek => "This week",
            DateFilter::ThisMonth => "This month",
            DateFilter::Older => "Older",
        }
    }
}

/// Upstream vendor bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFilter {
    #[default]
    All,
    OpenAi,
    Anthropic,
    Google,
    /// Anything that matches none of the named vendors.
    Other,
}

impl ProviderFilter {
    pub const ALL: [ProviderFilter; 5] = [
        ProviderFilter::All,
        ProviderFilter::OpenAi,
        ProviderFilter::Anthropic,
        ProviderFilter::Google,
        ProviderFilter::Other,
    ];

    /// Buckets backed by a keyword table, in classification order.
    pub const NAMED: [ProviderFilter; 3] = [
        ProviderFilter::OpenAi,
        ProviderFilter::Anthropic,
        ProviderFilter::Google,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProviderFilter::All => "All providers",
            ProviderFilter::OpenAi => "OpenAI",
            ProviderFilter::Anthropic => "Anthropic",
            ProviderFilter::Google => "Google",
            ProviderFilter::Other => "Other",
        }
    }

    /// Lowercase substrings identifying this vendor in a provider string.
    ///
    /// `All` and `Other` have no keywords of their own; `Other` is defined as
    /// "none of the named tables match", so a new vendor lands there until it
    /// gets its own entry.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            ProviderFilter::OpenAi => &["openai", "gpt"],
            ProviderFilter::Anthropic => &["anthropic", "claude"],
            ProviderFilter::Google => &["google", "gemini", "palm"],
            ProviderFilter::All | ProviderFilter::Other => &[],
        }
    }
}

/// Message author filter for search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleFilter {
    #[default]
    All,
    User,
    Assistant,
    System,
}

impl RoleFilter {
    pub const ALL: [RoleFilter; 4] = [
        RoleFilter::All,
        RoleFilter::User,
        RoleFilter::Assistant,
        RoleFilter::System,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RoleFilter::All => "All messages",
            RoleFilter::User => "Your messages",
            RoleFilter::Assistant => "AI responses",
            RoleFilter::System => "System",
        }
    }
}

/// Ordering for conversation lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently updated first.
    #[default]
    Newest,
    /// Earliest created first.
    Oldest,
    /// Highest message count first.
    MostActive,
    /// Title A-Z, ignoring case.
    Alphabetical,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Newest,
        SortOrder::Oldest,
        SortOrder::MostActive,
        SortOrder::Alphabetical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest first",
            SortOrder::Oldest => "Oldest first",
            SortOrder::MostActive => "Most active",
            SortOrder::Alphabetical => "Alphabetical",
        }
    }
}

/// Which conversation list a screen shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListView {
    /// Everything that is not archived.
    #[default]
    Main,
    /// Archived conversations only.
    Archive,
}

/// Combined filter/sort selection for a conversation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationFilter {
    #[serde(default)]
    pub date: DateFilter,
    #[serde(default)]
    pub provider: ProviderFilter,
    #[serde(default)]
    pub sort: SortOrder,
    /// Free-text match against title and system prompt.
    #[serde(default)]
    pub search: String,
}

impl ConversationFilter {
    pub fn new(date: DateFilter, provider: ProviderFilter, sort: SortOrder) -> Self {
        Self {
            date,
            provider,
            sort,
            search: String::new(),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

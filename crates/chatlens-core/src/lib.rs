//! Filtering, sorting and search over an in-memory conversation history,
//! plus the selection and bulk-action state behind a conversation list.

pub mod config;
mod debounce;
mod error;
pub mod excerpt;
mod liveness;
pub mod logging;
pub mod predicate;
mod provider;
pub mod query;
mod selection;
mod session;
pub mod sort;

pub use config::Config;
pub use debounce::SearchDebouncer;
pub use error::ChatlensError;
pub use excerpt::{build_excerpt, Excerpt, ExcerptOptions};
pub use liveness::LivenessHandle;
pub use provider::{
    ConfirmPrompt, ConversationProvider, DestructivePrompt, InMemoryProvider, PresetChoice,
    PromptChoice, Snapshot,
};
pub use query::{
    facet_counts, find_conversation, paginate, query_archived, query_conversations, search_messages,
    FacetCounts, MessageSearch, MessagesByConversation, Page,
};
pub use selection::{BulkAction, BulkOutcome, SelectionController};
pub use session::{QuerySession, SessionEvent};

/// Result type for chatlens operations.
pub type Result<T> = std::result::Result<T, ChatlensError>;

//! Per-screen query session.
//!
//! A `QuerySession` is the explicit state container behind a conversation
//! list or search screen: the current filters, query and selection, the last
//! records pulled from the provider, and the results derived from them. Hosts
//! pull data with [`QuerySession::refresh`], mutate state through the setters,
//! and observe changes by subscribing to [`SessionEvent`]s.

use crate::config::Config;
use crate::debounce::SearchDebouncer;
use crate::excerpt::ExcerptOptions;
use crate::liveness::LivenessHandle;
use crate::provider::{ConfirmPrompt, ConversationProvider};
use crate::query::{
    facet_counts, find_conversation, paginate, query_view, search_messages, FacetCounts,
    MessageSearch, MessagesByConversation, Page,
};
use crate::selection::{BulkOutcome, SelectionController};
use crate::{ChatlensError, Result};
use chatlens_types::{
    Conversation, ConversationFilter, DateFilter, ListView, ProviderFilter, RoleFilter, SearchState,
    SortOrder,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Change notifications for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The visible conversation list was re-derived.
    ResultsChanged { visible: usize },
    /// Search results were re-derived.
    SearchChanged { results: usize },
    SelectionChanged { selection_mode: bool, selected: usize },
    /// A bulk action finished and its follow-up ran.
    BulkFinished(BulkOutcome),
    /// Transient user-visible message, e.g. a failed mutation.
    Notice(String),
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct QuerySession {
    excerpt: ExcerptOptions,
    page_size: usize,
    view: ListView,
    filter: ConversationFilter,
    role: RoleFilter,
    search_query: String,
    selection: SelectionController,
    conversations: Vec<Conversation>,
    messages: MessagesByConversation,
    visible: Vec<Conversation>,
    search: SearchState,
    page: Page,
    liveness: LivenessHandle,
    debouncer: SearchDebouncer,
    event_tx: broadcast::Sender<SessionEvent>,
    clock: Clock,
}

impl QuerySession {
    pub fn new(config: &Config) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            excerpt: config.excerpt_options(),
            page_size: config.page_size.max(1),
            view: ListView::Main,
            filter: ConversationFilter::default(),
            role: RoleFilter::All,
            search_query: String::new(),
            selection: SelectionController::new(),
            conversations: Vec::new(),
            messages: MessagesByConversation::new(),
            visible: Vec::new(),
            search: SearchState::Idle,
            page: Page::first(config.page_size.max(1)),
            liveness: LivenessHandle::new(),
            debouncer: SearchDebouncer::new(config.search_debounce()),
            event_tx,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock used for date buckets.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Handle another task can use to tear this session down.
    pub fn liveness(&self) -> LivenessHandle {
        self.liveness.clone()
    }

    pub fn is_active(&self) -> bool {
        self.liveness.is_active()
    }

    /// Mark the screen gone. In-flight calls finish, but their follow-ups are skipped.
    pub fn teardown(&self) {
        debug!(target: "chatlens::session", "Session torn down");
        self.liveness.teardown();
    }

    /// Debouncer for the search field; see [`QuerySession::set_search_query`].
    pub fn debouncer(&self) -> SearchDebouncer {
        self.debouncer.clone()
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Pull current records from the provider and re-derive everything.
    ///
    /// Messages are fetched per conversation; a conversation the provider no
    /// longer knows simply has no messages.
    pub async fn refresh<P>(&mut self, provider: &P) -> Result<()>
    where
        P: ConversationProvider + ?Sized,
    {
        let conversations = provider.list_conversations().await?;
        let mut messages = MessagesByConversation::with_capacity(conversations.len());
        for conversation in &conversations {
            let thread = provider.list_messages(conversation.id).await?;
            messages.insert(conversation.id, thread);
        }

        if !self.is_active() {
            debug!(target: "chatlens::session", "Refresh finished after teardown; discarding");
            return Ok(());
        }

        self.load(conversations, messages);
        Ok(())
    }

    /// Replace the records directly, for hosts that push data instead.
    pub fn load(&mut self, conversations: Vec<Conversation>, messages: MessagesByConversation) {
        info!(
            target: "chatlens::session",
            "Loaded {} conversations, {} messages",
            conversations.len(),
            messages.values().map(Vec::len).sum::<usize>()
        );
        self.conversations = conversations;
        self.messages = messages;

        let known = &self.conversations;
        let before = self.selection.len();
        self.selection.retain(|id| known.iter().any(|c| c.id == id));
        if self.selection.len() != before {
            self.emit_selection();
        }

        self.rederive();
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Recompute the visible list and search results from scratch.
    fn rederive(&mut self) {
        let now = self.now();
        self.visible = query_view(&self.conversations, self.view, &self.filter, now);
        self.page = Page::first(self.page_size);

        let search = MessageSearch::new(self.search_query.clone())
            .with_role(self.role)
            .with_date(self.filter.date);
        let results = search_messages(&self.conversations, &self.messages, &search, now, self.excerpt);
        self.search = SearchState::from_query(&self.search_query, results);

        self.emit(SessionEvent::ResultsChanged {
            visible: self.visible.len(),
        });
        self.emit(SessionEvent::SearchChanged {
            results: self.search.results().len(),
        });
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn set_view(&mut self, view: ListView) {
        self.view = view;
        self.selection.cancel();
        self.emit_selection();
        self.rederive();
    }

    pub fn set_date_filter(&mut self, date: DateFilter) {
        self.filter.date = date;
        self.rederive();
    }

    pub fn set_provider_filter(&mut self, provider: ProviderFilter) {
        self.filter.provider = provider;
        self.rederive();
    }

    pub fn set_role_filter(&mut self, role: RoleFilter) {
        self.role = role;
        self.rederive();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.filter.sort = sort;
        self.rederive();
    }

    /// Filter text for the conversation list (title and system prompt).
    pub fn set_list_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.rederive();
    }

    /// Apply a message-search query immediately.
    ///
    /// Hosts typing into a search field should first pass the text through
    /// [`QuerySession::debouncer`] and only apply what comes out.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.rederive();
    }

    /// Back to defaults, as when navigating away and back.
    pub fn reset(&mut self) {
        self.view = ListView::Main;
        self.filter = ConversationFilter::default();
        self.role = RoleFilter::All;
        self.search_query.clear();
        self.selection.cancel();
        self.emit_selection();
        self.rederive();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn view(&self) -> ListView {
        self.view
    }

    pub fn filter(&self) -> &ConversationFilter {
        &self.filter
    }

    pub fn role_filter(&self) -> RoleFilter {
        self.role
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn visible(&self) -> &[Conversation] {
        &self.visible
    }

    pub fn visible_page(&self) -> &[Conversation] {
        paginate(&self.visible, self.page)
    }

    /// Advance to the next page; returns false when already on the last one.
    pub fn next_page(&mut self) -> bool {
        let next = self.page.next();
        if next.offset >= self.visible.len() {
            return false;
        }
        self.page = next;
        true
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn facets(&self) -> FacetCounts {
        facet_counts(&self.conversations, self.now())
    }

    pub fn conversation(&self, id: Uuid) -> Option<&Conversation> {
        find_conversation(&self.conversations, id)
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn start_selection(&mut self, id: Uuid) {
        self.selection.start(id);
        self.emit_selection();
    }

    pub fn toggle_selection(&mut self, id: Uuid) {
        self.selection.toggle(id);
        self.emit_selection();
    }

    /// Select everything in the visible list. Only while selecting.
    pub fn select_all_visible(&mut self) {
        let ids: Vec<Uuid> = self.visible.iter().map(|c| c.id).collect();
        self.selection.select_all(ids);
        self.emit_selection();
    }

    pub fn cancel_selection(&mut self) {
        self.selection.cancel();
        self.emit_selection();
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn archive_selected<P>(&mut self, provider: &P) -> Option<BulkOutcome>
    where
        P: ConversationProvider + ?Sized,
    {
        let liveness = self.liveness.clone();
        let outcome = self.selection.archive_selected(provider, &liveness).await?;
        self.finish_bulk(provider, &outcome).await;
        Some(outcome)
    }

    pub async fn delete_selected<P, C>(&mut self, provider: &P, prompt: &C) -> Option<BulkOutcome>
    where
        P: ConversationProvider + ?Sized,
        C: ConfirmPrompt + ?Sized,
    {
        let liveness = self.liveness.clone();
        let outcome = self.selection.delete_selected(provider, prompt, &liveness).await?;
        self.finish_bulk(provider, &outcome).await;
        Some(outcome)
    }

    async fn finish_bulk<P>(&mut self, provider: &P, outcome: &BulkOutcome)
    where
        P: ConversationProvider + ?Sized,
    {
        if !outcome.applied {
            return;
        }
        for (id, error) in &outcome.failed {
            let title = self.title_of(*id);
            self.emit(SessionEvent::Notice(format!("Couldn't update \"{}\": {}", title, error)));
        }
        self.emit_selection();
        self.refresh_or_notify(provider).await;
        self.emit(SessionEvent::BulkFinished(outcome.clone()));
    }

    pub async fn unarchive<P>(&mut self, provider: &P, id: Uuid) -> Result<()>
    where
        P: ConversationProvider + ?Sized,
    {
        let result = provider.unarchive_conversation(id).await;
        self.after_mutation(provider, id, result).await
    }

    pub async fn archive<P>(&mut self, provider: &P, id: Uuid) -> Result<()>
    where
        P: ConversationProvider + ?Sized,
    {
        let result = provider.archive_conversation(id).await;
        self.after_mutation(provider, id, result).await
    }

    pub async fn toggle_pin<P>(&mut self, provider: &P, id: Uuid) -> Result<()>
    where
        P: ConversationProvider + ?Sized,
    {
        let mut conversation = self.lookup(id)?;
        conversation.is_pinned = !conversation.is_pinned;
        let result = provider.update_conversation(conversation).await;
        self.after_mutation(provider, id, result).await
    }

    pub async fn rename<P>(&mut self, provider: &P, id: Uuid, title: impl Into<String>) -> Result<()>
    where
        P: ConversationProvider + ?Sized,
    {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ChatlensError::OperationFailed("title cannot be empty".to_string()));
        }
        let mut conversation = self.lookup(id)?;
        conversation.title = title;
        let result = provider.update_conversation(conversation).await;
        self.after_mutation(provider, id, result).await
    }

    fn lookup(&self, id: Uuid) -> Result<Conversation> {
        self.conversation(id)
            .cloned()
            .ok_or(ChatlensError::ConversationNotFound(id))
    }

    fn title_of(&self, id: Uuid) -> String {
        self.conversation(id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Shared follow-up for single-item mutations: on failure notify and keep
    /// state; on success re-pull. Both skipped after teardown.
    async fn after_mutation<P>(&mut self, provider: &P, id: Uuid, result: Result<()>) -> Result<()>
    where
        P: ConversationProvider + ?Sized,
    {
        if !self.is_active() {
            return result;
        }
        match result {
            Ok(()) => {
                self.refresh_or_notify(provider).await;
                Ok(())
            }
            Err(e) => {
                warn!(target: "chatlens::session", "Mutation on {} failed: {}", id, e);
                let title = self.title_of(id);
                self.emit(SessionEvent::Notice(format!("Couldn't update \"{}\": {}", title, e)));
                Err(e)
            }
        }
    }

    async fn refresh_or_notify<P>(&mut self, provider: &P)
    where
        P: ConversationProvider + ?Sized,
    {
        if let Err(e) = self.refresh(provider).await {
            warn!(target: "chatlens::session", "Refresh failed: {}", e);
            self.emit(SessionEvent::Notice(format!("Couldn't refresh conversations: {}", e)));
        }
    }

    fn emit_selection(&self) {
        self.emit(SessionEvent::SelectionChanged {
            selection_mode: self.selection.selection_mode(),
            selected: self.selection.len(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        if !self.is_active() {
            return;
        }
        // No receivers is fine; the host may not be listening yet.
        let _ = self.event_tx.send(event);
    }
}

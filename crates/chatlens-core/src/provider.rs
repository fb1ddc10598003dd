//! Data provider seam and an in-memory implementation.
//!
//! The query engine never owns records. Hosts plug in whatever backs their
//! conversation history; `InMemoryProvider` is the reference implementation
//! used by tests and by hosts without a backend.

use crate::{ChatlensError, Result};
use async_trait::async_trait;
use chatlens_types::{Conversation, Message};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Source of conversation records and sink for mutations.
#[async_trait]
pub trait ConversationProvider: Send + Sync {
    /// Current conversations in store order.
    async fn list_conversations(&self) -> Result<Vec<Conversation>>;

    /// Messages of one conversation, oldest first. Unknown ids yield an empty list.
    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>>;

    async fn archive_conversation(&self, id: Uuid) -> Result<()>;

    async fn unarchive_conversation(&self, id: Uuid) -> Result<()>;

    async fn delete_conversation(&self, id: Uuid) -> Result<()>;

    async fn update_conversation(&self, conversation: Conversation) -> Result<()>;

    async fn delete_message(&self, id: Uuid) -> Result<()>;

    async fn update_message(&self, message: Message) -> Result<()>;
}

/// Text of a destructive-action confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestructivePrompt {
    pub title: String,
    pub body: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl DestructivePrompt {
    /// Prompt shown before deleting `count` conversations.
    pub fn delete_conversations(count: usize) -> Self {
        let noun = if count == 1 { "conversation" } else { "conversations" };
        Self {
            title: format!("Delete {} {}?", count, noun),
            body: "This cannot be undone.".to_string(),
            confirm_label: "Delete".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// Answer to a two-choice prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Confirm,
    Cancel,
}

/// Host-side confirmation dialog.
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn ask(&self, prompt: DestructivePrompt) -> PromptChoice;
}

/// Fixed-answer prompt, for hosts that confirm up front and for tests.
#[derive(Debug, Clone, Copy)]
pub struct PresetChoice(pub PromptChoice);

#[async_trait]
impl ConfirmPrompt for PresetChoice {
    async fn ask(&self, _prompt: DestructivePrompt) -> PromptChoice {
        self.0
    }
}

/// Serialized form of an in-memory store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// `ConversationProvider` over records held in memory.
#[derive(Default)]
pub struct InMemoryProvider {
    records: RwLock<Snapshot>,
    failing: RwLock<HashSet<Uuid>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(mut snapshot: Snapshot) -> Self {
        snapshot.messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Self {
            records: RwLock::new(snapshot),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Load a JSON snapshot from disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Copy of the current records.
    pub async fn snapshot(&self) -> Snapshot {
        self.records.read().await.clone()
    }

    pub async fn insert_conversation(&self, conversation: Conversation) {
        self.records.write().await.conversations.push(conversation);
    }

    /// Append a message and roll its counters into the owning conversation.
    pub async fn insert_message(&self, message: Message) -> Result<()> {
        let mut records = self.records.write().await;
        let conversation = records
            .conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
            .ok_or(ChatlensError::ConversationNotFound(message.conversation_id))?;

        conversation.message_count += 1;
        conversation.token_count += u64::from(message.token_count.unwrap_or(0));
        if message.created_at > conversation.updated_at {
            conversation.updated_at = message.created_at;
        }

        // Keep created_at order; equal timestamps stay in arrival order.
        let pos = records
            .messages
            .partition_point(|m| m.created_at <= message.created_at);
        records.messages.insert(pos, message);
        Ok(())
    }

    /// Make every later mutation targeting `id` fail with `OperationFailed`.
    pub async fn fail_on(&self, id: Uuid) {
        self.failing.write().await.insert(id);
    }

    pub async fn clear_failures(&self) {
        self.failing.write().await.clear();
    }

    async fn check_failure(&self, id: Uuid, op: &str) -> Result<()> {
        if self.failing.read().await.contains(&id) {
            warn!(target: "chatlens::provider", "Injected failure: {} {}", op, id);
            return Err(ChatlensError::OperationFailed(format!("{} {}", op, id)));
        }
        Ok(())
    }

    async fn set_archived(&self, id: Uuid, archived: bool) -> Result<()> {
        let op = if archived { "archive" } else { "unarchive" };
        self.check_failure(id, op).await?;

        let mut records = self.records.write().await;
        let conversation = records
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ChatlensError::ConversationNotFound(id))?;
        if archived {
            conversation.archive();
        } else {
            conversation.unarchive();
        }
        debug!(target: "chatlens::provider", "{} conversation {}", op, id);
        Ok(())
    }
}

#[async_trait]
impl ConversationProvider for InMemoryProvider {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        Ok(self.records.read().await.conversations.clone())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        Ok(self
            .records
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn archive_conversation(&self, id: Uuid) -> Result<()> {
        self.set_archived(id, true).await
    }

    async fn unarchive_conversation(&self, id: Uuid) -> Result<()> {
        self.set_archived(id, false).await
    }

    async fn delete_conversation(&self, id: Uuid) -> Result<()> {
        self.check_failure(id, "delete").await?;

        let mut records = self.records.write().await;
        let before = records.conversations.len();
        records.conversations.retain(|c| c.id != id);
        if records.conversations.len() == before {
            return Err(ChatlensError::ConversationNotFound(id));
        }
        records.messages.retain(|m| m.conversation_id != id);
        debug!(target: "chatlens::provider", "Deleted conversation {}", id);
        Ok(())
    }

    async fn update_conversation(&self, mut conversation: Conversation) -> Result<()> {
        self.check_failure(conversation.id, "update").await?;

        let mut records = self.records.write().await;
        let slot = records
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id)
            .ok_or(ChatlensError::ConversationNotFound(conversation.id))?;
        conversation.updated_at = Utc::now();
        *slot = conversation;
        Ok(())
    }

    async fn delete_message(&self, id: Uuid) -> Result<()> {
        self.check_failure(id, "delete").await?;

        let mut records = self.records.write().await;
        let pos = records
            .messages
            .iter()
            .position(|m| m.id == id)
            .ok_or(ChatlensError::MessageNotFound(id))?;
        let removed = records.messages.remove(pos);
        if let Some(conversation) = records
            .conversations
            .iter_mut()
            .find(|c| c.id == removed.conversation_id)
        {
            conversation.message_count = conversation.message_count.saturating_sub(1);
        }
        Ok(())
    }

    async fn update_message(&self, message: Message) -> Result<()> {
        self.check_failure(message.id, "update").await?;

        let mut records = self.records.write().await;
        let slot = records
            .messages
            .iter_mut()
            .find(|m| m.id == message.id)
            .ok_or(ChatlensError::MessageNotFound(message.id))?;
        if slot.content != message.content {
            let mut updated = message;
            updated.edit(updated.content.clone(), Utc::now());
            *slot = updated;
        } else {
            *slot = message;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (InMemoryProvider, Conversation) {
        let provider = InMemoryProvider::new();
        let conversation = Conversation::new("Trip Planning", "openai-gpt4");
        provider.insert_conversation(conversation.clone()).await;
        (provider, conversation)
    }

    #[tokio::test]
    async fn test_insert_message_updates_counts() {
        let (provider, conversation) = seeded().await;
        let mut msg = Message::user(conversation.id, "hello");
        msg.token_count = Some(5);
        provider.insert_message(msg).await.unwrap();

        let listed = provider.list_conversations().await.unwrap();
        assert_eq!(listed[0].message_count, 1);
        assert_eq!(listed[0].token_count, 5);
        assert_eq!(provider.list_messages(conversation.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_message_unknown_conversation() {
        let provider = InMemoryProvider::new();
        let err = provider
            .insert_message(Message::user(Uuid::new_v4(), "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatlensError::ConversationNotFound(_)));
    }

    #[tokio::test]
    async fn test_messages_stay_in_created_order() {
        let (provider, conversation) = seeded().await;
        let late = Message::user(conversation.id, "late");
        let mut early = Message::user(conversation.id, "early");
        early.created_at = late.created_at - chrono::Duration::minutes(5);
        provider.insert_message(late).await.unwrap();
        provider.insert_message(early).await.unwrap();

        let contents: Vec<String> = provider
            .list_messages(conversation.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_archive_roundtrip_and_not_found() {
        let (provider, conversation) = seeded().await;
        provider.archive_conversation(conversation.id).await.unwrap();
        assert!(provider.list_conversations().await.unwrap()[0].is_archived);

        provider.unarchive_conversation(conversation.id).await.unwrap();
        assert!(!provider.list_conversations().await.unwrap()[0].is_archived);

        let err = provider.archive_conversation(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ChatlensError::ConversationNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_conversation_removes_messages() {
        let (provider, conversation) = seeded().await;
        provider
            .insert_message(Message::user(conversation.id, "hello"))
            .await
            .unwrap();
        provider.delete_conversation(conversation.id).await.unwrap();
        assert!(provider.list_conversations().await.unwrap().is_empty());
        assert!(provider.list_messages(conversation.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let (provider, conversation) = seeded().await;
        provider.fail_on(conversation.id).await;

        let err = provider.archive_conversation(conversation.id).await.unwrap_err();
        assert!(matches!(err, ChatlensError::OperationFailed(_)));
        assert!(!provider.list_conversations().await.unwrap()[0].is_archived);

        provider.clear_failures().await;
        provider.archive_conversation(conversation.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_message_marks_edit() {
        let (provider, conversation) = seeded().await;
        let msg = Message::user(conversation.id, "helo");
        provider.insert_message(msg.clone()).await.unwrap();

        let mut changed = msg.clone();
        changed.content = "hello".to_string();
        provider.update_message(changed).await.unwrap();

        let stored = &provider.list_messages(conversation.id).await.unwrap()[0];
        assert_eq!(stored.content, "hello");
        assert!(stored.is_edited);
        assert!(stored.edited_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_message_decrements_count() {
        let (provider, conversation) = seeded().await;
        let msg = Message::user(conversation.id, "hello");
        provider.insert_message(msg.clone()).await.unwrap();
        provider.delete_message(msg.id).await.unwrap();

        assert_eq!(provider.list_conversations().await.unwrap()[0].message_count, 0);
        let err = provider.delete_message(msg.id).await.unwrap_err();
        assert!(matches!(err, ChatlensError::MessageNotFound(_)));
    }

    #[test]
    fn test_from_json_sorts_messages() {
        let json = r#"{
            "conversations": [],
            "messages": [
                {"id": "00000000-0000-0000-0000-000000000002", "conversation_id": "00000000-0000-0000-0000-0000000000aa",
                 "content": "second", "role": "assistant", "created_at": "2026-01-01T00:05:00Z"},
                {"id": "00000000-0000-0000-0000-000000000001", "conversation_id": "00000000-0000-0000-0000-0000000000aa",
                 "content": "first", "role": "user", "created_at": "2026-01-01T00:00:00Z"}
            ]
        }"#;
        let provider = InMemoryProvider::from_json(json).unwrap();
        let snapshot = tokio_test::block_on(provider.snapshot());
        assert_eq!(snapshot.messages[0].content, "first");
    }

    #[test]
    fn test_delete_prompt_copy() {
        assert_eq!(DestructivePrompt::delete_conversations(1).title, "Delete 1 conversation?");
        assert_eq!(DestructivePrompt::delete_conversations(3).title, "Delete 3 conversations?");
    }
}

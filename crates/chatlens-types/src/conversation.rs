//! Conversation and message records.
//!
//! These are the records supplied by the data provider. The query engine only
//! reads them; mutations go back through the provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A titled thread of messages with AI-provider metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Free-form upstream vendor string (e.g. "openai-gpt4").
    pub provider: String,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// Last time anything in the conversation changed.
    pub updated_at: DateTime<Utc>,
    /// Number of messages in the conversation.
    #[serde(default)]
    pub message_count: u32,
    /// Total tokens used across all messages.
    #[serde(default)]
    pub token_count: u64,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Sampling temperature override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Completion length override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Conversation {
    /// Create a new, empty, active conversation stamped with the current time.
    pub fn new(title: impl Into<String>, provider: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            provider: provider.into(),
            created_at: now,
            updated_at: now,
            message_count: 0,
            token_count: 0,
            is_archived: false,
            is_pinned: false,
            is_active: true,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Mark the conversation archived. Archived conversations are never active.
    pub fn archive(&mut self) {
        self.is_archived = true;
        self.is_active = false;
    }

    /// Restore an archived conversation to the main list.
    pub fn unarchive(&mut self) {
        self.is_archived = false;
        self.is_active = true;
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Owning conversation.
    pub conversation_id: Uuid,
    pub content: String,
    pub role: MessageRole,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u32>,
}

impl Message {
    /// Create a message for a conversation, stamped with the current time.
    pub fn new(conversation_id: Uuid, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            content: content.into(),
            role,
            created_at: Utc::now(),
            is_edited: false,
            edited_at: None,
            token_count: None,
        }
    }

    /// Create a user message.
    pub fn user(conversation_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(conversation_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::Assistant, content)
    }

    /// Replace the content and record the edit time.
    pub fn edit(&mut self, content: impl Into<String>, at: DateTime<Utc>) {
        self.content = content.into();
        self.is_edited = true;
        self.edited_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_is_active() {
        let conv = Conversation::new("Trip Planning", "openai-gpt4");
        assert!(conv.is_active);
        assert!(!conv.is_archived);
        assert_eq!(conv.created_at, conv.updated_at);
        assert_eq!(conv.message_count, 0);
    }

    #[test]
    fn test_archive_clears_active() {
        let mut conv = Conversation::new("Trip Planning", "openai-gpt4");
        conv.archive();
        assert!(conv.is_archived);
        assert!(!conv.is_active);

        conv.unarchive();
        assert!(!conv.is_archived);
        assert!(conv.is_active);
    }

    #[test]
    fn test_message_edit() {
        let conv_id = Uuid::new_v4();
        let mut msg = Message::user(conv_id, "helo");
        assert!(!msg.is_edited);

        let at = Utc::now();
        msg.edit("hello", at);
        assert_eq!(msg.content, "hello");
        assert!(msg.is_edited);
        assert_eq!(msg.edited_at, Some(at));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_conversation_defaults_when_deserializing() {
        let json = r#"{
            "id": "6f1c2b1e-8a0e-4c8e-9a51-2f4b7d9c0a11",
            "title": "Code Review",
            "provider": "anthropic-claude",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-02T00:00:00Z"
        }"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.message_count, 0);
        assert!(!conv.is_archived);
        assert!(conv.system_prompt.is_none());
    }
}

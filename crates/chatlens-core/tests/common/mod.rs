//! Common test utilities for integration tests.

#![allow(dead_code)]

use chatlens_core::{InMemoryProvider, MessagesByConversation, Snapshot};
use chatlens_types::Conversation;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use uuid::Uuid;

pub const TRIP_PLANNING: Uuid = Uuid::from_u128(1);
pub const CODE_REVIEW: Uuid = Uuid::from_u128(2);
pub const OLD_BUDGET: Uuid = Uuid::from_u128(3);
pub const RECIPE_IDEAS: Uuid = Uuid::from_u128(4);

/// First message of "Trip Planning".
pub const LISBON_QUESTION: Uuid = Uuid::from_u128(0x10000000_0000_0000_0000_000000000011);
/// Assistant reply in "Trip Planning".
pub const LISBON_ANSWER: Uuid = Uuid::from_u128(0x10000000_0000_0000_0000_000000000012);

/// Reference "now" the fixture dates are written against.
pub fn fixture_now() -> DateTime<Utc> {
    "2026-03-10T12:00:00Z".parse().unwrap()
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(format!("{}.json", name))
}

pub fn load_snapshot() -> Snapshot {
    let path = fixture_path("conversations");
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

pub fn load_provider() -> InMemoryProvider {
    InMemoryProvider::load_from(&fixture_path("conversations"))
        .unwrap_or_else(|e| panic!("Failed to load fixture provider: {}", e))
}

/// Fixture conversations plus their messages grouped per conversation.
pub fn load_records() -> (Vec<Conversation>, MessagesByConversation) {
    let snapshot = load_snapshot();
    let mut messages = MessagesByConversation::new();
    for message in snapshot.messages {
        messages.entry(message.conversation_id).or_default().push(message);
    }
    for thread in messages.values_mut() {
        thread.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }
    (snapshot.conversations, messages)
}

pub fn ids(list: &[Conversation]) -> Vec<Uuid> {
    list.iter().map(|c| c.id).collect()
}

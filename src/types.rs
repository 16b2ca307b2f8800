//! Core data model for the memory protocol
//!
//! A `Conversation` is the unit of encryption: an ordered list of messages
//! plus identifiers and timestamps. The JSON shape of these structs is the
//! plaintext that goes through the cipher, so field names are camelCase to
//! stay compatible with memories saved by other clients.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single chat message, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// An ordered sequence of messages, owned by the caller
///
/// Messages are ordered by occurrence; timestamp monotonicity is not
/// enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<Message>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Conversation {
    /// Create an empty conversation with a fresh id
    pub fn new() -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            title: None,
        }
    }

    /// Append a message and bump the update timestamp
    pub fn push_message(&mut self, message: Message) {
        self.updated_at = Utc::now().timestamp_millis();
        self.messages.push(message);
    }

    /// Derive a display title from the first user message
    ///
    /// Truncates to 50 characters with an ellipsis; falls back to the
    /// creation date when there is no user message yet.
    pub fn generate_title(&self) -> String {
        if let Some(first) = self.messages.iter().find(|m| m.role == Role::User) {
            let title: String = first.content.chars().take(50).collect();
            if title.chars().count() < first.content.chars().count() {
                return format!("{}...", title);
            }
            return title;
        }

        let created = chrono::DateTime::from_timestamp_millis(self.created_at)
            .unwrap_or_else(Utc::now);
        format!("Conversation {}", created.format("%Y-%m-%d"))
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// A decrypted memory recovered from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub cid: String,
    pub conversation: Conversation,
    /// Original envelope timestamp (milliseconds since epoch)
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

/// Result of a save attempt that did not error
///
/// User rejection of the signing prompt is a distinguished non-error
/// outcome, not a failure the UI should display.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { cid: String, tx_hash: String },
    Cancelled,
}

/// Successfully recovered memories, most recent first
///
/// `skipped` counts per-item failures (fetch, decode, or decrypt) that were
/// excluded from the list. Tombstoned ledger entries are not counted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedMemories {
    pub memories: Vec<Memory>,
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_at(role: Role, content: &str, timestamp: i64) -> Message {
        Message {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.to_string(),
            timestamp,
        }
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
    }

    #[test]
    fn test_conversation_json_shape() {
        let conversation = Conversation {
            id: "c1".to_string(),
            messages: vec![message_at(Role::User, "hi", 1000)],
            created_at: 1000,
            updated_at: 1001,
            title: None,
        };

        let value = serde_json::to_value(&conversation).unwrap();
        assert_eq!(value["id"], "c1");
        assert_eq!(value["createdAt"], 1000);
        assert_eq!(value["updatedAt"], 1001);
        assert_eq!(value["messages"][0]["role"], "user");
        // Absent title must not appear in the wire shape
        assert!(value.get("title").is_none());
    }

    #[test]
    fn test_push_message_bumps_updated_at() {
        let mut conversation = Conversation::new();
        conversation.updated_at = 0;

        conversation.push_message(Message::new(Role::User, "hello"));
        assert_eq!(conversation.messages.len(), 1);
        assert!(conversation.updated_at > 0);
    }

    #[test]
    fn test_generate_title_truncates_long_message() {
        let mut conversation = Conversation::new();
        let long = "x".repeat(80);
        conversation.push_message(Message::new(Role::User, long));

        let title = conversation.generate_title();
        assert_eq!(title, format!("{}...", "x".repeat(50)));
    }

    #[test]
    fn test_generate_title_short_message_unchanged() {
        let mut conversation = Conversation::new();
        conversation.push_message(Message::new(Role::User, "short title"));
        assert_eq!(conversation.generate_title(), "short title");
    }

    #[test]
    fn test_generate_title_skips_non_user_messages() {
        let mut conversation = Conversation::new();
        conversation.push_message(Message::new(Role::System, "system prompt"));
        conversation.push_message(Message::new(Role::Assistant, "greeting"));
        conversation.push_message(Message::new(Role::User, "the real title"));
        assert_eq!(conversation.generate_title(), "the real title");
    }

    #[test]
    fn test_generate_title_empty_conversation_uses_date() {
        let conversation = Conversation::new();
        assert!(conversation.generate_title().starts_with("Conversation "));
    }
}

//! Conversations and messages.
//!
//! A conversation is the canonical thread between two users, optionally
//! scoped to one booking. The participant pair is stored in a fixed
//! order so the same two users can never end up with duplicate threads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Conversation domain entity. `participant_1` always holds the lower
/// UUID (lexicographic on the identifier string).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_1_id: Uuid,
    pub participant_2_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        user_id == self.participant_1_id || user_id == self.participant_2_id
    }
}

/// Order a participant pair canonically: lower UUID string first.
pub fn normalize_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a.to_string() <= b.to_string() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Message domain entity. Append-only once written.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_order_is_canonical() {
        let a = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let b = Uuid::parse_str("ffffffff-0000-0000-0000-000000000000").unwrap();

        assert_eq!(normalize_pair(a, b), (a, b));
        assert_eq!(normalize_pair(b, a), (a, b));
    }

    #[test]
    fn pair_order_is_stable_for_equal_ids() {
        let a = Uuid::new_v4();
        assert_eq!(normalize_pair(a, a), (a, a));
    }
}

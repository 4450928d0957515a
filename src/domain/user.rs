//! User domain entity and related types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User domain entity.
///
/// `rating_avg` and `review_count` are denormalized from the reviews
/// the user has received; the review service is their only writer.
/// `rating_avg` is `None` until the first review lands.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub bio: String,
    pub location: String,
    pub avatar_url: Option<String>,
    pub rating_avg: Option<Decimal>,
    pub review_count: i32,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Data for creating a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Sparse profile update.
///
/// Only the enumerated keys are accepted; unknown keys are rejected
/// at deserialization time.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateUserProfile {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.avatar_url.is_none()
    }
}

/// User payload safe to return to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub bio: String,
    pub location: String,
    pub avatar_url: Option<String>,
    /// Average received rating, absent until the first review
    #[schema(value_type = Option<String>)]
    pub rating_avg: Option<Decimal>,
    pub review_count: i32,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            bio: user.bio,
            location: user.location,
            avatar_url: user.avatar_url,
            rating_avg: user.rating_avg,
            review_count: user.review_count,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_profile_keys_are_rejected() {
        let err = serde_json::from_str::<UpdateUserProfile>(r#"{"email": "x@example.com"}"#);
        assert!(err.is_err());

        let ok =
            serde_json::from_str::<UpdateUserProfile>(r#"{"first_name": "Amine", "bio": "hi"}"#)
                .unwrap();
        assert_eq!(ok.first_name.as_deref(), Some("Amine"));
        assert!(ok.phone.is_none());
    }
}

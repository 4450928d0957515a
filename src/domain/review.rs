//! Post-rental reviews.
//!
//! Reviews hang off bookings, not items: only parties to a completed
//! rental can review each other, once per direction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// Who is reviewing whom within a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDirection {
    RenterToOwner,
    OwnerToRenter,
}

impl ReviewDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewDirection::RenterToOwner => "renter_to_owner",
            ReviewDirection::OwnerToRenter => "owner_to_renter",
        }
    }
}

impl std::str::FromStr for ReviewDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "renter_to_owner" => Ok(ReviewDirection::RenterToOwner),
            "owner_to_renter" => Ok(ReviewDirection::OwnerToRenter),
            other => Err(AppError::internal(format!(
                "Unknown review direction in storage: {}",
                other
            ))),
        }
    }
}

/// Review domain entity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewed_user_id: Uuid,
    pub direction: ReviewDirection,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

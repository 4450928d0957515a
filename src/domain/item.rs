//! Rental item listing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, AppResult};

/// Physical condition of a rental item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    New,
    Excellent,
    Good,
    Fair,
}

impl ItemCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemCondition::New => "new",
            ItemCondition::Excellent => "excellent",
            ItemCondition::Good => "good",
            ItemCondition::Fair => "fair",
        }
    }
}

impl std::str::FromStr for ItemCondition {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ItemCondition::New),
            "excellent" => Ok(ItemCondition::Excellent),
            "good" => Ok(ItemCondition::Good),
            "fair" => Ok(ItemCondition::Fair),
            other => Err(AppError::internal(format!(
                "Unknown item condition in storage: {}",
                other
            ))),
        }
    }
}

/// Item domain entity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: Option<i32>,
    pub condition: ItemCondition,
    pub price_per_day: Decimal,
    pub deposit_amount: Decimal,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One photograph of an item. The collection is ordered and exactly
/// one image per item carries the cover flag.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemImage {
    pub id: i32,
    pub item_id: Uuid,
    pub url: String,
    pub is_cover: bool,
    pub position: i16,
}

/// Data for listing a new item.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewItem {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub category_id: Option<i32>,
    pub condition: ItemCondition,
    #[schema(value_type = String)]
    pub price_per_day: Decimal,
    #[schema(value_type = String)]
    pub deposit_amount: Decimal,
    pub location: String,
    /// Image URLs in display order; the first one becomes the cover
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl NewItem {
    pub fn validate_money(&self) -> AppResult<()> {
        if self.price_per_day.is_sign_negative() {
            return Err(AppError::validation("price_per_day must not be negative"));
        }
        if self.deposit_amount.is_sign_negative() {
            return Err(AppError::validation("deposit_amount must not be negative"));
        }
        Ok(())
    }
}

/// Sparse item update with the enumerated keys only; unknown keys are
/// rejected at deserialization time.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateItem {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the category
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub category_id: Option<Option<i32>>,
    pub condition: Option<ItemCondition>,
    #[schema(value_type = Option<String>)]
    pub price_per_day: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub deposit_amount: Option<Decimal>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

/// Distinguishes "key absent" from "key present and null" for
/// nullable fields in sparse updates.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

impl UpdateItem {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.condition.is_none()
            && self.price_per_day.is_none()
            && self.deposit_amount.is_none()
            && self.location.is_none()
            && self.is_active.is_none()
    }

    pub fn validate_money(&self) -> AppResult<()> {
        if matches!(self.price_per_day, Some(p) if p.is_sign_negative()) {
            return Err(AppError::validation("price_per_day must not be negative"));
        }
        if matches!(self.deposit_amount, Some(d) if d.is_sign_negative()) {
            return Err(AppError::validation("deposit_amount must not be negative"));
        }
        Ok(())
    }
}

/// Search filters for the item listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFilters {
    pub category: Option<i32>,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
    pub location: Option<String>,
    /// Free-text search over title and description
    pub search: Option<String>,
    /// Ordering key: `price_per_day` or `created_at`, with a
    /// leading `-` for descending
    pub ordering: Option<String>,
}

/// Recognized orderings for item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrdering {
    PriceAsc,
    PriceDesc,
    CreatedAsc,
    CreatedDesc,
}

impl ItemOrdering {
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw {
            None | Some("-created_at") => Ok(ItemOrdering::CreatedDesc),
            Some("created_at") => Ok(ItemOrdering::CreatedAsc),
            Some("price_per_day") => Ok(ItemOrdering::PriceAsc),
            Some("-price_per_day") => Ok(ItemOrdering::PriceDesc),
            Some(other) => Err(AppError::validation(format!(
                "Unknown ordering field: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_update_keys_are_rejected() {
        assert!(serde_json::from_str::<UpdateItem>(r#"{"owner_id": "abc"}"#).is_err());

        let ok = serde_json::from_str::<UpdateItem>(r#"{"title": "Drill", "is_active": false}"#)
            .unwrap();
        assert_eq!(ok.title.as_deref(), Some("Drill"));
        assert_eq!(ok.is_active, Some(false));
    }

    #[test]
    fn category_can_be_cleared_explicitly() {
        let cleared = serde_json::from_str::<UpdateItem>(r#"{"category_id": null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));

        let untouched = serde_json::from_str::<UpdateItem>(r#"{"title": "x"}"#).unwrap();
        assert_eq!(untouched.category_id, None);
    }

    #[test]
    fn ordering_parses_signed_keys() {
        assert_eq!(
            ItemOrdering::parse(None).unwrap(),
            ItemOrdering::CreatedDesc
        );
        assert_eq!(
            ItemOrdering::parse(Some("price_per_day")).unwrap(),
            ItemOrdering::PriceAsc
        );
        assert_eq!(
            ItemOrdering::parse(Some("-price_per_day")).unwrap(),
            ItemOrdering::PriceDesc
        );
        assert!(ItemOrdering::parse(Some("owner_id")).is_err());
    }

    #[test]
    fn negative_money_is_rejected() {
        let update = UpdateItem {
            price_per_day: Some(Decimal::NEGATIVE_ONE),
            ..Default::default()
        };
        assert!(update.validate_money().is_err());
    }
}

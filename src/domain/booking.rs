//! Booking entity and lifecycle state machine.
//!
//! The transition table here is the sole authority on which status
//! changes are legal and who may perform them. The storage layer
//! independently enforces the overlap invariant; this module owns
//! everything else about the lifecycle.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::BOOKING_APPROVAL_WINDOW_HOURS;
use crate::errors::{AppError, AppResult};

/// Booking lifecycle states.
///
/// Active states (pending, approved, payment_pending) block calendar
/// dates; terminal states (rejected, cancelled, completed) free them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    PaymentPending,
    Completed,
}

impl BookingStatus {
    /// Statuses that block dates on the availability calendar.
    pub const ACTIVE: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Approved,
        BookingStatus::PaymentPending,
    ];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    /// Legal next states from this one.
    pub fn valid_transitions(self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[
                BookingStatus::Approved,
                BookingStatus::Rejected,
                BookingStatus::Cancelled,
            ],
            BookingStatus::Approved => &[BookingStatus::PaymentPending, BookingStatus::Cancelled],
            BookingStatus::PaymentPending => {
                &[BookingStatus::Completed, BookingStatus::Cancelled]
            }
            // terminal
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed => &[],
        }
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::PaymentPending => "payment_pending",
            BookingStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "payment_pending" => Ok(BookingStatus::PaymentPending),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(AppError::internal(format!(
                "Unknown booking status in storage: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a booking a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingRole {
    Renter,
    Owner,
}

/// Role filter for "my bookings" listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingRoleFilter {
    Renter,
    Owner,
    #[default]
    Both,
}

/// Booking domain entity.
///
/// `owner_id` is denormalized from the item at creation and immutable
/// after. The pricing fields are a snapshot computed once at creation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub item_id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    pub total_days: i32,
    pub base_total: Decimal,
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub final_total: Decimal,
    pub deposit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn role_of(&self, user_id: Uuid) -> Option<BookingRole> {
        if user_id == self.renter_id {
            Some(BookingRole::Renter)
        } else if user_id == self.owner_id {
            Some(BookingRole::Owner)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.role_of(user_id).is_some()
    }

    /// The other party to the booking. Only meaningful for a
    /// participant.
    pub fn counterparty_of(&self, user_id: Uuid) -> Uuid {
        if user_id == self.renter_id {
            self.owner_id
        } else {
            self.renter_id
        }
    }

    /// Whether a pending booking has outlived its approval window.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Pending
            && now - self.created_at >= Duration::hours(BOOKING_APPROVAL_WINDOW_HOURS)
    }
}

/// Validate a requested status change against the transition table,
/// the actor's role and the approval window.
///
/// The checks run in this order: participant gate, edge legality,
/// actor authorization for the edge, expiration gate on approval.
pub fn check_transition(
    booking: &Booking,
    actor_id: Uuid,
    target: BookingStatus,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let role = booking.role_of(actor_id).ok_or(AppError::Forbidden)?;

    if !booking.status.can_transition_to(target) {
        return Err(AppError::invalid_transition(format!(
            "Cannot transition from {} to {}",
            booking.status, target
        )));
    }

    // Cancellation is open to either participant; every other edge is
    // the owner's call.
    let authorized = match target {
        BookingStatus::Cancelled => true,
        _ => role == BookingRole::Owner,
    };
    if !authorized {
        return Err(AppError::Forbidden);
    }

    if target == BookingStatus::Approved && booking.is_expired(now) {
        return Err(AppError::BookingExpired);
    }

    Ok(())
}

/// Inclusive date-range overlap: `[a1, a2]` and `[b1, b2]` overlap
/// iff `a1 <= b2 && b1 <= a2`. The same rule the store's exclusion
/// constraint applies.
pub fn ranges_overlap(a1: NaiveDate, a2: NaiveDate, b1: NaiveDate, b2: NaiveDate) -> bool {
    a1 <= b2 && b1 <= a2
}

/// One blocked range in an item's availability calendar.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailabilityRange {
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking(status: BookingStatus, renter: Uuid, owner: Uuid) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            renter_id: renter,
            owner_id: owner,
            start_date: date(2025, 3, 1),
            end_date: date(2025, 3, 5),
            status,
            total_days: 5,
            base_total: dec!(500.00),
            discount_rate: dec!(0.00),
            discount_amount: dec!(0.00),
            final_total: dec!(500.00),
            deposit: dec!(100.00),
            created_at: Utc.with_ymd_and_hms(2025, 2, 20, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 2, 20, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn transition_table_matches_lifecycle() {
        use BookingStatus::*;

        let legal = [
            (Pending, Approved),
            (Pending, Rejected),
            (Pending, Cancelled),
            (Approved, PaymentPending),
            (Approved, Cancelled),
            (PaymentPending, Completed),
            (PaymentPending, Cancelled),
        ];

        let all = [
            Pending,
            Approved,
            Rejected,
            Cancelled,
            PaymentPending,
            Completed,
        ];
        for from in all {
            for to in all {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from} -> {to} legality mismatch"
                );
            }
        }
    }

    #[test]
    fn terminal_states_allow_nothing() {
        use BookingStatus::*;
        for terminal in [Rejected, Cancelled, Completed] {
            assert!(terminal.is_terminal());
            assert!(terminal.valid_transitions().is_empty());
        }
    }

    #[test]
    fn only_owner_can_approve() {
        let (renter, owner, stranger) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let b = booking(BookingStatus::Pending, renter, owner);
        let now = b.created_at;

        assert!(check_transition(&b, owner, BookingStatus::Approved, now).is_ok());
        assert!(matches!(
            check_transition(&b, renter, BookingStatus::Approved, now),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            check_transition(&b, stranger, BookingStatus::Approved, now),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn either_participant_can_cancel() {
        let (renter, owner) = (Uuid::new_v4(), Uuid::new_v4());
        for status in [
            BookingStatus::Pending,
            BookingStatus::Approved,
            BookingStatus::PaymentPending,
        ] {
            let b = booking(status, renter, owner);
            let now = b.created_at;
            assert!(check_transition(&b, renter, BookingStatus::Cancelled, now).is_ok());
            assert!(check_transition(&b, owner, BookingStatus::Cancelled, now).is_ok());
        }
    }

    #[test]
    fn illegal_edge_is_invalid_transition() {
        let (renter, owner) = (Uuid::new_v4(), Uuid::new_v4());
        let b = booking(BookingStatus::Completed, renter, owner);
        let result = check_transition(&b, owner, BookingStatus::Approved, b.created_at);
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn approval_window_boundary() {
        let (renter, owner) = (Uuid::new_v4(), Uuid::new_v4());
        let b = booking(BookingStatus::Pending, renter, owner);

        // one second past 48h: expired
        let late = b.created_at + Duration::hours(48) + Duration::seconds(1);
        assert!(matches!(
            check_transition(&b, owner, BookingStatus::Approved, late),
            Err(AppError::BookingExpired)
        ));

        // exactly 48h: expired (window is inclusive)
        let exact = b.created_at + Duration::hours(48);
        assert!(matches!(
            check_transition(&b, owner, BookingStatus::Approved, exact),
            Err(AppError::BookingExpired)
        ));

        // 47h59m: still approvable
        let early = b.created_at + Duration::hours(47) + Duration::minutes(59);
        assert!(check_transition(&b, owner, BookingStatus::Approved, early).is_ok());
    }

    #[test]
    fn expiration_only_gates_approval() {
        let (renter, owner) = (Uuid::new_v4(), Uuid::new_v4());
        let b = booking(BookingStatus::Pending, renter, owner);
        let late = b.created_at + Duration::hours(72);

        assert!(check_transition(&b, owner, BookingStatus::Rejected, late).is_ok());
        assert!(check_transition(&b, renter, BookingStatus::Cancelled, late).is_ok());
    }

    #[test]
    fn overlap_is_inclusive_on_both_endpoints() {
        // [Mar 1, Mar 5] and [Mar 5, Mar 9] share Mar 5
        assert!(ranges_overlap(
            date(2025, 3, 1),
            date(2025, 3, 5),
            date(2025, 3, 5),
            date(2025, 3, 9)
        ));
        // [Mar 1, Mar 4] and [Mar 5, Mar 9] are disjoint
        assert!(!ranges_overlap(
            date(2025, 3, 1),
            date(2025, 3, 4),
            date(2025, 3, 5),
            date(2025, 3, 9)
        ));
        // containment overlaps
        assert!(ranges_overlap(
            date(2025, 3, 1),
            date(2025, 3, 31),
            date(2025, 3, 10),
            date(2025, 3, 12)
        ));
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        use BookingStatus::*;
        for status in [Pending, Approved, Rejected, Cancelled, PaymentPending, Completed] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
    }
}
